//! Trial-division primality over a rolling candidate window
//!
//! Lane safety: the only shared state is a relaxed atomic cursor that hands
//! each batch its starting offset. Everything else lives on the stack.

use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};

use super::Workload;
use crate::Result;

pub const NAME: &str = "primes";

/// Candidates cycle through `2..2 + CANDIDATE_SPAN`
const CANDIDATE_SPAN: u64 = 10_000;

#[derive(Debug, Default)]
pub struct PrimesWorkload {
    window: u64,
    cursor: AtomicU64,
}

impl PrimesWorkload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates tested per batch
    pub fn window(&self) -> u64 {
        self.window
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

impl Workload for PrimesWorkload {
    /// One candidate per `u32` of working set
    fn init(&mut self, _threads: usize, workset_bytes: usize) -> Result<()> {
        self.window = (workset_bytes / std::mem::size_of::<u32>()) as u64;
        self.cursor = AtomicU64::new(0);
        Ok(())
    }

    fn run_batch(&self) -> u64 {
        let start = self.cursor.fetch_add(self.window, Ordering::Relaxed);
        let mut found = 0u64;
        for offset in 0..self.window {
            let n = (start + offset) % CANDIDATE_SPAN + 2;
            if black_box(is_prime(n)) {
                found += 1;
            }
        }
        found
    }

    fn shutdown(&mut self) {
        self.window = 0;
    }

    fn name(&self) -> &str {
        NAME
    }
}
