//! Chunked memory copy between two equally sized buffers
//!
//! Lane safety: the source is read-only after `init`. The destination is
//! written word by word with relaxed atomic stores, so lanes copying at the
//! same time store identical values into the same words. No lock is taken.

use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

use super::Workload;
use crate::Result;

pub const NAME: &str = "memcopy";

/// Words copied per chunk (32 KiB)
const CHUNK_WORDS: usize = 4096;

#[derive(Debug, Default)]
pub struct MemCopyWorkload {
    src: Vec<u64>,
    dst: Vec<AtomicU64>,
    batches: AtomicU64,
}

impl MemCopyWorkload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer length in bytes (each of source and destination)
    pub fn buffer_bytes(&self) -> usize {
        self.src.len() * std::mem::size_of::<u64>()
    }

    /// Whether the destination currently mirrors the source
    pub fn is_synced(&self) -> bool {
        self.src.len() == self.dst.len()
            && self
                .src
                .iter()
                .zip(&self.dst)
                .all(|(s, d)| *s == d.load(Ordering::Relaxed))
    }
}

impl Workload for MemCopyWorkload {
    fn init(&mut self, _threads: usize, workset_bytes: usize) -> Result<()> {
        let words = workset_bytes / std::mem::size_of::<u64>();
        let mut rng = SmallRng::from_entropy();
        self.src = (0..words).map(|_| rng.gen()).collect();
        self.dst = (0..words).map(|_| AtomicU64::new(0)).collect();
        self.batches = AtomicU64::new(0);
        Ok(())
    }

    fn run_batch(&self) -> u64 {
        for (src, dst) in self.src.chunks(CHUNK_WORDS).zip(self.dst.chunks(CHUNK_WORDS)) {
            for (s, d) in src.iter().zip(dst) {
                d.store(*s, Ordering::Relaxed);
            }
        }
        self.batches.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn shutdown(&mut self) {
        self.src = Vec::new();
        self.dst = Vec::new();
    }

    fn name(&self) -> &str {
        NAME
    }
}
