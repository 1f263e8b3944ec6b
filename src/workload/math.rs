//! Math-heavy workload over an `f32` buffer
//!
//! Lane safety: the buffer and the running accumulator are shared by every
//! lane and updated with relaxed loads and stores, no read-modify-write and
//! no lock. Concurrent lanes race on the same elements and may lose each
//! other's updates. That race is benign: the values only feed the returned
//! anti-optimization counter and are never checked for correctness.

use std::hint::black_box;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use super::Workload;
use crate::Result;

pub const NAME: &str = "simd";

const SEED_VALUE: f32 = 0.1;

/// sin·cos + sqrt per element, feeding a shared accumulator
#[derive(Debug, Default)]
pub struct SimdWorkload {
    data: Vec<AtomicU32>,
    acc: AtomicU64,
}

impl SimdWorkload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `f32` elements in the working set
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current accumulator value
    pub fn accumulator(&self) -> u64 {
        self.acc.load(Ordering::Relaxed)
    }
}

impl Workload for SimdWorkload {
    fn init(&mut self, _threads: usize, workset_bytes: usize) -> Result<()> {
        let elements = workset_bytes / std::mem::size_of::<f32>();
        self.data = (0..elements)
            .map(|_| AtomicU32::new(SEED_VALUE.to_bits()))
            .collect();
        self.acc = AtomicU64::new(0);
        Ok(())
    }

    fn run_batch(&self) -> u64 {
        let mut local = 0u64;
        for cell in &self.data {
            let x = f32::from_bits(cell.load(Ordering::Relaxed));
            let y = x.sin() * x.cos() + x.sqrt();
            cell.store(y.to_bits(), Ordering::Relaxed);
            local = local.wrapping_add((y * 1000.0).round() as u64);
        }

        // Plain load/store: racing lanes may overwrite each other's sum
        let total = self.acc.load(Ordering::Relaxed).wrapping_add(black_box(local));
        self.acc.store(total, Ordering::Relaxed);
        total
    }

    fn shutdown(&mut self) {
        self.data = Vec::new();
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_sized_from_workset_not_threads() {
        let mut a = SimdWorkload::new();
        let mut b = SimdWorkload::new();
        a.init(1, 4096).unwrap();
        b.init(16, 4096).unwrap();
        assert_eq!(a.len(), 1024);
        assert_eq!(b.len(), 1024);
    }

    #[test]
    fn test_run_batch_accumulates() {
        let mut w = SimdWorkload::new();
        w.init(1, 1024).unwrap();
        let first = w.run_batch();
        let second = w.run_batch();
        assert!(first > 0);
        assert!(second > first);
        w.shutdown();
        assert!(w.is_empty());
    }

    #[test]
    fn test_values_stay_finite() {
        let mut w = SimdWorkload::new();
        w.init(1, 64).unwrap();
        for _ in 0..1000 {
            w.run_batch();
        }
        for cell in &w.data {
            let v = f32::from_bits(cell.load(Ordering::Relaxed));
            assert!(v.is_finite() && v >= 0.0);
        }
    }

    #[test]
    fn test_concurrent_lanes_tolerate_shared_state() {
        let mut w = SimdWorkload::new();
        w.init(4, 16 * 1024).unwrap();

        let batches_per_lane = 50;
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..batches_per_lane {
                        w.run_batch();
                    }
                });
            }
        });

        // Updates may be lost between lanes but the sink is never reset
        assert!(w.accumulator() > 0);
        w.shutdown();
    }

    #[test]
    fn test_empty_workset() {
        let mut w = SimdWorkload::new();
        w.init(1, 0).unwrap();
        assert_eq!(w.run_batch(), 0);
        w.shutdown();
    }
}
