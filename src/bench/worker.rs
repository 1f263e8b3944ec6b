//! Worker lanes
//!
//! A lane repeatedly invokes the shared workload until the deadline, timing
//! each batch lock-free and appending the elapsed milliseconds to the shared
//! sample buffer. The deadline is only checked between batches, so the final
//! batch of each lane may finish after it.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::workload::Workload;

/// Lock-protected, append-only collection of batch durations (ms)
#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Mutex<Vec<f64>>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample; the lock is held only for the push
    pub fn push(&self, elapsed_ms: f64) {
        self.samples.lock().push(elapsed_ms);
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finalize the buffer, handing the samples to the caller
    pub fn into_inner(self) -> Vec<f64> {
        self.samples.into_inner()
    }
}

/// Shared batch and raw-score counters
///
/// Both use relaxed fetch-and-add. They are independent of each other and
/// only read after every lane has joined.
#[derive(Debug, Default)]
pub struct LaneCounters {
    batches: AtomicU64,
    raw_score: AtomicU64,
}

impl LaneCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, counter: u64) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.raw_score.fetch_add(counter, Ordering::Relaxed);
    }

    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    pub fn raw_score(&self) -> u64 {
        self.raw_score.load(Ordering::Relaxed)
    }
}

/// Outcome of a single lane, used for per-lane logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneSummary {
    pub lane: usize,
    pub batches: u64,
}

/// Run one worker lane until `deadline`
pub fn run_lane(
    lane: usize,
    workload: &dyn Workload,
    deadline: Instant,
    samples: &SampleBuffer,
    counters: &LaneCounters,
) -> LaneSummary {
    let mut batches = 0u64;
    while Instant::now() < deadline {
        let start = Instant::now();
        let counter = workload.run_batch();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        samples.push(elapsed_ms);
        counters.record(counter);
        batches += 1;
    }
    tracing::trace!(lane, batches, "worker lane finished");
    LaneSummary { lane, batches }
}
