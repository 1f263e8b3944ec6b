//! Benchmark engine module
//!
//! Contains the run driver and its state machine, the worker lanes that
//! execute batches and the progress lane.

pub mod driver;
pub mod progress;
pub mod worker;

// Re-export commonly used types
pub use driver::{
    BenchmarkDriver, RunReport, RunRequest, RunState, SeriesReport, DEFAULT_WORKSET_BYTES,
};
pub use worker::{run_lane, LaneCounters, LaneSummary, SampleBuffer};
