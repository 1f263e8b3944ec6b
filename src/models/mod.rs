//! Data models module
//!
//! Contains benchmark result data models and system information.

pub mod result;

// Re-export commonly used types
pub use result::{
    calculate_throughput, compute_score, detect_parallelism, BenchmarkResult, SystemInfo,
};
