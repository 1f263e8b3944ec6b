//! PulseBench - pluggable micro-benchmark harness
//!
//! Runs a selectable workload across a fixed number of worker lanes for a
//! bounded duration, samples per-batch latency and reports throughput, a
//! derived score and latency distribution statistics.

use thiserror::Error;

pub mod bench;
pub mod config;
pub mod io;
pub mod models;
pub mod report;
pub mod stats;
pub mod util;
pub mod workload;

/// Common error type
#[derive(Debug, Error)]
pub enum PulseError {
    /// Requested workload name has no registered factory
    #[error("Workload not found: {0}")]
    WorkloadNotFound(String),
    /// I/O operation failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Configuration validation or parsing error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Benchmark execution error
    #[error("Benchmark error: {0}")]
    BenchmarkError(String),
    /// Results persistence or serialization error
    #[error("Results persistence error: {0}")]
    PersistenceError(String),
}

impl From<serde_json::Error> for PulseError {
    fn from(err: serde_json::Error) -> Self {
        PulseError::PersistenceError(format!("JSON serialization error: {}", err))
    }
}

impl From<toml::de::Error> for PulseError {
    fn from(err: toml::de::Error) -> Self {
        PulseError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for PulseError {
    fn from(err: toml::ser::Error) -> Self {
        PulseError::ConfigError(format!("TOML serialization error: {}", err))
    }
}

/// Result type alias for PulseBench operations
pub type Result<T> = std::result::Result<T, PulseError>;

/// Error handling utilities
pub mod error {
    use super::PulseError;

    /// Convert error to user-friendly message with suggestions
    pub fn user_friendly_message(error: &PulseError) -> String {
        match error {
            PulseError::WorkloadNotFound(name) => {
                format!(
                    "Unknown workload '{}'. Run with --list to see the registered workloads.",
                    name
                )
            }
            PulseError::ConfigError(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            PulseError::PersistenceError(_) => {
                "Failed to save results. Check disk space and permissions.".to_string()
            }
            PulseError::IoError(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                "Permission denied. Check file permissions for the output or scratch directory."
                    .to_string()
            }
            _ => error.to_string(),
        }
    }

    /// Whether the caller can fix the error by changing its request
    pub fn is_recoverable(error: &PulseError) -> bool {
        matches!(
            error,
            PulseError::WorkloadNotFound(_) | PulseError::ConfigError(_)
        )
    }
}

pub use bench::{BenchmarkDriver, RunReport, RunRequest, RunState, SeriesReport};
pub use models::BenchmarkResult;
pub use stats::StatsSummary;
pub use workload::{Workload, WorkloadRegistry};

// Common types and constants
pub const APP_NAME: &str = "pulsebench";
pub const CONFIG_FILE: &str = "pulsebench.toml";
pub const RESULTS_FILE: &str = "results.json";
pub const TEMP_FILE_PREFIX: &str = "PULSEBENCH_TMP_";
pub const MAX_RESULTS_HISTORY: usize = 100;
pub const DEFAULT_PERCENTILES: [u8; 3] = [50, 90, 99];
