//! Utility functions module
//!
//! Contains helpers for formatting and parsing sizes, durations and rates.

pub mod units;

// Re-export commonly used functions
pub use units::{
    format_bytes, format_duration, format_latency_ms, format_rate, parse_bytes,
    parse_duration_arg,
};
