//! Result reporting
//!
//! Flattens run reports into [`RunRecord`]s and renders them as JSON, CSV or
//! human-readable text.

use std::fmt;
use std::str::FromStr;

use crate::stats::StatsSummary;
use crate::{PulseError, Result};

pub mod csv;
pub mod human;
pub mod json;
pub mod record;

pub use record::{RecordStats, RunRecord};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Csv,
}

impl OutputFormat {
    /// Render records; `series` carries the throughput summary of a repeated run
    pub fn render(&self, records: &[RunRecord], series: Option<&StatsSummary>) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(human::render(records, series)),
            OutputFormat::Json => json::render(records, series),
            OutputFormat::Csv => Ok(csv::render(records)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Human => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(PulseError::ConfigError(format!(
                "Unknown output format '{}' (expected human, json or csv)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Human => "human",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}
