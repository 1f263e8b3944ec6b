//! Configuration management module
//!
//! Handles loading, saving and validation of the benchmark configuration,
//! and turns it into run requests and drivers.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bench::{BenchmarkDriver, RunRequest, DEFAULT_WORKSET_BYTES};
use crate::models::detect_parallelism;
use crate::workload::{register_builtin_workloads, WorkloadRegistry};
use crate::{PulseError, Result, APP_NAME, CONFIG_FILE, DEFAULT_PERCENTILES};

pub mod persistence;

pub use persistence::ResultsStorage;

/// Benchmark configuration containing every run parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Registered workload name
    pub workload: String,
    /// Number of worker lanes
    pub threads: usize,
    /// Working-set size handed to the workload
    pub workset_bytes: usize,
    /// Run duration
    #[serde(with = "duration_text")]
    pub duration: Duration,
    /// Percentiles reported for batch latency
    pub percentiles: Vec<u8>,
    /// Histogram bucket count, 0 disables the histogram
    pub histogram_bins: usize,
    /// Directory for `fileio` scratch files, OS temp dir when unset
    pub scratch_dir: Option<PathBuf>,
    /// Draw the progress bar while running
    pub show_progress: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workload: "simd".to_string(),
            threads: detect_parallelism(),
            workset_bytes: DEFAULT_WORKSET_BYTES,
            duration: Duration::from_secs(10),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            histogram_bins: 0,
            scratch_dir: None,
            show_progress: true,
        }
    }
}

impl BenchConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    ///
    /// Thread count and working-set size are accepted as given.
    pub fn validate(&self) -> Result<()> {
        if self.workload.trim().is_empty() {
            return Err(PulseError::ConfigError(
                "Workload name must not be empty".to_string(),
            ));
        }

        if let Some(p) = self.percentiles.iter().find(|&&p| p > 100) {
            return Err(PulseError::ConfigError(format!(
                "Percentile out of range: {} (expected 0-100)",
                p
            )));
        }

        if let Some(dir) = &self.scratch_dir {
            if !dir.is_dir() {
                return Err(PulseError::ConfigError(format!(
                    "Scratch directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    pub fn with_workload(mut self, workload: impl Into<String>) -> Self {
        self.workload = workload.into();
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_workset_bytes(mut self, bytes: usize) -> Self {
        self.workset_bytes = bytes;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_percentiles(mut self, percentiles: Vec<u8>) -> Self {
        self.percentiles = percentiles;
        self
    }

    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = Some(dir);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run request described by this configuration
    pub fn run_request(&self) -> RunRequest {
        RunRequest::new(self.workload.clone())
            .with_threads(self.threads)
            .with_workset_bytes(self.workset_bytes)
            .with_duration(self.duration)
    }

    /// Registry holding the built-in workloads, honoring `scratch_dir`
    pub fn registry(&self) -> WorkloadRegistry {
        let mut registry = WorkloadRegistry::new();
        let scratch = self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir);
        register_builtin_workloads(&mut registry, scratch);
        registry
    }

    /// Driver over [`Self::registry`] with this configuration's percentiles and progress setting
    pub fn driver(&self) -> BenchmarkDriver {
        BenchmarkDriver::new(self.registry())
            .with_percentiles(self.percentiles.clone())
            .with_progress(self.show_progress)
    }

    /// Load configuration from the standard config file location
    /// Returns the default configuration if the file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from an explicit path, defaulting when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            PulseError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            PulseError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the standard config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PulseError::ConfigError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            PulseError::ConfigError(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Standard configuration file path, `$CONFIG_HOME/pulsebench/pulsebench.toml`
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            PulseError::ConfigError("Unable to determine config directory".to_string())
        })?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

/// Durations are stored as humantime strings such as `10s` or `1m 30s`
mod duration_text {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        crate::util::units::parse_duration_arg(&text).map_err(D::Error::custom)
    }
}
