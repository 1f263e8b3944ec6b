//! Benchmark result data models
//!
//! Contains the outcome of a single driver run and the system information
//! captured alongside it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Number of worker lanes used
    pub threads: usize,
    /// Requested wall-clock duration
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Batches completed across all lanes
    pub total_batches: u64,
    /// Batches per second of requested duration
    pub throughput: f64,
    /// Logarithmically compressed throughput
    pub score: u64,
    /// Sum of the counters returned by `run_batch`, kept for display only
    pub raw_score: u64,
}

impl BenchmarkResult {
    /// Build a result, deriving throughput and score from the batch count
    pub fn new(threads: usize, duration: Duration, total_batches: u64, raw_score: u64) -> Self {
        let throughput = calculate_throughput(total_batches, duration);
        Self {
            threads,
            duration,
            total_batches,
            throughput,
            score: compute_score(throughput),
            raw_score,
        }
    }

    /// Result of a run that completed no batches
    pub fn zero(threads: usize, duration: Duration) -> Self {
        Self::new(threads, duration, 0, 0)
    }

    /// Get a human-readable summary of the benchmark result
    pub fn summary(&self) -> String {
        format!(
            "{} threads - {:.1}s - {} batches - {:.2} batches/s - score {}",
            self.threads,
            self.duration.as_secs_f64(),
            self.total_batches,
            self.throughput,
            self.score
        )
    }

    /// Throughput per worker lane
    pub fn per_thread_throughput(&self) -> f64 {
        if self.threads > 0 {
            self.throughput / self.threads as f64
        } else {
            0.0
        }
    }
}

/// Batches per second over the requested duration; zero for a zero duration
pub fn calculate_throughput(batches: u64, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    batches as f64 / duration.as_secs_f64()
}

/// `round(1000 * log10(throughput + 1))`, with non-positive throughput mapped to 0
pub fn compute_score(throughput: f64) -> u64 {
    if throughput.is_nan() || throughput <= 0.0 {
        return 0;
    }
    (1000.0 * (throughput + 1.0).log10()).round() as u64
}

/// System information captured at benchmark time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system and architecture
    pub os: String,
    /// Detected hardware parallelism
    pub logical_cpus: usize,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            os: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            logical_cpus: detect_parallelism(),
        }
    }
}

impl SystemInfo {
    /// Create system info by detecting current system
    pub fn detect() -> Self {
        Self::default()
    }
}

/// Hardware parallelism, falling back to 4 when it cannot be detected
pub fn detect_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }
}
