//! Flat, serializable view of a single run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bench::RunReport;
use crate::models::SystemInfo;
use crate::stats::StatsSummary;

/// Latency summary nested under `stats`, percentiles keyed by their bare number (`"50"`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordStats {
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: BTreeMap<String, f64>,
}

impl From<&StatsSummary> for RecordStats {
    fn from(stats: &StatsSummary) -> Self {
        Self {
            mean: stats.mean,
            median: stats.median,
            stddev: stats.stddev,
            min: stats.min,
            max: stats.max,
            percentiles: stats
                .percentiles
                .iter()
                .map(|(p, v)| (p.to_string(), *v))
                .collect(),
        }
    }
}

/// One run, as written to reports and the results history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// When the record was produced
    pub timestamp: DateTime<Utc>,
    pub workload: String,
    pub threads: usize,
    pub duration_seconds: f64,
    pub workset_bytes: usize,
    pub total_batches: u64,
    pub throughput_batches_per_s: f64,
    pub score: u64,
    pub raw_score: u64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub stddev_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Percentile (0-100) to batch latency in milliseconds, flattened as `p50`, `p90`, ...
    #[serde(flatten, with = "percentile_fields")]
    pub percentiles_ms: BTreeMap<u8, f64>,
    /// The same latency figures as a nested object
    #[serde(default)]
    pub stats: RecordStats,
    /// Equal-width latency histogram, present when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram_bins: Option<Vec<u64>>,
    #[serde(default)]
    pub system: SystemInfo,
}

impl RunRecord {
    /// Build a record stamped with the current time; `histogram_bins == 0` omits the histogram
    pub fn from_report(report: &RunReport, histogram_bins: usize) -> Self {
        let result = &report.result;
        let stats = &report.stats;
        Self {
            timestamp: Utc::now(),
            workload: report.workload.clone(),
            threads: result.threads,
            duration_seconds: result.duration.as_secs_f64(),
            workset_bytes: report.workset_bytes,
            total_batches: result.total_batches,
            throughput_batches_per_s: result.throughput,
            score: result.score,
            raw_score: result.raw_score,
            mean_ms: stats.mean,
            median_ms: stats.median,
            stddev_ms: stats.stddev,
            min_ms: stats.min,
            max_ms: stats.max,
            percentiles_ms: stats.percentiles.clone(),
            stats: RecordStats::from(stats),
            histogram_bins: (histogram_bins > 0).then(|| report.histogram(histogram_bins)),
            system: SystemInfo::detect(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Percentile keys are written as `p<N>`; unrecognized keys are skipped on read
mod percentile_fields {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(percentiles: &BTreeMap<u8, f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(percentiles.iter().map(|(p, v)| (format!("p{}", p), v)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<u8, f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Ok(fields
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix('p')
                    .and_then(|n| n.parse::<u8>().ok())
                    .map(|p| (p, value))
            })
            .collect())
    }
}
