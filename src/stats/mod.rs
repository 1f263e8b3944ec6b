//! Statistics engine
//!
//! Pure functions over sampled batch durations (milliseconds). Every
//! function is total: an empty input produces zero, never an error, since a
//! zero-length run is a legitimate outcome.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub mod histogram;

pub use histogram::histogram;

/// Summary statistics computed once from a finalized sample buffer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Arithmetic mean
    pub mean: f64,
    /// Median (average of the two central samples for even counts)
    pub median: f64,
    /// Population standard deviation
    pub stddev: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// Requested percentile (0-100) to interpolated value
    pub percentiles: BTreeMap<u8, f64>,
}

impl StatsSummary {
    /// All-zero summary carrying a zero entry for each requested percentile
    pub fn zeroed(percentiles: &[u8]) -> Self {
        Self {
            percentiles: percentiles.iter().map(|&p| (p, 0.0)).collect(),
            ..Self::default()
        }
    }

    /// Look up a percentile; `None` when it was not requested
    pub fn percentile(&self, p: u8) -> Option<f64> {
        self.percentiles.get(&p).copied()
    }

    /// Whether every field is zero
    pub fn is_zero(&self) -> bool {
        self.mean == 0.0
            && self.median == 0.0
            && self.stddev == 0.0
            && self.min == 0.0
            && self.max == 0.0
            && self.percentiles.values().all(|&v| v == 0.0)
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Arithmetic mean, 0.0 for an empty sequence
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of a sorted copy; the caller's slice is left untouched
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    median_of_sorted(&sorted_copy(values))
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Population standard deviation around a caller-supplied mean
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sq_sum: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sq_sum / values.len() as f64).sqrt()
}

/// Linear-interpolation percentile
///
/// `p <= 0` yields the minimum and `p >= 100` the maximum. Otherwise the
/// fractional rank `p / 100 * n` is read as a one-based position, clamped to
/// the sample range, and interpolated between its floor and ceiling indices,
/// so `percentile(1..=100, 90)` is exactly `90.0`.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    percentile_of_sorted(&sorted_copy(values), p)
}

fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if p <= 0.0 {
        return sorted[0];
    }
    if p >= 100.0 {
        return sorted[n - 1];
    }

    let rank = (p * n as f64 / 100.0 - 1.0).clamp(0.0, (n - 1) as f64);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Bundle mean, median, stddev, min, max and the requested percentiles
pub fn compute_stats(values: &[f64], percentiles: &[u8]) -> StatsSummary {
    if values.is_empty() {
        return StatsSummary::zeroed(percentiles);
    }

    let sorted = sorted_copy(values);
    let mean = mean(values);

    StatsSummary {
        mean,
        median: median_of_sorted(&sorted),
        stddev: stddev(values, mean),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        percentiles: percentiles
            .iter()
            .map(|&p| (p, percentile_of_sorted(&sorted, p as f64)))
            .collect(),
    }
}

/// [`compute_stats`] with the default percentile list (50, 90, 99)
pub fn compute_default_stats(values: &[f64]) -> StatsSummary {
    compute_stats(values, &crate::DEFAULT_PERCENTILES)
}
