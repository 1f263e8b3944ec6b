//! Fixed-bucket histogram of raw samples

use std::cmp::Ordering;

/// Count samples into `bins` equal-width buckets spanning `[min, max]`
///
/// The maximum sample lands in the last bucket. When every sample is equal
/// the range is degenerate and all samples go to bucket 0.
pub fn histogram(values: &[f64], bins: usize) -> Vec<u64> {
    let mut counts = vec![0u64; bins];
    if bins == 0 || values.is_empty() {
        return counts;
    }

    let min = values
        .iter()
        .copied()
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(0.0);
    let max = values
        .iter()
        .copied()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(0.0);

    if max == min {
        counts[0] = values.len() as u64;
        return counts;
    }

    let width = (max - min) / bins as f64;
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_equal_width() {
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let bins = histogram(&values, 5);
        assert_eq!(bins, vec![2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_histogram_max_in_last_bin() {
        let bins = histogram(&[0.0, 10.0], 4);
        assert_eq!(bins, vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let bins = histogram(&[3.0, 3.0, 3.0], 4);
        assert_eq!(bins, vec![3, 0, 0, 0]);
    }

    #[test]
    fn test_histogram_empty_inputs() {
        assert_eq!(histogram(&[], 3), vec![0, 0, 0]);
        assert!(histogram(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn test_histogram_counts_every_sample() {
        let values = vec![0.1, 0.5, 0.9, 2.2, 7.0, 7.0, 3.3];
        let total: u64 = histogram(&values, 6).iter().sum();
        assert_eq!(total, values.len() as u64);
    }
}
