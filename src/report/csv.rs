//! CSV rendering
//!
//! One header line and one row per record. Percentile columns are the union
//! of every record's percentiles, in ascending order; a record missing one
//! leaves the cell empty. Histograms are not part of the CSV output.

use std::collections::BTreeSet;
use std::fmt::Write;

use super::RunRecord;

const FIXED_COLUMNS: &[&str] = &[
    "timestamp",
    "workload",
    "threads",
    "duration_seconds",
    "workset_bytes",
    "total_batches",
    "throughput_batches_per_s",
    "throughput_bps",
    "score",
    "raw_score",
    "mean_ms",
    "median_ms",
    "stddev_ms",
    "min_ms",
    "max_ms",
];

/// Render records as CSV text ending in a newline
pub fn render(records: &[RunRecord]) -> String {
    let percentiles: BTreeSet<u8> = records
        .iter()
        .flat_map(|r| r.percentiles_ms.keys().copied())
        .collect();

    let mut out = String::new();
    let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(percentiles.iter().map(|p| format!("p{}", p)));
    out.push_str(&header.join(","));
    out.push('\n');

    for record in records {
        let mut row = vec![
            record.timestamp.to_rfc3339(),
            escape(&record.workload),
            record.threads.to_string(),
            record.duration_seconds.to_string(),
            record.workset_bytes.to_string(),
            record.total_batches.to_string(),
            record.throughput_batches_per_s.to_string(),
            record.throughput_batches_per_s.to_string(),
            record.score.to_string(),
            record.raw_score.to_string(),
            record.mean_ms.to_string(),
            record.median_ms.to_string(),
            record.stddev_ms.to_string(),
            record.min_ms.to_string(),
            record.max_ms.to_string(),
        ];
        for p in &percentiles {
            row.push(
                record
                    .percentiles_ms
                    .get(p)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        let _ = writeln!(out, "{}", row.join(","));
    }
    out
}

/// Quote a field containing a delimiter, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
