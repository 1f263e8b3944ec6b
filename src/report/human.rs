//! Human-readable text rendering

use std::fmt::Write;
use std::time::Duration;

use super::RunRecord;
use crate::stats::StatsSummary;
use crate::util::units::{format_bytes, format_duration, format_latency_ms, format_rate};

const RULE: &str = "================ Benchmark Results ================";

/// Render every record as a text block, followed by the series summary when present
pub fn render(records: &[RunRecord], series: Option<&StatsSummary>) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        if records.len() > 1 {
            let _ = writeln!(out, "Run {} of {}", i + 1, records.len());
        }
        render_record(&mut out, record);
    }

    if let Some(throughput) = series {
        let _ = writeln!(out, "Throughput over {} runs:", records.len());
        let _ = writeln!(out, "  Mean:     {}", format_rate(throughput.mean));
        let _ = writeln!(out, "  Median:   {}", format_rate(throughput.median));
        let _ = writeln!(out, "  Stddev:   {}", format_rate(throughput.stddev));
        let _ = writeln!(
            out,
            "  Range:    {} .. {}",
            format_rate(throughput.min),
            format_rate(throughput.max)
        );
    }
    out
}

fn render_record(out: &mut String, record: &RunRecord) {
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Workload:    {}", record.workload);
    let _ = writeln!(out, "Threads:     {}", record.threads);
    let duration = Duration::try_from_secs_f64(record.duration_seconds).unwrap_or(Duration::ZERO);
    let _ = writeln!(out, "Duration:    {}", format_duration(duration));
    let _ = writeln!(out, "Working set: {}", format_bytes(record.workset_bytes as u64));
    let _ = writeln!(out, "Batches:     {}", record.total_batches);
    let _ = writeln!(out, "Throughput:  {}", format_rate(record.throughput_batches_per_s));
    let _ = writeln!(out, "Score:       {}", record.score);
    let _ = writeln!(out, "Raw score:   {}", record.raw_score);
    let _ = writeln!(out, "Batch latency:");
    let _ = writeln!(out, "  Min:    {}", format_latency_ms(record.min_ms));
    let _ = writeln!(out, "  Max:    {}", format_latency_ms(record.max_ms));
    let _ = writeln!(out, "  Mean:   {}", format_latency_ms(record.mean_ms));
    let _ = writeln!(out, "  Median: {}", format_latency_ms(record.median_ms));
    let _ = writeln!(out, "  Stddev: {}", format_latency_ms(record.stddev_ms));
    for (p, value) in &record.percentiles_ms {
        let _ = writeln!(out, "  p{:<5} {}", p, format_latency_ms(*value));
    }

    if let Some(bins) = &record.histogram_bins {
        let peak = bins.iter().copied().max().unwrap_or(0).max(1);
        let _ = writeln!(out, "Histogram ({} bins):", bins.len());
        for (i, count) in bins.iter().enumerate() {
            let bar = "#".repeat((count * 40 / peak) as usize);
            let _ = writeln!(out, "  {:>3} | {:<40} {}", i, bar, count);
        }
    }
}
