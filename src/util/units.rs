//! Units formatting and parsing
//!
//! Human-readable sizes, durations, batch rates and batch latencies for
//! the command line and the text report.

use std::time::Duration;

const BINARY_UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// Format a byte count with binary units
///
/// # Examples
/// ```
/// use pulsebench::util::units::format_bytes;
///
/// assert_eq!(format_bytes(64 * 1024 * 1024), "64.0 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < BINARY_UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, BINARY_UNITS[unit])
    }
}

/// Parse a size such as `4096`, `64MiB`, `1.5 GiB` or `2 GB` into bytes
pub fn parse_bytes(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let split = input
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    let number = number.trim();

    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid size: {}", input))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("Size must be a non-negative number: {}", input));
    }

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1_000,
        "m" | "mb" => 1_000_000,
        "g" | "gb" => 1_000_000_000,
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1 << 40,
        other => return Err(format!("Unknown size unit: {}", other)),
    };

    Ok((value * multiplier as f64) as u64)
}

/// Format a duration at millisecond precision, e.g. `1m 30s` or `1s 500ms`
pub fn format_duration(duration: Duration) -> String {
    let truncated = Duration::from_millis(duration.as_millis() as u64);
    humantime::format_duration(truncated).to_string()
}

/// Parse a run duration from plain seconds (`2.5`) or a humantime string (`1m 30s`)
///
/// Zero, negative and non-finite second counts all give a zero-length run.
pub fn parse_duration_arg(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<f64>() {
        return Ok(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO));
    }
    humantime::parse_duration(input).map_err(|e| format!("Invalid duration '{}': {}", input, e))
}

/// Format a batch rate with a metric suffix
pub fn format_rate(per_second: f64) -> String {
    if per_second >= 1e9 {
        format!("{:.2}G batches/s", per_second / 1e9)
    } else if per_second >= 1e6 {
        format!("{:.2}M batches/s", per_second / 1e6)
    } else if per_second >= 1e3 {
        format!("{:.2}K batches/s", per_second / 1e3)
    } else {
        format!("{:.2} batches/s", per_second)
    }
}

/// Format a batch latency given in milliseconds
pub fn format_latency_ms(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else if ms >= 1.0 {
        format!("{:.2}ms", ms)
    } else {
        format!("{:.0}μs", ms * 1000.0)
    }
}
