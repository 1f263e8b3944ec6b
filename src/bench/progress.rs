//! Best-effort progress display
//!
//! The progress lane only reads the monotonic clock. It never synchronizes
//! with the worker lanes and simply stops polling once the deadline passes.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::thread;
use std::time::{Duration, Instant};

/// Default polling interval for the progress lane
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

const BAR_TEMPLATE: &str = "{spinner} [{bar:40.cyan/blue}] {percent:>3}% {elapsed_precise} {msg}";

/// Build a bounded-width progress bar on stdout, or a hidden one
pub fn create_bar(duration: Duration, visible: bool, workload: &str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let length = duration.as_millis().max(1) as u64;
    let bar = ProgressBar::with_draw_target(Some(length), ProgressDrawTarget::stdout());
    let style = ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(workload.to_string());
    bar
}

/// Fraction of the run elapsed at `now`, clamped to 0.0..=1.0
pub fn completion(start: Instant, deadline: Instant, now: Instant) -> f64 {
    let total = deadline.saturating_duration_since(start);
    if total.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    (elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0)
}

/// Poll the clock every `interval` until `deadline`, updating `bar`
pub fn run_progress(bar: ProgressBar, start: Instant, deadline: Instant, interval: Duration) {
    let length = bar.length().unwrap_or(0);
    loop {
        let now = Instant::now();
        bar.set_position((completion(start, deadline, now) * length as f64) as u64);
        if now >= deadline {
            break;
        }
        thread::sleep(interval.min(deadline - now));
    }
    bar.finish();
}
