use pulsebench::bench::{BenchmarkDriver, RunRequest, RunState};
use pulsebench::config::BenchConfig;
use pulsebench::workload::{Workload, WorkloadRegistry};
use pulsebench::{PulseError, Result, TEMP_FILE_PREFIX};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Sleeps a fixed interval per batch
struct Sleeper {
    interval: Duration,
}

impl Workload for Sleeper {
    fn init(&mut self, _threads: usize, _workset_bytes: usize) -> Result<()> {
        Ok(())
    }

    fn run_batch(&self) -> u64 {
        thread::sleep(self.interval);
        1
    }

    fn shutdown(&mut self) {}

    fn name(&self) -> &str {
        "sleep"
    }
}

fn sleep_driver(interval: Duration) -> BenchmarkDriver {
    let mut registry = WorkloadRegistry::new();
    registry.register("sleep", move || Box::new(Sleeper { interval }) as Box<dyn Workload>);
    BenchmarkDriver::new(registry).with_progress(false)
}

#[test]
fn test_batch_count_tracks_lanes_and_duration() {
    let interval = Duration::from_millis(10);
    let duration = Duration::from_millis(200);
    let threads = 3u64;
    let per_lane = (duration.as_millis() / interval.as_millis()) as u64;

    let mut driver = sleep_driver(interval);
    let request = RunRequest::new("sleep")
        .with_threads(threads as usize)
        .with_duration(duration);
    let report = driver.run(&request).expect("sleep run should succeed");

    let batches = report.result.total_batches;
    assert!(batches <= threads * (per_lane + 1), "too many batches: {}", batches);
    assert!(batches >= threads * per_lane / 2, "too few batches: {}", batches);
    assert_eq!(report.samples.len() as u64, batches);
    assert!(report.stats.min >= 9.5);
    let p50 = report.stats.percentile(50).expect("p50 is a default percentile");
    let p99 = report.stats.percentile(99).expect("p99 is a default percentile");
    assert!(p50 >= report.stats.min);
    assert!(p99 <= report.stats.max);
    assert_eq!(report.stats.percentile(42), None);
}

#[test]
fn test_factory_never_invoked_for_unknown_workload() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let mut registry = WorkloadRegistry::new();
    registry.register("sleep", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Box::new(Sleeper {
            interval: Duration::from_millis(1),
        }) as Box<dyn Workload>
    });
    let mut driver = BenchmarkDriver::new(registry).with_progress(false);

    let err = driver.run(&RunRequest::new("nope")).unwrap_err();
    assert!(matches!(err, PulseError::WorkloadNotFound(_)));
    assert_eq!(created.load(Ordering::SeqCst), 0);
    assert_eq!(driver.state(), RunState::Idle);
}

#[test]
fn test_sequential_runs_are_independent() {
    let mut driver = sleep_driver(Duration::from_millis(5));
    let request = RunRequest::new("sleep")
        .with_threads(1)
        .with_duration(Duration::from_millis(50));

    let first = driver.run(&request).unwrap();
    let second = driver.run(&request).unwrap();

    assert_eq!(driver.state(), RunState::Done);
    assert_eq!(first.samples.len() as u64, first.result.total_batches);
    assert_eq!(second.samples.len() as u64, second.result.total_batches);
    assert!(second.result.total_batches <= 11);
}

#[test]
fn test_every_builtin_runs_and_cleans_up() {
    let scratch = TempDir::new().unwrap();
    let config = BenchConfig::new()
        .with_threads(2)
        .with_workset_bytes(64 * 1024)
        .with_duration(Duration::from_millis(100))
        .with_scratch_dir(scratch.path().to_path_buf())
        .with_progress(false);
    let mut driver = config.driver();

    for name in driver.registry().list() {
        let request = config.run_request();
        let request = RunRequest { workload: name.clone(), ..request };
        let report = driver.run(&request).unwrap_or_else(|e| panic!("{} failed: {}", name, e));

        assert_eq!(report.workload, name);
        assert!(report.result.total_batches > 0, "{} completed no batches", name);
        assert!(report.result.score > 0);
        assert!(report.stats.max >= report.stats.min);
    }

    let leftovers: Vec<_> = std::fs::read_dir(scratch.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(TEMP_FILE_PREFIX))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_fileio_missing_scratch_dir_fails_before_running() {
    let scratch = TempDir::new().unwrap();
    let missing = scratch.path().join("gone");
    let mut registry = WorkloadRegistry::new();
    pulsebench::workload::register_builtin_workloads(&mut registry, missing);
    let mut driver = BenchmarkDriver::new(registry).with_progress(false);

    let request = RunRequest::new("fileio")
        .with_threads(1)
        .with_workset_bytes(4096)
        .with_duration(Duration::from_secs(5));
    let err = driver.run(&request).unwrap_err();

    assert!(matches!(err, PulseError::BenchmarkError(_)));
    assert_eq!(driver.state(), RunState::Idle);
}

#[test]
fn test_series_summarizes_throughput() {
    let mut driver = sleep_driver(Duration::from_millis(5));
    let request = RunRequest::new("sleep")
        .with_threads(2)
        .with_duration(Duration::from_millis(40));

    let series = driver.run_series(&request, 3).unwrap();
    assert_eq!(series.runs.len(), 3);
    let throughputs: Vec<f64> = series.runs.iter().map(|r| r.result.throughput).collect();
    let max = throughputs.iter().cloned().fold(f64::MIN, f64::max);
    assert_eq!(series.throughput.max, max);
}
