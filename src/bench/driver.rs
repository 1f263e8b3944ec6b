//! Benchmark driver
//!
//! Owns the run loop: resolves the workload, initializes it, fans batches
//! out across worker lanes until the deadline, joins them, shuts the
//! workload down and turns the collected samples into a report.

use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};

use super::progress;
use super::worker::{run_lane, LaneCounters, SampleBuffer};
use crate::models::{detect_parallelism, BenchmarkResult};
use crate::stats::{self, StatsSummary};
use crate::workload::{Workload, WorkloadRegistry};
use crate::{PulseError, Result, DEFAULT_PERCENTILES};

/// Default working-set size (64 MiB)
pub const DEFAULT_WORKSET_BYTES: usize = 64 * 1024 * 1024;

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Ready to accept a run request
    #[default]
    Idle,
    /// Resolving and initializing the workload
    Initializing,
    /// Worker lanes are executing batches
    Running,
    /// Deadline reached, waiting for lanes to join
    Draining,
    /// Shutting down the workload and computing statistics
    Reporting,
    /// Run finished, report returned
    Done,
}

impl RunState {
    /// The state that follows this one in a successful run
    pub fn next(self) -> Option<RunState> {
        match self {
            RunState::Idle => Some(RunState::Initializing),
            RunState::Initializing => Some(RunState::Running),
            RunState::Running => Some(RunState::Draining),
            RunState::Draining => Some(RunState::Reporting),
            RunState::Reporting => Some(RunState::Done),
            RunState::Done => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Initializing => "initializing",
            RunState::Running => "running",
            RunState::Draining => "draining",
            RunState::Reporting => "reporting",
            RunState::Done => "done",
        }
    }
}

/// Parameters of a single benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Registered workload name
    pub workload: String,
    /// Number of worker lanes
    pub threads: usize,
    /// Working-set size handed to `init`
    pub workset_bytes: usize,
    /// Wall-clock duration of the Running phase
    pub duration: Duration,
}

impl RunRequest {
    /// Request with detected parallelism, a 64 MiB working set and a 10 s duration
    pub fn new(workload: impl Into<String>) -> Self {
        Self {
            workload: workload.into(),
            threads: detect_parallelism(),
            workset_bytes: DEFAULT_WORKSET_BYTES,
            duration: Duration::from_secs(10),
        }
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

    /// Set the duration from seconds; zero, negative or non-finite values give a zero-length run
    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        self.duration = Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO);
        self
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Workload the run exercised
    pub workload: String,
    /// Working-set size used
    pub workset_bytes: usize,
    /// Throughput, score and batch counts
    pub result: BenchmarkResult,
    /// Latency distribution of the batches
    pub stats: StatsSummary,
    /// Raw per-batch durations in milliseconds
    pub samples: Vec<f64>,
}

impl RunReport {
    /// Equal-width histogram of the raw samples
    pub fn histogram(&self, bins: usize) -> Vec<u64> {
        stats::histogram(&self.samples, bins)
    }
}

/// Reports of repeated runs plus statistics over their throughputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub runs: Vec<RunReport>,
    /// Distribution of per-run throughput (batches/s)
    pub throughput: StatsSummary,
}

/// Upper bound on a run's length; longer durations are clamped to it
pub const MAX_RUN_DURATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Deadline `duration` after `start`, clamped to [`MAX_RUN_DURATION`]
pub fn deadline_after(start: Instant, duration: Duration) -> Instant {
    if duration > MAX_RUN_DURATION {
        tracing::warn!(
            requested_secs = duration.as_secs(),
            max_secs = MAX_RUN_DURATION.as_secs(),
            "run duration clamped"
        );
    }
    let bounded = duration.min(MAX_RUN_DURATION);
    start
        .checked_add(bounded)
        .or_else(|| start.checked_add(Duration::from_secs(u32::MAX as u64)))
        .unwrap_or(start)
}

/// Executes run requests against workloads from its registry
#[derive(Debug)]
pub struct BenchmarkDriver {
    registry: WorkloadRegistry,
    state: RunState,
    percentiles: Vec<u8>,
    show_progress: bool,
    progress_interval: Duration,
}

impl BenchmarkDriver {
    /// Create a driver with default percentiles (50, 90, 99) and progress shown on stdout
    pub fn new(registry: WorkloadRegistry) -> Self {
        Self {
            registry,
            state: RunState::Idle,
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            show_progress: true,
            progress_interval: progress::DEFAULT_INTERVAL,
        }
    }

    /// Set the percentiles computed for each report
    pub fn with_percentiles(mut self, percentiles: Vec<u8>) -> Self {
        self.percentiles = percentiles;
        self
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Set the progress polling interval
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn registry(&self) -> &WorkloadRegistry {
        &self.registry
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug_assert_eq!(self.state.next(), Some(next));
        tracing::debug!(from = self.state.description(), to = next.description(), "driver state");
        self.state = next;
    }

    /// Execute one run
    ///
    /// An unknown workload fails with [`PulseError::WorkloadNotFound`] before
    /// any lane is spawned and the driver returns to `Idle`.
    pub fn run(&mut self, request: &RunRequest) -> Result<RunReport> {
        self.state = RunState::Idle;
        self.transition(RunState::Initializing);

        let mut workload = match self.prepare(request) {
            Ok(workload) => workload,
            Err(e) => {
                self.state = RunState::Idle;
                return Err(e);
            }
        };

        tracing::info!(
            workload = %request.workload,
            threads = request.threads,
            workset_bytes = request.workset_bytes,
            duration_ms = request.duration.as_millis() as u64,
            "starting benchmark run"
        );

        let samples = SampleBuffer::new();
        let counters = LaneCounters::new();
        let lane_failures = self.execute(workload.as_ref(), request, &samples, &counters);

        self.transition(RunState::Reporting);
        workload.shutdown();

        if lane_failures > 0 {
            self.state = RunState::Idle;
            return Err(PulseError::BenchmarkError(format!(
                "{} worker lane(s) of '{}' panicked",
                lane_failures, request.workload
            )));
        }

        let samples = samples.into_inner();
        let stats = stats::compute_stats(&samples, &self.percentiles);
        let result = BenchmarkResult::new(
            request.threads,
            request.duration,
            counters.batches(),
            counters.raw_score(),
        );
        tracing::info!(
            batches = result.total_batches,
            throughput = result.throughput,
            score = result.score,
            "benchmark run complete"
        );

        self.transition(RunState::Done);
        Ok(RunReport {
            workload: request.workload.clone(),
            workset_bytes: request.workset_bytes,
            result,
            stats,
            samples,
        })
    }

    fn prepare(&self, request: &RunRequest) -> Result<Box<dyn Workload>> {
        let mut workload = self.registry.create(&request.workload)?;
        workload.init(request.threads, request.workset_bytes)?;
        Ok(workload)
    }

    /// Running and Draining: spawn lanes plus the progress lane, then join.
    /// Returns the number of lanes that panicked.
    fn execute(
        &mut self,
        workload: &dyn Workload,
        request: &RunRequest,
        samples: &SampleBuffer,
        counters: &LaneCounters,
    ) -> usize {
        let start = Instant::now();
        let deadline = deadline_after(start, request.duration);
        self.transition(RunState::Running);

        if deadline <= start || request.threads == 0 {
            self.transition(RunState::Draining);
            return 0;
        }

        let bar = progress::create_bar(request.duration, self.show_progress, &request.workload);
        let interval = self.progress_interval;

        thread::scope(|s| {
            s.spawn(move || progress::run_progress(bar, start, deadline, interval));

            let lanes: Vec<_> = (0..request.threads)
                .map(|lane| s.spawn(move || run_lane(lane, workload, deadline, samples, counters)))
                .collect();

            self.transition(RunState::Draining);

            let mut failures = 0;
            for handle in lanes {
                match handle.join() {
                    Ok(summary) => {
                        tracing::debug!(lane = summary.lane, batches = summary.batches, "lane joined")
                    }
                    Err(_) => failures += 1,
                }
            }
            failures
        })
    }

    /// Run the same request `runs` times, each against a fresh workload instance
    pub fn run_series(&mut self, request: &RunRequest, runs: usize) -> Result<SeriesReport> {
        let mut reports = Vec::with_capacity(runs);
        for i in 0..runs {
            tracing::debug!(run = i + 1, of = runs, "series run");
            reports.push(self.run(request)?);
        }

        let throughputs: Vec<f64> = reports.iter().map(|r| r.result.throughput).collect();
        Ok(SeriesReport {
            throughput: stats::compute_stats(&throughputs, &self.percentiles),
            runs: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Lifecycle {
        inits: AtomicUsize,
        shutdowns: AtomicUsize,
        batches: AtomicUsize,
    }

    struct Tracked(Arc<Lifecycle>);

    impl Workload for Tracked {
        fn init(&mut self, _threads: usize, _workset_bytes: usize) -> Result<()> {
            self.0.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn run_batch(&self) -> u64 {
            self.0.batches.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(1));
            1
        }

        fn shutdown(&mut self) {
            self.0.shutdowns.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "tracked"
        }
    }

    fn tracked_driver() -> (BenchmarkDriver, Arc<Lifecycle>) {
        let life = Arc::new(Lifecycle::default());
        let mut registry = WorkloadRegistry::new();
        let shared = Arc::clone(&life);
        registry.register("tracked", move || {
            Box::new(Tracked(Arc::clone(&shared))) as Box<dyn Workload>
        });
        let driver = BenchmarkDriver::new(registry)
            .with_progress(false)
            .with_progress_interval(Duration::from_millis(5));
        (driver, life)
    }

    #[test]
    fn test_huge_duration_is_clamped_not_zero() {
        let start = Instant::now();
        let deadline = deadline_after(start, Duration::MAX);
        assert!(deadline > start + Duration::from_secs(24 * 60 * 60));

        let short = deadline_after(start, Duration::from_millis(5));
        assert_eq!(short, start + Duration::from_millis(5));
        assert_eq!(deadline_after(start, Duration::ZERO), start);
    }

    #[test]
    fn test_state_progression() {
        let mut state = RunState::Idle;
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            seen.push(next);
            state = next;
        }
        assert_eq!(
            seen,
            vec![
                RunState::Idle,
                RunState::Initializing,
                RunState::Running,
                RunState::Draining,
                RunState::Reporting,
                RunState::Done
            ]
        );
    }

    #[test]
    fn test_lifecycle_called_once() {
        let (mut driver, life) = tracked_driver();
        let request = RunRequest::new("tracked")
            .with_threads(3)
            .with_duration(Duration::from_millis(50));

        let report = driver.run(&request).unwrap();

        assert_eq!(driver.state(), RunState::Done);
        assert_eq!(life.inits.load(Ordering::SeqCst), 1);
        assert_eq!(life.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(
            life.batches.load(Ordering::SeqCst) as u64,
            report.result.total_batches
        );
        assert_eq!(report.samples.len() as u64, report.result.total_batches);
        assert_eq!(report.result.raw_score, report.result.total_batches);
        assert_eq!(report.result.threads, 3);
    }

    #[test]
    fn test_unknown_workload_stays_idle() {
        let (mut driver, life) = tracked_driver();
        let err = driver.run(&RunRequest::new("missing")).unwrap_err();

        assert!(matches!(err, PulseError::WorkloadNotFound(ref name) if name == "missing"));
        assert_eq!(driver.state(), RunState::Idle);
        assert_eq!(life.inits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_duration_run() {
        let (mut driver, life) = tracked_driver();
        let request = RunRequest::new("tracked")
            .with_threads(4)
            .with_duration(Duration::ZERO);

        let started = Instant::now();
        let report = driver.run(&request).unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(report.result.total_batches, 0);
        assert_eq!(report.result.throughput, 0.0);
        assert_eq!(report.result.score, 0);
        assert!(report.stats.is_zero());
        assert_eq!(life.batches.load(Ordering::SeqCst), 0);
        assert_eq!(life.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_negative_duration_is_zero_length() {
        let request = RunRequest::new("tracked").with_duration_secs(-3.0);
        assert_eq!(request.duration, Duration::ZERO);
        let request = RunRequest::new("tracked").with_duration_secs(f64::NAN);
        assert_eq!(request.duration, Duration::ZERO);
    }

    #[test]
    fn test_zero_threads_run() {
        let (mut driver, _life) = tracked_driver();
        let request = RunRequest::new("tracked")
            .with_threads(0)
            .with_duration(Duration::from_millis(20));

        let report = driver.run(&request).unwrap();
        assert_eq!(report.result.total_batches, 0);
        assert!(report.stats.is_zero());
    }

    #[test]
    fn test_custom_percentiles() {
        let (driver, _life) = tracked_driver();
        let mut driver = driver.with_percentiles(vec![25, 75]);
        let request = RunRequest::new("tracked")
            .with_threads(1)
            .with_duration(Duration::from_millis(20));

        let report = driver.run(&request).unwrap();
        assert_eq!(report.stats.percentiles.keys().copied().collect::<Vec<_>>(), vec![25, 75]);
    }

    #[test]
    fn test_run_series() {
        let (mut driver, life) = tracked_driver();
        let request = RunRequest::new("tracked")
            .with_threads(1)
            .with_duration(Duration::from_millis(20));

        let series = driver.run_series(&request, 3).unwrap();
        assert_eq!(series.runs.len(), 3);
        assert_eq!(life.inits.load(Ordering::SeqCst), 3);
        assert_eq!(life.shutdowns.load(Ordering::SeqCst), 3);
        assert!(series.throughput.min <= series.throughput.max);
    }

    #[test]
    fn test_report_histogram() {
        let (mut driver, _life) = tracked_driver();
        let request = RunRequest::new("tracked")
            .with_threads(2)
            .with_duration(Duration::from_millis(30));

        let report = driver.run(&request).unwrap();
        let bins = report.histogram(5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().sum::<u64>(), report.result.total_batches);
    }
}
