use chrono::Utc;
use clap::Parser;
use pulsebench::config::{BenchConfig, ResultsStorage};
use pulsebench::error::user_friendly_message;
use pulsebench::report::{OutputFormat, RunRecord};
use pulsebench::util::units::{parse_bytes, parse_duration_arg};
use pulsebench::workload::WorkloadRegistry;
use pulsebench::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pulsebench",
    version,
    about = "Run a CPU, memory or IO workload across worker threads and report throughput and latency"
)]
struct Cli {
    /// Workload to run (see --list)
    #[arg(short, long)]
    workload: Option<String>,

    /// Number of worker threads
    #[arg(short, long)]
    threads: Option<usize>,

    /// Working-set size, e.g. 4096, 64MiB or 1GiB
    #[arg(long, value_parser = parse_workset)]
    workset: Option<usize>,

    /// Run duration, e.g. 30s, "1m 30s" or plain seconds
    #[arg(short, long, value_parser = parse_duration_arg, allow_hyphen_values = true)]
    duration: Option<Duration>,

    /// Comma-separated latency percentiles
    #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u8).range(0..=100))]
    percentiles: Option<Vec<u8>>,

    /// Latency histogram buckets (0 disables)
    #[arg(long)]
    histogram_bins: Option<usize>,

    /// Directory for fileio scratch files
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Output format: human, json or csv
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repeat the run and summarize throughput across runs
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Append the results to the history file
    #[arg(long)]
    save: bool,

    /// Print the newest N saved results and exit
    #[arg(long, value_name = "N")]
    history: Option<usize>,

    /// List registered workloads and exit
    #[arg(long)]
    list: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_workset(input: &str) -> std::result::Result<usize, String> {
    let bytes = parse_bytes(input)?;
    usize::try_from(bytes).map_err(|_| format!("Working set too large: {}", input))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Command-line values override the configuration file
fn build_config(cli: &Cli) -> Result<BenchConfig> {
    let mut config = match &cli.config {
        Some(path) => BenchConfig::load_from(path)?,
        None => BenchConfig::load()?,
    };

    if let Some(workload) = &cli.workload {
        config = config.with_workload(workload.clone());
    }
    if let Some(threads) = cli.threads {
        config = config.with_threads(threads);
    }
    if let Some(bytes) = cli.workset {
        config = config.with_workset_bytes(bytes);
    }
    if let Some(duration) = cli.duration {
        config = config.with_duration(duration);
    }
    if let Some(percentiles) = &cli.percentiles {
        config = config.with_percentiles(percentiles.clone());
    }
    if let Some(bins) = cli.histogram_bins {
        config = config.with_histogram_bins(bins);
    }
    if let Some(dir) = &cli.scratch_dir {
        config = config.with_scratch_dir(dir.clone());
    }

    // Keep machine-readable stdout free of progress output
    let progress_visible = cli.format == OutputFormat::Human || cli.output.is_some();
    let show_progress = config.show_progress && !cli.no_progress && progress_visible;
    config = config.with_progress(show_progress);

    config.validate()?;
    Ok(config)
}

/// A directory target gets a timestamped file named after the format
fn resolve_output_path(path: &Path, format: OutputFormat) -> PathBuf {
    if path.is_dir() {
        let name = format!(
            "pulsebench-{}.{}",
            Utc::now().format("%Y%m%d-%H%M%S"),
            format.extension()
        );
        path.join(name)
    } else {
        path.to_path_buf()
    }
}

fn emit(cli: &Cli, rendered: &str) -> Result<()> {
    match &cli.output {
        Some(target) => {
            let path = resolve_output_path(target, cli.format);
            fs::write(&path, rendered)?;
            tracing::info!(path = %path.display(), format = %cli.format, "report written");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    // Listing needs neither the config file nor a valid scratch dir
    if cli.list {
        for name in WorkloadRegistry::with_builtins().list() {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = build_config(&cli)?;

    if let Some(count) = cli.history {
        let records = ResultsStorage::new()?.recent_results(count)?;
        return emit(&cli, &cli.format.render(&records, None)?);
    }

    let mut driver = config.driver();
    let request = config.run_request();

    let (records, throughput) = if cli.runs > 1 {
        let series = driver.run_series(&request, cli.runs)?;
        let records: Vec<RunRecord> = series
            .runs
            .iter()
            .map(|report| RunRecord::from_report(report, config.histogram_bins))
            .collect();
        (records, Some(series.throughput))
    } else {
        let report = driver.run(&request)?;
        (vec![RunRecord::from_report(&report, config.histogram_bins)], None)
    };

    emit(&cli, &cli.format.render(&records, throughput.as_ref())?)?;

    if cli.save {
        let storage = ResultsStorage::new()?;
        storage.append_results(&records)?;
        tracing::info!(path = %storage.path().display(), count = records.len(), "results saved");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pulsebench failed");
            eprintln!("Error: {}", user_friendly_message(&e));
            ExitCode::FAILURE
        }
    }
}
