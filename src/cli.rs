use std::{
    fs::OpenOptions,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use argh::FromArgs;
use eyre::WrapErr;
use serde::Serialize;
use thiserror::Error;
use tracing as trc;

use startup_benchmark::{
    baseline, chart,
    compare::Comparison,
    engine,
    extract::LineExtractor,
    metrics::MetricsSnapshot,
    tee::Tee,
};

mod cmd;
mod prompt;

/// The log of every run, written next to the baseline
static RUN_LOG_FILE: &str = "performance_log.txt";

/// The baseline written by a baseline run
static BASELINE_FILE: &str = "baseline_performance.txt";

/// An error that indicates that the program should exit with the given code
#[derive(Error, Debug)]
#[error("Program exited {0}")]
struct Exit(i32);

#[derive(FromArgs)]
/// Benchmark a program's startup phases and compare them to a baseline.
struct Args {
    /// record this run as the baseline instead of comparing against one
    #[argh(switch, short = 'b')]
    baseline_run: bool,

    /// directory for the run log and, for a baseline run, the baseline file
    #[argh(option, short = 'o')]
    output_dir: Option<PathBuf>,

    /// baseline file to compare this run against
    #[argh(option)]
    baseline: Option<PathBuf>,

    /// also write the results as JSON to this file
    #[argh(option)]
    json: Option<PathBuf>,

    /// also render the comparison as an SVG chart to this file
    #[argh(option)]
    chart: Option<PathBuf>,

    /// the program to benchmark followed by its arguments
    #[argh(positional)]
    command: Vec<String>,
}

/// What to do with the captured metrics once the run is over
enum Mode {
    /// Save them as a new baseline
    Record(PathBuf),
    /// Compare them against a stored baseline
    Compare(PathBuf),
    /// Only keep the run log
    LogOnly,
}

/// Start program logic
fn start() -> eyre::Result<()> {
    let args: Args = trc::debug_span!("Parsing commandline args").in_scope(|| argh::from_env());

    let (program, program_args) = match args.command.split_first() {
        Some(split) => split,
        None => eyre::bail!("No program to benchmark; pass it after `--`"),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut console = io::stdout();

    let baseline_run = args.baseline_run
        || (args.baseline.is_none()
            && prompt::ask_yes_no(&mut input, &mut console, "Is this the baseline PC? (y/n): ")?);

    // Output directory
    let output_dir = match args.output_dir.clone() {
        Some(dir) => Some(dir),
        None => prompt::ask_path(
            &mut input,
            &mut console,
            "Select directory for current run output: ",
        )?,
    };
    let output_dir = require_output_dir(output_dir, &mut console)?;

    let mode = if baseline_run {
        Mode::Record(output_dir.join(BASELINE_FILE))
    } else {
        let path = match args.baseline.clone() {
            Some(path) => Some(path),
            None => prompt::ask_path(
                &mut input,
                &mut console,
                "Please select the baseline performance file (baseline_performance.txt): ",
            )?,
        };
        match path {
            Some(path) => Mode::Compare(path),
            None => {
                println!("No baseline file selected. Will only save current performance data.");
                Mode::LogOnly
            }
        }
    };

    let log_path = output_dir.join(RUN_LOG_FILE);
    let log_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&log_path)
        .wrap_err_with(|| format!("Could not create run log {}", log_path.display()))?;

    // Everything from here on goes to both the console and the run log
    let stdout = io::stdout();
    let mut out = Tee::new(LineExtractor::new(stdout.lock()), BufWriter::new(log_file));

    trc::info_span!("Benchmarking", %program).in_scope(|| -> eyre::Result<()> {
        let mut child = cmd::ChildEngine::new(program, program_args);
        engine::run_engine(&mut child, &mut out)?;

        Ok(())
    })?;

    let metrics = *out.get_ref().0.metrics();
    trc::debug!(?metrics, "Run finished");

    match &mode {
        Mode::Record(path) => {
            baseline::save(&metrics, path)?;
            writeln!(out, "\nBaseline metrics saved to: {}", path.display())?;
            writeln!(out, "Copy this file to compare performance on other PCs.")?;
            if let Some(json) = &args.json {
                write_json(&metrics, json)?;
            }
        }
        Mode::Compare(path) => compare(
            &metrics,
            path,
            args.json.as_deref(),
            args.chart.as_deref(),
            &mut out,
        )?,
        Mode::LogOnly => {
            if let Some(json) = &args.json {
                write_json(&metrics, json)?;
            }
        }
    }

    if args.chart.is_some() && !matches!(mode, Mode::Compare(_)) {
        trc::warn!("No baseline to compare against, skipping chart");
    }

    let (extractor, mut log) = out.into_inner();
    extractor.finish()?;
    log.flush().wrap_err("Could not write run log")?;

    trc::info!("Run log is in `{}`", log_path.display());

    Ok(())
}

/// Without an output directory there is nowhere to log the run, so stop with code 1
fn require_output_dir<W: Write>(dir: Option<PathBuf>, console: &mut W) -> eyre::Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => {
            writeln!(console, "No directory selected. Exiting.")?;
            Err(Exit(1).into())
        }
    }
}

/// Compare a run against a stored baseline and report it to `out`
///
/// An unreadable or malformed baseline is reported as a warning rather than
/// failing the run.
fn compare<W: Write>(
    metrics: &MetricsSnapshot,
    path: &Path,
    json: Option<&Path>,
    chart: Option<&Path>,
    out: &mut W,
) -> eyre::Result<()> {
    let decoded = match baseline::load(path) {
        Ok(decoded) => decoded,
        Err(report) => {
            trc::warn!("{:?}", report);
            writeln!(out, "Warning: {}", report)?;
            return Ok(());
        }
    };
    if let Some(warning) = &decoded.warning {
        writeln!(out, "Warning: {}", warning)?;
    }

    let comparison = Comparison::new(metrics, &decoded.snapshot);
    write!(out, "{}", comparison)?;

    if let Some(json) = json {
        write_json(&comparison, json)?;
    }
    if let Some(path) = chart {
        chart::render_svg(&comparison, path)?;
    }

    Ok(())
}

#[trc::instrument(skip(value))]
fn write_json<T: Serialize>(value: &T, path: &Path) -> eyre::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .wrap_err_with(|| format!("Could not create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).wrap_err("Could not write JSON")?;

    Ok(())
}

/// Run the benchmark CLI and exit with its status
pub fn run() {
    install_tracing();
    color_eyre::install().expect("Could not install error handler");

    match start() {
        Ok(()) => (),
        // The reason for an `Exit` was already shown to the operator
        Err(report) => match report.downcast_ref::<Exit>() {
            Some(Exit(code)) => std::process::exit(*code),
            None => {
                trc::error!("{:?}", report);
                std::process::exit(1);
            }
        },
    }
}

fn install_tracing() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, fmt::format::FmtSpan, EnvFilter};

    // Logs go to stderr; stdout belongs to the benchmarked program
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(io::stderr);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}
