//! Testpulse - forwards test-run lifecycle events to a telemetry backend
//!
//! The host runner pipes NDJSON lifecycle events into `testpulse run`; each
//! line becomes one observer callback. All logging goes to stderr - stdout
//! belongs to whatever the runner wants to do with it.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use testpulse_core::config::{
    LoggerParams, CONNECTION_STRING_KEY, DEBUG_KEY, DEFAULT_TELEMETRY_DIR, TELEMETRY_DIR_KEY,
};
use testpulse_core::harness::{self, RunObserver, RunnerHarness};
use testpulse_core::harness::events::RunnerEvent;
use testpulse_core::shell::TestRunLogger;
use testpulse_core::sink::JsonlSink;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "testpulse",
    about = "Forwards test-run telemetry to a cloud ingestion endpoint",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,
}

#[derive(Parser, Debug)]
enum Command {
    /// Read lifecycle events from stdin and forward telemetry
    Run {
        /// Telemetry ingestion connection string; without it the run is a no-op
        #[clap(long)]
        connection_string: Option<String>,

        /// Mirror mapping decisions to stderr
        #[clap(long)]
        debug: bool,

        /// Output directory for the file sink
        #[clap(long)]
        telemetry_dir: Option<PathBuf>,

        /// Raw activation parameter, repeatable (KEY=VALUE); wins over flags
        #[clap(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}

/// Initialize tracing from the --log-level flag.
///
/// Logs go to stderr: stdout is reserved for the host runner.
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::new(log_level.to_filter_directive());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    match cli.command {
        Command::Run {
            connection_string,
            debug,
            telemetry_dir,
            params,
        } => run_command(connection_string, debug, telemetry_dir, &params),
    }
}

/// Merge convenience flags and raw --param pairs into the flat parameter
/// map the plugin contract defines. Raw pairs are applied last, so an
/// explicit --param overrides its flag.
fn build_params(
    connection_string: Option<String>,
    debug: bool,
    telemetry_dir: Option<PathBuf>,
    raw_params: &[String],
) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    if let Some(cs) = connection_string {
        map.insert(CONNECTION_STRING_KEY.to_string(), cs);
    }
    if debug {
        map.insert(DEBUG_KEY.to_string(), "true".to_string());
    }
    if let Some(dir) = telemetry_dir {
        map.insert(TELEMETRY_DIR_KEY.to_string(), dir.display().to_string());
    }
    for raw in raw_params {
        let Some((key, value)) = raw.split_once('=') else {
            bail!("invalid --param {raw:?}, expected KEY=VALUE");
        };
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

fn run_command(
    connection_string: Option<String>,
    debug: bool,
    telemetry_dir: Option<PathBuf>,
    raw_params: &[String],
) -> Result<()> {
    let map = build_params(connection_string, debug, telemetry_dir, raw_params)?;
    let params = LoggerParams::from_map(&map);

    let destination = params
        .telemetry_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TELEMETRY_DIR));

    let mut logger = TestRunLogger::configure(&params, |_connection_string| {
        JsonlSink::create(&destination)
    })
    .context("failed to open the telemetry sink")?;

    // Telemetry is opt-in. Without a connection string there is nothing to
    // forward, so the event stream is never subscribed to.
    let Some(sink) = logger.sink() else {
        return Ok(());
    };
    info!("writing telemetry to {:?}", sink.path());

    let stdin = io::stdin();
    forward_events(stdin.lock(), &mut logger)?;

    if let Some(e) = logger.flush_error() {
        bail!("final telemetry flush failed: {e}");
    }
    Ok(())
}

/// Feed NDJSON events from `reader` into the observer.
///
/// A malformed line is logged and skipped; the stream keeps going. If the
/// stream ends without a RunComplete event the completion handler is still
/// invoked, so the final flush always happens before exit.
fn forward_events<R: BufRead, O: RunObserver>(reader: R, observer: &mut O) -> Result<()> {
    let mut saw_run_complete = false;

    for line in reader.lines() {
        let line = line.context("failed to read event from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match RunnerHarness::parse_event(&line) {
            Ok(event) => {
                debug!("dispatching {} event", event.event_name());
                if matches!(event, RunnerEvent::RunComplete(_)) {
                    saw_run_complete = true;
                }
                harness::dispatch(observer, &event);
            }
            Err(e) => warn!("skipping malformed event: {e:#}"),
        }
    }

    if !saw_run_complete {
        debug!("event stream ended without RunComplete, forcing final flush");
        observer.on_run_complete();
    }
    Ok(())
}
