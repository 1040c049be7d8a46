//! Hoist binary entrypoint kept minimal. Commands live in `hoist::args`.

use std::fmt;
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::Parser;

/// Log timestamp formatter producing "YYYY-MM-DD-T HH:MM:SS" in local time.
struct HoistTimer;

impl tracing_subscriber::fmt::time::FormatTime for HoistTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let ts = chrono::Local::now().format("%Y-%m-%d-T %H:%M:%S"); // "YYYY-MM-DD-T HH:MM:SS"
        write!(w, "{ts}")
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Initialize tracing, writing to `<config_dir>/logs/hoist.log`.
///
/// Inputs:
/// - `level`: Filter used when `RUST_LOG` is not set.
///
/// Details:
/// - Falls back to stderr when the log file cannot be opened.
fn init_logging(level: &str) {
    let mut log_path = hoist::config::logs_dir();
    log_path.push("hoist.log");
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(HoistTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(HoistTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

fn main() -> ExitCode {
    let args = hoist::args::Args::parse();
    init_logging(&hoist::args::determine_log_level(&args));

    tracing::info!(command = ?args.command, "hoist starting");
    match hoist::args::process_args(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("hoist: {err}");
            ExitCode::FAILURE
        }
    }
}
