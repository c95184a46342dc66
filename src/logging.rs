use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Where log lines go. The terminal UI owns stdout, so it logs to file only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    FileOnly,
    FileAndStderr,
}

pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("gita_chat_{}.log", now.format("%Y%m%d_%H%M%S"))
}

/// Creates the log directory and returns the path of this session's log file.
pub fn prepare_log_file(log_dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    Ok(log_dir.join(log_file_name(now)))
}

/// Installs the global subscriber. Keep the guard alive until exit so buffered lines flush.
pub fn init(log_dir: &Path, target: LogTarget) -> Result<WorkerGuard> {
    let path = prepare_log_file(log_dir, Local::now())?;
    let file_name = path
        .file_name()
        .context("Log file path has no file name")?
        .to_owned();
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Reads log level from RUST_LOG (e.g. RUST_LOG=gita_chat=debug), default info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
    let stderr_layer = match target {
        LogTarget::FileAndStderr => Some(fmt::layer().with_writer(std::io::stderr)),
        LogTarget::FileOnly => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(log_file = %path.display(), "Logging initialised");
    Ok(guard)
}
