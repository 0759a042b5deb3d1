//! Logging setup for chatqueue using tracing.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Initialize logging with file appender and console output.
///
/// Falls back to console-only logging when the log directory is unusable,
/// so commands still run. The returned guard must be held until exit.
pub fn init() -> Option<WorkerGuard> {
    match get_log_dir().and_then(|log_dir| init_with_file(&log_dir)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            init_console();
            tracing::warn!("File logging unavailable ({}), logging to stderr only", e);
            None
        }
    }
}

/// Full debug stream to a daily file under `log_dir`, warnings to stderr.
///
/// stdout belongs to the `list` and `json` commands, so the console only
/// sees warnings and errors.
fn init_with_file(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("chatqueue.log")
        .build(log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chatqueue=debug"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::debug!("Log directory: {}", log_dir.display());

    Ok(guard)
}

/// Warnings and errors to stderr, nothing on disk.
fn init_console() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(LevelFilter::WARN)
        .try_init();
}

/// Get the log directory path.
fn get_log_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "chatqueue", "chatqueue")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

    Ok(dirs.data_dir().join("logs"))
}
