use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Env var that overrides the log filter (e.g. `SCRUB_LOG=debug`).
pub const LOG_ENV_VAR: &str = "SCRUB_LOG";

/// Name of the log file for a run started at `now`: `log_YYYYMMDD_HHMMSS.log`.
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("log_{}.log", now.format("%Y%m%d_%H%M%S"))
}

/// Initialize plain-text line logging into a timestamped file in `dir`.
///
/// Each record carries a timestamp, level and message. Defaults to `info` level unless
/// overridden by `SCRUB_LOG`. Returns the path of the log file.
pub fn init_file_logging(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(log_file_name(Local::now()));
    let file =
        File::create(&path).with_context(|| format!("failed to create '{}'", path.display()))?;

    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .try_init();

    Ok(path)
}
