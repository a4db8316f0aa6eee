//! Tracing subscriber setup.
//!
//! The filter comes from `CAREERHUB_LOG` when set, otherwise from the
//! configured `log_level`. The TUI owns the terminal, so it logs to a daily
//! rolling file instead of stderr.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV_VAR: &str = "CAREERHUB_LOG";

/// Where log lines are written.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// Daily rolling files inside the given directory.
    File(PathBuf),
}

/// Keeps the non-blocking file writer alive; drop it last to flush.
#[must_use = "dropping the guard stops the background log writer"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Builds the effective filter: env var first, then `default_level`.
pub fn build_filter(default_level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return Ok(filter);
    }
    EnvFilter::try_new(default_level)
        .with_context(|| format!("Invalid log_level directive: {default_level}"))
}

/// Installs the global subscriber.
///
/// # Errors
/// Returns an error if the filter is invalid, the log directory cannot be
/// created, or a subscriber is already installed.
pub fn init(default_level: &str, target: LogTarget) -> Result<LogGuard> {
    let filter = build_filter(default_level)?;

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .map_err(|e| anyhow!(e))
                .context("install stderr logger")?;
            Ok(LogGuard { _worker: None })
        }
        LogTarget::File(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, "careerhub.log");
            let (writer, worker) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!(e))
                .context("install file logger")?;
            Ok(LogGuard {
                _worker: Some(worker),
            })
        }
    }
}
