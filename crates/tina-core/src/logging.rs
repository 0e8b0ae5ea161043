//! Tracing setup.
//!
//! Logs go to ${TINA_HOME}/logs/tina.log so stdout stays owned by the chat
//! renderer. The filter comes from `TINA_LOG`, then the config `log_level`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter expression.
pub const LOG_ENV: &str = "TINA_LOG";

const LOG_FILE_NAME: &str = "tina.log";

/// Builds the filter from `TINA_LOG`, falling back to `default_level`.
///
/// An invalid expression is reported on stderr and replaced with `info`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => match default_level.parse::<EnvFilter>() {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "WARN: log_level '{default_level}' is not a valid tracing filter ({e}); \
                     falling back to 'info'"
                );
                EnvFilter::new("info")
            }
        },
    }
}

/// Installs the global subscriber writing to `<logs_dir>/tina.log`.
///
/// Keep the returned guard alive for the whole program; dropping it flushes
/// and stops the background writer.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init(logs_dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::never(logs_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_level))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))?;

    Ok(guard)
}
