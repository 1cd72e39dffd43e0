//! Logging configuration for athena-review.
//!
//! Logs go to stderr so stdout carries only query results, or to a file
//! when one is requested.

use crate::error::{Result, ReviewError};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes logging to the file at `path`, truncating it.
pub fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            ReviewError::config(format!(
                "Could not create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let log_file = File::create(path).map_err(|e| {
        ReviewError::config(format!("Could not create log file {}: {e}", path.display()))
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false) // No ANSI colors in file output
        .init();
    Ok(())
}

/// Returns the default path for the log file.
///
/// Uses XDG state directory on Linux (`~/.local/state/athena-review/athena-review.log`),
/// or falls back to config directory on other platforms.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("athena-review").join("athena-review.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("athena-review").join("athena-review.log");
    }

    std::env::temp_dir().join("athena-review.log")
}
