// src/logging.rs

//! Log output for the CLI.
//!
//! Records from the `log` facade go to stderr and, when `logging.dir` is
//! set, to a daily rolling file in that directory.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{AppError, Result};
use crate::models::LoggingConfig;

/// Filter used when `RUST_LOG` is unset.
pub fn default_level(config: &LoggingConfig, verbose: bool) -> &str {
    if verbose { "debug" } else { config.level.as_str() }
}

/// Daily rolling appender keeping at most `max_files` files in `dir`.
pub fn file_appender(config: &LoggingConfig, dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir)?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file_name.as_str())
        .max_log_files(config.max_files)
        .build(dir)
        .map_err(|e| AppError::config(format!("Cannot open log file in {}: {}", dir.display(), e)))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held
/// until the process exits.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(config, verbose)));

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(config, dir)?);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| AppError::config(format!("Cannot install logger: {}", e)))?;

    Ok(guard)
}
