//! Logging system initialization
//!
//! Sets up tracing according to the `[logging]` section: console or file
//! output, optional daily rotation, text or JSON formatting.

use std::path::Path;

use tracing_appender::{non_blocking::WorkerGuard, rolling};

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::{Result, SlideforgeError};

const DEFAULT_LOG_FILE: &str = "slideforge.log";

/// Initialize logging system based on configuration
///
/// **Note**: Call once at startup, after configuration has been loaded.
/// The returned `WorkerGuard` must be kept alive for the duration of the
/// program so buffered log lines are flushed on exit.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let to_file = config.file.as_deref().is_some_and(|f| !f.is_empty());
    let writer = build_writer(config)?;

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| SlideforgeError::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(!to_file);

    let installed = match config.format {
        LogFormat::Json => subscriber_builder.json().try_init(),
        LogFormat::Text => subscriber_builder.try_init(),
    };
    installed.map_err(|e| SlideforgeError::config(format!("Failed to install logger: {}", e)))?;

    Ok(guard)
}

fn build_writer(config: &LoggingConfig) -> Result<Box<dyn std::io::Write + Send + Sync>> {
    let log_file = match config.file.as_deref() {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(Box::new(std::io::stdout())),
    };

    if config.enable_rotation {
        let path = Path::new(log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_LOG_FILE);

        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups.max(1) as usize)
            .build(dir)
            .map_err(|e| {
                SlideforgeError::file_operation(format!(
                    "Failed to create rolling log appender in {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        Ok(Box::new(appender))
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|e| {
                SlideforgeError::file_operation(format!(
                    "Failed to open log file {}: {}",
                    log_file, e
                ))
            })?;
        Ok(Box::new(file))
    }
}
