//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. Supports both plain text
/// (with colors) and JSON formats for structured logging.
///
/// The logger reads from the `RUST_LOG` environment variable first; the
/// provided `level` overrides it.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=domain_check=debug,chromiumoxide=info domain_check
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    // chromiumoxide logs every unrecognised CDP message at warn/error level
    builder.filter_module("chromiumoxide", LevelFilter::Error);
    builder.filter_module("tungstenite", LevelFilter::Warn);
    builder.filter_module("hickory_proto", LevelFilter::Error);
    builder.filter_module("domain_check", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init() so a second initialization (tests) reports an error instead of panicking
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
