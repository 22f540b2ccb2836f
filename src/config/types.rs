//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_PORT, DEFAULT_STATIC_DIR, MAX_REDIRECT_HOPS,
    NAVIGATION_TIMEOUT_MS, REDIRECT_REQUEST_TIMEOUT_MS, SETTLE_TIMEOUT_MS,
};
use crate::models::TraceStrategy;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Built once at startup and shared read-only by every request handler.
///
/// # Examples
///
/// ```no_run
/// use domain_check::Config;
///
/// let config = Config {
///     port: 8080,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Address to bind to
    pub bind_address: String,

    /// Directory served for unmatched GET paths
    pub static_dir: PathBuf,

    /// Strategy used by `/api/redirect` when the request does not name one
    pub redirect_strategy: TraceStrategy,

    /// Redirects followed by the HTTP client strategy
    pub max_redirects: usize,

    /// Request timeout for the HTTP client strategy, in milliseconds
    pub request_timeout_ms: u64,

    /// Browser navigation timeout, in milliseconds
    pub navigation_timeout_ms: u64,

    /// Wait after navigation for client-side redirects, in milliseconds
    pub settle_timeout_ms: u64,

    /// Chromium executable; auto-detected when `None`
    pub chrome_path: Option<PathBuf>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            redirect_strategy: TraceStrategy::ScriptedBrowser,
            max_redirects: MAX_REDIRECT_HOPS,
            request_timeout_ms: REDIRECT_REQUEST_TIMEOUT_MS,
            navigation_timeout_ms: NAVIGATION_TIMEOUT_MS,
            settle_timeout_ms: SETTLE_TIMEOUT_MS,
            chrome_path: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

/// Command-line options.
///
/// Every option can also be supplied through the environment (`PORT` is the
/// one most deployments set).
///
/// # Examples
///
/// ```bash
/// # Listen on the default port (3000)
/// domain_check
///
/// # Trace redirects with the plain HTTP client by default
/// PORT=8080 domain_check --redirect-strategy http-client
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "domain_check",
    about = "Inspects a domain's link setup (CNAME, CAA, TLS) and traces redirect chains."
)]
pub struct Opt {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, env = "BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
    pub bind_address: String,

    /// Directory of static files served for unmatched GET paths
    #[arg(long, env = "STATIC_DIR", value_parser, default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,

    /// Default redirect tracing strategy: scripted-browser|http-client
    #[arg(long, env = "REDIRECT_STRATEGY", value_enum, default_value_t = TraceStrategy::ScriptedBrowser)]
    pub redirect_strategy: TraceStrategy,

    /// Maximum redirects followed by the http-client strategy
    #[arg(long, default_value_t = MAX_REDIRECT_HOPS)]
    pub max_redirects: usize,

    /// Request timeout for the http-client strategy, in milliseconds
    #[arg(long, default_value_t = REDIRECT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,

    /// Browser navigation timeout, in milliseconds
    #[arg(long, default_value_t = NAVIGATION_TIMEOUT_MS)]
    pub navigation_timeout_ms: u64,

    /// Extra wait after navigation for client-side redirects, in milliseconds
    #[arg(long, default_value_t = SETTLE_TIMEOUT_MS)]
    pub settle_timeout_ms: u64,

    /// Path to the Chromium/Chrome executable (auto-detected if omitted)
    #[arg(long, env = "CHROME_PATH", value_parser)]
    pub chrome_path: Option<PathBuf>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            port: opt.port,
            bind_address: opt.bind_address,
            static_dir: opt.static_dir,
            redirect_strategy: opt.redirect_strategy,
            max_redirects: opt.max_redirects,
            request_timeout_ms: opt.request_timeout_ms,
            navigation_timeout_ms: opt.navigation_timeout_ms,
            settle_timeout_ms: opt.settle_timeout_ms,
            chrome_path: opt.chrome_path,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}
