//! domain_check library: domain DNS/TLS inspection and redirect tracing
//!
//! This library backs a small HTTP JSON API that answers two questions about
//! a tracking-link setup:
//!
//! - Is a domain wired correctly? (CNAME target, CAA issuer, certificate
//!   validity, click-handler health)
//! - Where does a URL end up? (the redirect chain, captured either by a
//!   scripted headless browser or by a plain HTTP client)
//!
//! # Example
//!
//! ```no_run
//! use domain_check::{run_server, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     port: 8080,
//!     ..Default::default()
//! };
//!
//! run_server(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. The scripted-browser strategy also
//! needs a Chrome or Chromium binary on the host.

pub mod config;
pub mod dns;
pub mod domain;
mod error_handling;
pub mod initialization;
pub mod models;
pub mod redirect;
pub mod server;
pub mod tls;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use domain::DomainInspector;
pub use error_handling::{ApiError, InitializationError, RequestFailureKind, TraceError};
pub use models::{
    DeviceProfile, DomainCheckResult, RedirectChain, RedirectHop, TraceConfiguration,
    TraceStrategy,
};
pub use redirect::{RedirectTracer, Tracer};
pub use server::{build_router, AppState};

/// Runs the HTTP API until Ctrl-C or SIGTERM.
///
/// Binds `config.bind_address:config.port`, serves the JSON endpoints and the
/// static directory, then drains in-flight requests on shutdown.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    server::start_server(config).await
}
