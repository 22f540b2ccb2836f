//! HTTP client initialization.
//!
//! This module provides functions to initialize HTTP clients for the
//! click-handler probe and the http-client redirect strategy.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{CLICK_HANDLER_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::models::TraceConfiguration;

/// Initializes the shared client used to probe click handlers.
///
/// Creates a `reqwest::Client` configured with:
/// - a `CLICK_HANDLER_TIMEOUT_SECS` overall timeout
/// - the default redirect policy (up to 10 hops)
/// - the Rustls TLS backend
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client() -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(CLICK_HANDLER_TIMEOUT_SECS))
        .user_agent(DEFAULT_USER_AGENT)
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes a client that follows redirects on its own.
///
/// The client follows at most `config.max_redirects` hops and gives up after
/// `config.request_timeout_ms`. Status codes are never turned into errors;
/// callers read them off the final response.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_redirect_client(config: &TraceConfiguration) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .timeout(config.request_timeout())
        .user_agent(DEFAULT_USER_AGENT)
        .build()
}
