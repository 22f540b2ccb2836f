//! Redirect chain tracing.
//!
//! Two strategies resolve a redirect chain behind the same `RedirectTracer`
//! contract:
//! - `BrowserTracer` drives a disposable headless browser and records every
//!   top-level HTTPS document response, including client-side redirects.
//! - `HttpClientTracer` lets the HTTP client follow redirects and records only
//!   the final response.
//!
//! Both return hops deduplicated by URL, first occurrence first.

mod browser;
mod http;

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;

use url::Url;

use crate::error_handling::TraceError;
use crate::models::{RedirectChain, RedirectHop, TraceConfiguration, TraceStrategy};

pub use browser::BrowserTracer;
pub use http::HttpClientTracer;

/// Resolves a redirect chain for a start URL.
pub trait RedirectTracer {
    /// The strategy this tracer implements.
    fn strategy(&self) -> TraceStrategy;

    /// Follows redirects from `config.start_url` and returns the hops.
    fn trace(
        &self,
        config: &TraceConfiguration,
    ) -> impl Future<Output = Result<RedirectChain, TraceError>> + Send;
}

/// Dispatches a trace to the tracer named by the configuration's strategy.
#[derive(Debug, Clone)]
pub struct Tracer {
    browser: BrowserTracer,
    http: HttpClientTracer,
}

impl Tracer {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self {
            browser: BrowserTracer::new(chrome_path),
            http: HttpClientTracer,
        }
    }

    pub async fn trace(&self, config: &TraceConfiguration) -> Result<RedirectChain, TraceError> {
        log::debug!(
            "Tracing {} with strategy {}",
            config.start_url,
            config.strategy
        );
        match config.strategy {
            TraceStrategy::ScriptedBrowser => self.browser.trace(config).await,
            TraceStrategy::HttpClient => self.http.trace(config).await,
        }
    }
}

/// Keeps the first hop seen for each URL, preserving order.
pub fn dedupe_hops(hops: impl IntoIterator<Item = RedirectHop>) -> RedirectChain {
    let mut seen = HashSet::new();
    hops.into_iter()
        .filter(|hop| seen.insert(hop.url.clone()))
        .collect()
}

/// Parses the start URL and requires an http(s) scheme and a host.
pub fn validate_start_url(raw: &str) -> Result<Url, TraceError> {
    let invalid = |reason: String| TraceError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests;
