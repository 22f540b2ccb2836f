//! Redirect tracing with a plain HTTP client.

use log::{info, warn};

use super::{dedupe_hops, validate_start_url, RedirectTracer};
use crate::error_handling::{categorize_reqwest_error, TraceError};
use crate::initialization::init_redirect_client;
use crate::models::{RedirectChain, RedirectHop, TraceConfiguration, TraceStrategy};

/// Issues one GET and lets the client follow up to `max_redirects` hops.
///
/// Only the end of the chain is visible: the result is a single hop holding
/// the final URL and status. Error statuses (4xx/5xx) are reported as hops,
/// not failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClientTracer;

impl RedirectTracer for HttpClientTracer {
    fn strategy(&self) -> TraceStrategy {
        TraceStrategy::HttpClient
    }

    async fn trace(&self, config: &TraceConfiguration) -> Result<RedirectChain, TraceError> {
        let start_url = validate_start_url(&config.start_url)?;
        let client = init_redirect_client(config)?;

        let response = client.get(start_url).send().await.map_err(|e| {
            warn!(
                "Redirect trace for {} failed ({}): {e}",
                config.start_url,
                categorize_reqwest_error(&e)
            );
            TraceError::Request(e)
        })?;

        let hop = RedirectHop::new(response.url().as_str(), response.status().as_u16());
        info!(
            "{} trace for {} ended at {} ({})",
            self.strategy(),
            config.start_url,
            hop.url,
            hop.status_code
        );
        Ok(dedupe_hops([hop]))
    }
}
