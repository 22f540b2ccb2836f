//! DNS resolver initialization.
//!
//! This module provides functions to initialize the DNS resolver with proper
//! timeout configuration.

use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;

/// Initializes the DNS resolver used for CNAME and CAA lookups.
///
/// Uses the default upstream configuration with short timeouts so a slow DNS
/// server cannot hold a domain check open.
///
/// `ndots` is set to 0 so user-supplied names are never expanded with search
/// domains.
pub fn init_resolver() -> Arc<TokioAsyncResolver> {
    use hickory_resolver::config::{ResolverConfig, ResolverOpts};

    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(crate::config::DNS_TIMEOUT_SECS);
    opts.attempts = 2; // Reduce retry attempts to fail faster
    opts.ndots = 0;

    Arc::new(TokioAsyncResolver::tokio(ResolverConfig::default(), opts))
}
