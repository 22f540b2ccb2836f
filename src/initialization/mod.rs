//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - HTTP clients (click-handler probe, redirect tracing)
//! - DNS resolver
//! - Logger
//! - TLS crypto provider

mod client;
mod logger;
mod resolver;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use client::{init_probe_client, init_redirect_client};
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Initializes the crypto provider for TLS operations.
///
/// Configures the global crypto provider for `rustls`. This must be called before
/// any TLS connections are established.
pub fn init_crypto_provider() {
    // The return value is ignored because reinstalling the provider is harmless
    let _ = CryptoProvider::install_default(default_provider());
}
