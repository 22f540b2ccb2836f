//! Configuration constants.
//!
//! This module defines the constants used throughout the service, including
//! timeouts, provider markers and the device user-agent table.

use std::time::Duration;

// Server defaults
/// Default listening port (overridden by `--port` or `PORT`)
pub const DEFAULT_PORT: u16 = 3000;
/// Default bind address
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
/// Directory served for unmatched GET paths
pub const DEFAULT_STATIC_DIR: &str = "public";

// Redirect tracing
/// Maximum number of redirects the HTTP client strategy follows
pub const MAX_REDIRECT_HOPS: usize = 10;
/// Overall request timeout for the HTTP client strategy, in milliseconds
pub const REDIRECT_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Browser navigation timeout (until DOMContentLoaded), in milliseconds
pub const NAVIGATION_TIMEOUT_MS: u64 = 15_000;
/// Extra wait after navigation to catch client-side redirects, in milliseconds
pub const SETTLE_TIMEOUT_MS: u64 = 5_000;
/// How long the browser gets to shut down before it is killed
pub const BROWSER_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

// Network operation timeouts
/// DNS query timeout in seconds
/// Most DNS queries complete in <1s, 3s fails fast on unresponsive servers
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connection timeout for the certificate check, in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 3;
/// TLS handshake timeout for the certificate check, in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 3;
/// Timeout for the click-handler probe, in seconds
pub const CLICK_HANDLER_TIMEOUT_SECS: u64 = 5;

// Domain inspection
/// CNAME substring that marks a branded-domain link setup
pub const BRANDED_FLOW_MARKER: &str = "customlinks.appsflyer.com";
/// CNAME substring that marks an ESP (email service provider) link setup
pub const ESP_FLOW_MARKER: &str = "esplinks.appsflyer.com";
/// CNAME substring required for `cnameValid`
pub const PROVIDER_ROOT_MARKER: &str = "appsflyer.com";
/// CAA issuer that keeps a non-empty CAA set valid
pub const TRUSTED_CAA_ISSUER: &str = "letsencrypt.org";
/// Well-known path answered by a healthy click handler
pub const CLICK_HANDLER_PATH: &str = "/onelink";
/// Body a healthy click handler answers with (compared case-insensitively, trimmed)
pub const CLICK_HANDLER_OK_BODY: &str = "ok";

// Device user agents
/// User-Agent sent by the scripted browser for the `ios` profile
pub const IOS_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";
/// User-Agent sent by the scripted browser for the `android` profile
pub const ANDROID_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.105 Mobile Safari/537.36";
/// User-Agent sent by the scripted browser for the `desktop` profile
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// User-Agent for the plain HTTP client (redirect strategy and click-handler probe).
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
