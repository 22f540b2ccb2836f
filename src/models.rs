//! Data models shared by the inspector, the tracer and the HTTP handlers.

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::config::{Config, ANDROID_USER_AGENT, DESKTOP_USER_AGENT, IOS_USER_AGENT};

/// How a domain's CNAME target routes link traffic.
///
/// Serialized with the human-readable labels the front end displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CnameFlow {
    #[serde(rename = "Branded Domain Flow")]
    #[strum(serialize = "Branded Domain Flow")]
    BrandedDomainFlow,
    #[serde(rename = "ESP Flow")]
    #[strum(serialize = "ESP Flow")]
    EspFlow,
    #[serde(rename = "Not pointing to recognized flow")]
    #[strum(serialize = "Not pointing to recognized flow")]
    NotRecognized,
    #[serde(rename = "No CNAME found")]
    #[strum(serialize = "No CNAME found")]
    NoCnameFound,
    /// The CNAME lookup itself failed.
    #[serde(rename = "Unknown")]
    #[strum(serialize = "Unknown")]
    Unknown,
}

/// Outcome of probing the domain's click-handler path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ClickHandlerStatus {
    #[serde(rename = "Responded OK")]
    #[strum(serialize = "Responded OK")]
    RespondedOk,
    #[serde(rename = "Responded but not OK")]
    #[strum(serialize = "Responded but not OK")]
    RespondedNotOk,
    #[serde(rename = "Not reachable or error")]
    #[strum(serialize = "Not reachable or error")]
    Unreachable,
}

/// A single CAA resource record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaRecord {
    /// Issuer-critical flag
    pub critical: bool,
    /// Property tag (`issue`, `issuewild`, `iodef`, ...)
    pub tag: String,
    /// Property value, e.g. `letsencrypt.org`
    pub value: String,
}

/// CAA records found for a domain, or the sentinel used when the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaaOutcome {
    Records(Vec<CaaRecord>),
    Error(String),
}

/// Result of `POST /api/domain-check`.
///
/// Each sub-check owns a disjoint set of fields; a failed check leaves its
/// sentinel value in place rather than failing the whole result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCheckResult {
    pub domain: String,
    pub cname: Option<String>,
    pub cname_valid: bool,
    pub cname_flow: CnameFlow,
    pub caa: Option<CaaOutcome>,
    pub caa_valid: Option<bool>,
    pub cert_valid: Option<bool>,
    pub click_handler: Option<ClickHandlerStatus>,
}

impl DomainCheckResult {
    /// Creates a result with every check still pending.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            cname: None,
            cname_valid: false,
            cname_flow: CnameFlow::Unknown,
            caa: None,
            caa_valid: None,
            cert_valid: None,
            click_handler: None,
        }
    }
}

/// One document response observed while following a redirect chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectHop {
    /// Absolute, scheme-qualified URL
    pub url: String,
    #[serde(alias = "status")]
    pub status_code: u16,
}

impl RedirectHop {
    pub fn new(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            status_code,
        }
    }
}

/// Hops in navigation order, unique by URL.
pub type RedirectChain = Vec<RedirectHop>;

/// How the redirect chain is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TraceStrategy {
    /// Drive a headless browser and record every top-level document response
    ScriptedBrowser,
    /// Let an HTTP client follow redirects and record only the final response
    HttpClient,
}

/// Device the scripted browser pretends to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    Ios,
    Android,
    #[default]
    Desktop,
}

impl DeviceProfile {
    /// Maps a free-form device name to a profile; unknown names fall back to desktop.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "ios" => Self::Ios,
            "android" => Self::Android,
            _ => Self::Desktop,
        }
    }

    pub fn user_agent(self) -> &'static str {
        match self {
            Self::Ios => IOS_USER_AGENT,
            Self::Android => ANDROID_USER_AGENT,
            Self::Desktop => DESKTOP_USER_AGENT,
        }
    }
}

/// Everything one trace needs. Owned by a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfiguration {
    pub start_url: String,
    pub strategy: TraceStrategy,
    pub device_profile: DeviceProfile,
    pub max_redirects: usize,
    pub request_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub settle_timeout_ms: u64,
}

impl TraceConfiguration {
    /// Builds a per-request configuration from the process-wide defaults.
    pub fn from_config(
        config: &Config,
        start_url: impl Into<String>,
        strategy: TraceStrategy,
        device_profile: DeviceProfile,
    ) -> Self {
        Self {
            start_url: start_url.into(),
            strategy,
            device_profile,
            max_redirects: config.max_redirects,
            request_timeout_ms: config.request_timeout_ms,
            navigation_timeout_ms: config.navigation_timeout_ms,
            settle_timeout_ms: config.settle_timeout_ms,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }
}
