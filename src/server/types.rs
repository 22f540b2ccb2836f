//! Server state and request/response bodies.

use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::domain::DomainInspector;
use crate::error_handling::{ApiError, InitializationError};
use crate::initialization::{init_probe_client, init_resolver};
use crate::models::{CaaRecord, RedirectChain, TraceStrategy};
use crate::redirect::Tracer;

/// Shared state for the HTTP handlers.
///
/// Built once at startup; everything in it is read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<TokioAsyncResolver>,
    pub inspector: DomainInspector,
    pub tracer: Tracer,
}

impl AppState {
    /// Creates the resolver and HTTP clients used by every request.
    pub fn new(config: Config) -> Result<Self, InitializationError> {
        let resolver = init_resolver();
        let probe_client = init_probe_client()?;
        Ok(Self {
            inspector: DomainInspector::new(Arc::clone(&resolver), probe_client),
            tracer: Tracer::new(config.chrome_path.clone()),
            resolver,
            config: Arc::new(config),
        })
    }
}

/// Body of `POST /api/domain-check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCheckRequest {
    pub domain: String,
}

impl TryFrom<Value> for DomainCheckRequest {
    type Error = ApiError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let domain = string_field(&body, "domain")?
            .ok_or_else(|| ApiError::Validation("No domain provided".to_string()))?;
        Ok(Self { domain })
    }
}

/// Body of `POST /api/redirect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRequest {
    pub url: String,
    /// `ios`, `android` or `desktop`; anything else means desktop
    pub device: Option<String>,
    /// Overrides the configured default strategy
    pub strategy: Option<TraceStrategy>,
}

impl TryFrom<Value> for RedirectRequest {
    type Error = ApiError;

    /// A missing `url` is reported first; a present but malformed optional
    /// field is reported by name.
    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let url = string_field(&body, "url")?
            .ok_or_else(|| ApiError::Validation("No URL provided".to_string()))?;
        let device = string_field(&body, "device")?;
        let strategy = match body.get("strategy") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<TraceStrategy>(raw.clone())
                    .map_err(|e| ApiError::Validation(format!("Invalid strategy: {e}")))?,
            ),
        };
        Ok(Self {
            url,
            device,
            strategy,
        })
    }
}

/// Query string of the raw DNS endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DomainQuery {
    pub domain: Option<String>,
}

/// Response of `POST /api/redirect`.
///
/// The key names which strategy produced the hops: `chain` for the scripted
/// browser, `redirects` for the HTTP client.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RedirectResponse {
    Chain { chain: RedirectChain },
    Redirects { redirects: RedirectChain },
}

impl RedirectResponse {
    pub fn for_strategy(strategy: TraceStrategy, hops: RedirectChain) -> Self {
        match strategy {
            TraceStrategy::ScriptedBrowser => Self::Chain { chain: hops },
            TraceStrategy::HttpClient => Self::Redirects { redirects: hops },
        }
    }
}

/// Response of `GET /api/cname`.
#[derive(Debug, Serialize)]
pub struct CnameResponse {
    pub cname: Vec<String>,
}

/// Response of `GET /api/caa`.
#[derive(Debug, Serialize)]
pub struct CaaResponse {
    pub caa: Vec<CaaRecord>,
}

/// Response of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Returns the trimmed value, or `None` when it is missing or blank.
pub fn required_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads an optional string member of a JSON body.
///
/// Absent, `null` and blank values are `None`; any other non-string value is
/// a validation error naming the field.
fn string_field(body: &Value, field: &str) -> Result<Option<String>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(required_field(Some(value.clone()))),
        Some(other) => Err(ApiError::Validation(format!(
            "Invalid {field}: expected a string, got {other}"
        ))),
    }
}
