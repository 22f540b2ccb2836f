//! Domain link-setup inspection.
//!
//! Runs four independent checks for a domain and folds them into a
//! `DomainCheckResult`:
//! - CNAME target and which link flow it routes to
//! - CAA records (falling back to the registrable root) and whether they
//!   allow the trusted issuer
//! - TLS certificate expiry on port 443
//! - Click-handler probe on `https://{domain}/onelink`
//!
//! Every check carries its own timeout and reports failure as a sentinel
//! value, so one failing check never hides the others.

use std::future::Future;
use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use log::{debug, info};

use crate::config::{
    BRANDED_FLOW_MARKER, CLICK_HANDLER_OK_BODY, CLICK_HANDLER_PATH, ESP_FLOW_MARKER,
    PROVIDER_ROOT_MARKER, TRUSTED_CAA_ISSUER,
};
use crate::dns::{lookup_caa_records, lookup_cname_records};
use crate::error_handling::categorize_reqwest_error;
use crate::models::{CaaOutcome, CaaRecord, ClickHandlerStatus, CnameFlow, DomainCheckResult};
use crate::tls::check_certificate_validity;

/// Sentinel stored in `caa` when the CAA lookup fails.
pub const CAA_ERROR_SENTINEL: &str = "Error checking CAA";

/// Outcome of the CNAME check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnameCheck {
    pub cname: Option<String>,
    pub cname_valid: bool,
    pub cname_flow: CnameFlow,
}

/// Outcome of the CAA check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaaCheck {
    pub caa: CaaOutcome,
    pub caa_valid: Option<bool>,
}

/// Shared, read-only resources used by every domain check.
#[derive(Clone)]
pub struct DomainInspector {
    resolver: Arc<TokioAsyncResolver>,
    probe_client: Arc<reqwest::Client>,
}

impl DomainInspector {
    pub fn new(resolver: Arc<TokioAsyncResolver>, probe_client: Arc<reqwest::Client>) -> Self {
        Self {
            resolver,
            probe_client,
        }
    }

    /// Runs all four checks concurrently and returns once every one has settled.
    pub async fn inspect(&self, domain: &str) -> DomainCheckResult {
        let probe_url = click_handler_url(domain);
        let (cname, caa, cert_valid, click_handler) = tokio::join!(
            check_cname(domain, &self.resolver),
            check_caa(domain, &self.resolver),
            check_certificate_validity(domain),
            probe_click_handler(&self.probe_client, &probe_url),
        );

        info!(
            "Domain check for {domain}: cname_flow={}, caa_valid={:?}, cert_valid={cert_valid}, click_handler={click_handler}",
            cname.cname_flow, caa.caa_valid
        );

        let mut result = DomainCheckResult::new(domain);
        result.cname = cname.cname;
        result.cname_valid = cname.cname_valid;
        result.cname_flow = cname.cname_flow;
        result.caa = Some(caa.caa);
        result.caa_valid = caa.caa_valid;
        result.cert_valid = Some(cert_valid);
        result.click_handler = Some(click_handler);
        result
    }
}

/// Resolves the domain's CNAME and classifies it.
///
/// The first answer is used. A failed lookup leaves the flow as `Unknown`.
pub async fn check_cname(domain: &str, resolver: &TokioAsyncResolver) -> CnameCheck {
    match lookup_cname_records(domain, resolver).await {
        Ok(names) => classify_cname(names.into_iter().next()),
        Err(e) => {
            debug!("CNAME check for {domain} failed: {e}");
            CnameCheck {
                cname: None,
                cname_valid: false,
                cname_flow: CnameFlow::Unknown,
            }
        }
    }
}

/// Classifies a CNAME target by the provider markers it contains.
pub fn classify_cname(cname: Option<String>) -> CnameCheck {
    let Some(cname) = cname else {
        return CnameCheck {
            cname: None,
            cname_valid: false,
            cname_flow: CnameFlow::NoCnameFound,
        };
    };

    let cname_flow = if cname.contains(BRANDED_FLOW_MARKER) {
        CnameFlow::BrandedDomainFlow
    } else if cname.contains(ESP_FLOW_MARKER) {
        CnameFlow::EspFlow
    } else {
        CnameFlow::NotRecognized
    };

    CnameCheck {
        cname_valid: cname.contains(PROVIDER_ROOT_MARKER),
        cname: Some(cname),
        cname_flow,
    }
}

/// Looks up CAA records, retrying against the registrable root when the
/// exact name has none.
pub async fn check_caa(domain: &str, resolver: &TokioAsyncResolver) -> CaaCheck {
    check_caa_with(domain, |target| async move {
        lookup_caa_records(&target, resolver).await
    })
    .await
}

/// The CAA fallback walk over `caa_lookup_targets`, calling `lookup` once per
/// name.
///
/// The first non-empty answer wins. Any lookup error ends the walk with the
/// error sentinel and an unknown validity.
pub async fn check_caa_with<F, Fut>(domain: &str, lookup: F) -> CaaCheck
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<CaaRecord>>>,
{
    let mut records = Vec::new();
    for target in caa_lookup_targets(domain) {
        match lookup(target.clone()).await {
            Ok(found) if !found.is_empty() => {
                records = found;
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                debug!("CAA check for {target} failed: {e}");
                return CaaCheck {
                    caa: CaaOutcome::Error(CAA_ERROR_SENTINEL.to_string()),
                    caa_valid: None,
                };
            }
        }
    }

    CaaCheck {
        caa_valid: Some(caa_is_valid(&records)),
        caa: CaaOutcome::Records(records),
    }
}

/// Names queried for CAA, in order: the domain itself, then its last two
/// labels when it has more than two.
pub fn caa_lookup_targets(domain: &str) -> Vec<String> {
    let mut targets = vec![domain.to_string()];
    if let Some(root) = root_domain(domain) {
        if root != domain {
            targets.push(root);
        }
    }
    targets
}

/// The last two labels of a name with more than two labels.
///
/// `go.brand.example.com` → `example.com`; `example.com` → `None`.
pub fn root_domain(domain: &str) -> Option<String> {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() > 2 {
        Some(labels[labels.len() - 2..].join("."))
    } else {
        None
    }
}

/// An empty CAA set allows any issuer; a non-empty one must mention the
/// trusted issuer somewhere in its serialized form.
pub fn caa_is_valid(records: &[CaaRecord]) -> bool {
    if records.is_empty() {
        return true;
    }
    serde_json::to_string(records)
        .map(|serialized| serialized.contains(TRUSTED_CAA_ISSUER))
        .unwrap_or(false)
}

pub fn click_handler_url(domain: &str) -> String {
    format!("https://{domain}{CLICK_HANDLER_PATH}")
}

/// Requests the click-handler URL and classifies the answer.
///
/// Network errors, timeouts and non-2xx statuses count as unreachable.
pub async fn probe_click_handler(client: &reqwest::Client, url: &str) -> ClickHandlerStatus {
    let response = match client.get(url).send().await.and_then(|r| r.error_for_status()) {
        Ok(response) => response,
        Err(e) => {
            debug!(
                "Click handler probe {url} failed ({}): {e}",
                categorize_reqwest_error(&e)
            );
            return ClickHandlerStatus::Unreachable;
        }
    };

    match response.text().await {
        Ok(body) => classify_click_handler_body(&body),
        Err(e) => {
            debug!("Click handler probe {url} body read failed: {e}");
            ClickHandlerStatus::Unreachable
        }
    }
}

/// A healthy handler answers `ok`; surrounding whitespace and case are ignored.
pub fn classify_click_handler_body(body: &str) -> ClickHandlerStatus {
    if body.trim().eq_ignore_ascii_case(CLICK_HANDLER_OK_BODY) {
        ClickHandlerStatus::RespondedOk
    } else {
        ClickHandlerStatus::RespondedNotOk
    }
}
