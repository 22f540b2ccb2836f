//! DNS record queries (CNAME, CAA).
//!
//! "No records" answers (including NXDOMAIN) are returned as an empty vector;
//! only real failures such as timeouts are returned as errors.

use anyhow::{Error, Result};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::rdata::caa::{Value, CAA};
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;

use crate::models::CaaRecord;

/// Queries CNAME records for a domain.
///
/// # Returns
///
/// The canonical names without their trailing dot, in answer order.
pub async fn lookup_cname_records(
    domain: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<String>, Error> {
    match resolver.lookup(domain, RecordType::CNAME).await {
        Ok(lookup) => {
            let names: Vec<String> = lookup
                .iter()
                .filter_map(|rdata| {
                    if let RData::CNAME(cname) = rdata {
                        Some(trim_root_label(&cname.to_utf8()))
                    } else {
                        None
                    }
                })
                .collect();
            Ok(names)
        }
        Err(e) if is_no_records(&e) => Ok(Vec::new()),
        Err(e) => {
            log::warn!("Failed to lookup CNAME records for {domain}: {e}");
            Err(e.into())
        }
    }
}

/// Queries CAA records for a domain.
///
/// # Returns
///
/// One `CaaRecord` per answer, or an empty vector when the domain publishes none.
pub async fn lookup_caa_records(
    domain: &str,
    resolver: &TokioAsyncResolver,
) -> Result<Vec<CaaRecord>, Error> {
    match resolver.lookup(domain, RecordType::CAA).await {
        Ok(lookup) => {
            let records: Vec<CaaRecord> = lookup
                .iter()
                .filter_map(|rdata| {
                    if let RData::CAA(caa) = rdata {
                        Some(caa_to_record(caa))
                    } else {
                        None
                    }
                })
                .collect();
            Ok(records)
        }
        Err(e) if is_no_records(&e) => Ok(Vec::new()),
        Err(e) => {
            log::warn!("Failed to lookup CAA records for {domain}: {e}");
            Err(e.into())
        }
    }
}

/// True for "the name exists but has no such record" and NXDOMAIN answers.
fn is_no_records(error: &ResolveError) -> bool {
    matches!(error.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

fn caa_to_record(caa: &CAA) -> CaaRecord {
    CaaRecord {
        critical: caa.issuer_critical(),
        tag: caa.tag().as_str().to_string(),
        value: caa_value_to_string(caa.value()),
    }
}

/// Renders a CAA value the way it appears in zone files, e.g.
/// `letsencrypt.org; validationmethods=dns-01`.
fn caa_value_to_string(value: &Value) -> String {
    match value {
        Value::Issuer(name, key_values) => {
            let mut rendered = name
                .as_ref()
                .map(|n| trim_root_label(&n.to_utf8()))
                .unwrap_or_default();
            for kv in key_values {
                rendered.push_str(&format!("; {}={}", kv.key(), kv.value()));
            }
            rendered
        }
        Value::Url(url) => url.to_string(),
        Value::Unknown(bytes) => String::from_utf8_lossy(bytes).to_string(),
    }
}

pub(crate) fn trim_root_label(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_string()
}
