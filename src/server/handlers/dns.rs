//! Raw DNS lookup handlers.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::dns::{lookup_caa_records, lookup_cname_records};
use crate::error_handling::ApiError;
use crate::server::types::{required_field, AppState, CaaResponse, CnameResponse, DomainQuery};

fn domain_param(query: Result<Query<DomainQuery>, QueryRejection>) -> Result<String, ApiError> {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    required_field(query.domain)
        .ok_or_else(|| ApiError::Validation("No domain provided".to_string()))
}

/// `GET /api/cname?domain=`
pub async fn cname_handler(
    State(state): State<AppState>,
    query: Result<Query<DomainQuery>, QueryRejection>,
) -> Result<Json<CnameResponse>, ApiError> {
    let domain = domain_param(query)?;
    let cname = lookup_cname_records(&domain, &state.resolver)
        .await
        .map_err(|e| ApiError::Lookup(e.to_string()))?;
    Ok(Json(CnameResponse { cname }))
}

/// `GET /api/caa?domain=`
///
/// Only the exact name is queried; no root-domain fallback.
pub async fn caa_handler(
    State(state): State<AppState>,
    query: Result<Query<DomainQuery>, QueryRejection>,
) -> Result<Json<CaaResponse>, ApiError> {
    let domain = domain_param(query)?;
    let caa = lookup_caa_records(&domain, &state.resolver)
        .await
        .map_err(|e| ApiError::Lookup(e.to_string()))?;
    Ok(Json(CaaResponse { caa }))
}
