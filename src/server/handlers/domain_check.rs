//! Domain inspection handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error_handling::ApiError;
use crate::models::DomainCheckResult;
use crate::server::types::{AppState, DomainCheckRequest};

/// `POST /api/domain-check`
///
/// Always 200 once a domain is given; failed checks show up as sentinel fields.
/// A body that is not JSON at all is treated as empty.
pub async fn domain_check_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DomainCheckResult>, ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or(Value::Null);
    let request = DomainCheckRequest::try_from(body)?;

    Ok(Json(state.inspector.inspect(&request.domain).await))
}
