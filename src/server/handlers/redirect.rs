//! Redirect tracing handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error_handling::ApiError;
use crate::models::{DeviceProfile, TraceConfiguration};
use crate::server::types::{AppState, RedirectRequest, RedirectResponse};

/// `POST /api/redirect`
///
/// Scripted-browser traces answer 200 even when navigation fails; http-client
/// traces answer 500 with the stringified cause.
pub async fn redirect_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RedirectResponse>, ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or(Value::Null);
    let request = RedirectRequest::try_from(body)?;

    let strategy = request.strategy.unwrap_or(state.config.redirect_strategy);
    let device = request
        .device
        .as_deref()
        .map(DeviceProfile::from_name)
        .unwrap_or_default();
    let trace_config =
        TraceConfiguration::from_config(&state.config, request.url, strategy, device);

    // Run detached so a dropped client connection cannot skip browser teardown
    let tracer = state.tracer.clone();
    let hops = tokio::spawn(async move { tracer.trace(&trace_config).await })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(RedirectResponse::for_strategy(strategy, hops)))
}
