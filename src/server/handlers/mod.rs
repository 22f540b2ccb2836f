//! HTTP handlers.

mod dns;
mod domain_check;
mod redirect;

use axum::Json;

use super::types::HealthResponse;

pub use dns::{caa_handler, cname_handler};
pub use domain_check::domain_check_handler;
pub use redirect::redirect_handler;

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
