//! HTTP JSON API.
//!
//! Endpoints:
//! - `POST /api/domain-check` - DNS/TLS/click-handler inspection of a domain
//! - `POST /api/redirect` - redirect chain of a URL
//! - `GET /api/cname`, `GET /api/caa` - raw record lookups
//! - `GET /health` - liveness
//!
//! Every other path is served from the static directory.

mod handlers;
mod shutdown;
mod types;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::error_handling::InitializationError;

use handlers::{
    caa_handler, cname_handler, domain_check_handler, health_handler, redirect_handler,
};
pub use shutdown::shutdown_signal;
pub use types::{
    AppState, CaaResponse, CnameResponse, DomainCheckRequest, DomainQuery, HealthResponse,
    RedirectRequest, RedirectResponse,
};

/// Builds the router with CORS and the static-file fallback applied.
pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/api/domain-check", post(domain_check_handler))
        .route("/api/redirect", post(redirect_handler))
        .route("/api/cname", get(cname_handler))
        .route("/api/caa", get(caa_handler))
        .route("/health", get(health_handler))
        .fallback_service(static_dir)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured address and serves until a shutdown signal arrives.
pub async fn start_server(config: Config) -> Result<(), anyhow::Error> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| InitializationError::BindError {
            address: address.clone(),
            source,
        })?;

    log::info!("Server listening on http://{address}/");
    log::info!("  - Domain check: POST http://{address}/api/domain-check");
    log::info!("  - Redirect trace: POST http://{address}/api/redirect");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    log::info!("Server stopped");
    Ok(())
}
