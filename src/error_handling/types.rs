//! Error type definitions.
//!
//! This module defines the typed errors surfaced by the service and how the
//! API errors map onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::{Display, EnumIter as EnumIterMacro};
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error binding the listening socket.
    #[error("Failed to bind {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to produce a redirect chain.
///
/// Navigation problems inside the scripted browser are not errors (the partial
/// chain is returned); only launching the browser can fail that strategy.
#[derive(Error, Debug)]
pub enum TraceError {
    /// The start URL is not an absolute http(s) URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client strategy failed (connect, TLS, timeout, too many redirects).
    #[error("{0}")]
    Request(#[from] ReqwestError),

    /// The headless browser could not be started.
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),
}

/// Errors returned by the HTTP API, each carrying its status code.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required field is missing or malformed (400).
    #[error("{0}")]
    Validation(String),

    /// Redirect tracing failed (500).
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// A raw DNS lookup endpoint failed (500).
    #[error("{0}")]
    Lookup(String),

    /// A background task failed unexpectedly (500).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Trace(_) | ApiError::Lookup(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::warn!("Request failed: {self}");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Coarse classification of an outbound HTTP failure, used in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RequestFailureKind {
    Builder,
    Redirect,
    Status,
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Other,
}
