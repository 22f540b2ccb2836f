//! Error handling.
//!
//! This module provides:
//! - Typed errors for initialization, redirect tracing and the HTTP API
//! - The HTTP status mapping for API errors
//! - Categorization of outbound HTTP failures for logging

mod categorization;
mod types;

// Re-export public API
pub use categorization::categorize_reqwest_error;
pub use types::{ApiError, InitializationError, RequestFailureKind, TraceError};
