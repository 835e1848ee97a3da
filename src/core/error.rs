//! Error types and handling for the Fireworks proxy.
//!
//! Every failure the proxy can report is a [`ProxyError`] variant, and every
//! variant renders to exactly one JSON envelope shape so callers can branch on
//! the `error` key without parsing prose.

use crate::api::models::ResponseEnvelope;
use crate::core::error_types::*;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use thiserror::Error;

/// Main error type for the proxy pipeline.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Any method other than POST or OPTIONS
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// POST arrived without a body
    #[error("Request body is required")]
    MissingBody,

    /// Body is present but does not decode as JSON
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Upstream credential is absent from the configuration
    #[error("API key not configured")]
    MissingApiKey,

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status} ({reason})")]
    Upstream {
        status: u16,
        reason: String,
        details: Value,
    },

    /// Upstream did not settle before the deadline
    #[error("Upstream request exceeded {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Transport or decode failure talking to the upstream
    #[error("Network error: {0}")]
    Network(String),

    /// The in-flight call was cancelled from outside
    #[error("Upstream request cancelled")]
    Cancelled,

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProxyError::MethodNotAllowed(_)
            | ProxyError::MissingBody
            | ProxyError::InvalidBody(_) => ErrorCategory::ClientProtocol,
            ProxyError::MissingApiKey => ErrorCategory::Configuration,
            ProxyError::Upstream { .. } => ErrorCategory::Upstream,
            ProxyError::Timeout { .. } => ErrorCategory::Timeout,
            ProxyError::Network(_) => ErrorCategory::Network,
            ProxyError::Cancelled => ErrorCategory::Cancelled,
            ProxyError::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::MissingBody | ProxyError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::MissingApiKey
            | ProxyError::Network(_)
            | ProxyError::Cancelled
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for this error. Never contains credential material.
    pub fn body(&self) -> Value {
        match self {
            ProxyError::MethodNotAllowed(_) => json!({ "error": ERROR_METHOD_NOT_ALLOWED }),
            ProxyError::MissingBody => json!({ "error": ERROR_BODY_REQUIRED }),
            ProxyError::InvalidBody(_) => json!({
                "error": ERROR_BAD_REQUEST,
                "message": MESSAGE_INVALID_BODY
            }),
            ProxyError::MissingApiKey => json!({ "error": ERROR_API_KEY_NOT_CONFIGURED }),
            ProxyError::Upstream {
                reason, details, ..
            } => json!({
                "error": format!("{}: {}", ERROR_API_PREFIX, reason),
                "details": details
            }),
            ProxyError::Timeout { timeout_secs } => json!({
                "error": ERROR_GATEWAY_TIMEOUT,
                "message": format!(
                    "The request to the LLM API took too long to complete (>{} seconds). \
                     Try reducing complexity or using fewer tokens.",
                    timeout_secs
                )
            }),
            ProxyError::Network(message) | ProxyError::Internal(message) => json!({
                "error": ERROR_INTERNAL,
                "message": message
            }),
            ProxyError::Cancelled => json!({
                "error": ERROR_INTERNAL,
                "message": MESSAGE_CANCELLED
            }),
        }
    }

    /// Render into the proxy's response envelope.
    pub fn into_envelope(self) -> ResponseEnvelope {
        let envelope = ResponseEnvelope::json(self.status(), &self.body());
        match self {
            ProxyError::MethodNotAllowed(_) => {
                envelope.with_header(header::ALLOW, HeaderValue::from_static("POST"))
            }
            _ => envelope,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        self.into_envelope().into_response()
    }
}

/// Convenience type alias for Results using [`ProxyError`].
pub type Result<T> = std::result::Result<T, ProxyError>;
