//! Error types for moodtune-gen
//!
//! - [`GenerationError`]: audio stage and artifact store failures
//! - [`PipelineError`]: what the orchestrator reports to callers
//! - [`ApiError`]: HTTP mapping of the above

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure inside one generation stage
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Request never produced an HTTP response (connect, timeout, TLS)
    #[error("Network error calling {service}: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    /// Service answered with a non-success status
    #[error("{service} API error {status}: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Success status but the payload shape was wrong
    #[error("Malformed {service} response: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },

    /// Artifact store failure while persisting audio
    #[error("Storage error: {0}")]
    Store(#[from] moodtune_common::Error),
}

/// Result type for generation stages
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Orchestrator-level error reported to the caller
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Empty mood or credential; no upstream call was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Any stage failure, carrying the underlying message
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl From<GenerationError> for PipelineError {
    fn from(err: GenerationError) -> Self {
        PipelineError::GenerationFailed(err.to_string())
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// moodtune-common error
    #[error("Common error: {0}")]
    Common(#[from] moodtune_common::Error),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(msg) => ApiError::BadRequest(msg),
            PipelineError::GenerationFailed(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
            ApiError::Common(moodtune_common::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(moodtune_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
