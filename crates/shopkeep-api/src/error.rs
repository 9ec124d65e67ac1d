//! Shopkeep: API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use shopkeep_core::error::DomainError;
use thiserror::Error;
use tracing::error;

/// Message shown to kiosk users when a dependency is down. The details go
/// to the log instead.
pub const UPSTREAM_UNAVAILABLE_MESSAGE: &str =
    "The village elder is away from the counter. Please try again shortly.";

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// The trace exporter could not be set up.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Always `"error"`.
    pub status: &'static str,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            DomainError::ProfileNotFound(_) => (StatusCode::NOT_FOUND, "profile_not_found"),
            DomainError::ConcurrencyConflict { .. } => {
                (StatusCode::CONFLICT, "concurrency_conflict")
            }
            DomainError::UpstreamUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable")
            }
            DomainError::MalformedUpstreamOutput(_) => {
                (StatusCode::BAD_GATEWAY, "malformed_upstream_output")
            }
            DomainError::ResourceMissing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "resource_missing")
            }
        };

        let message = if status.is_server_error() {
            error!(error = %self.0, "request failed");
            UPSTREAM_UNAVAILABLE_MESSAGE.to_owned()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            error: error_code,
            message,
            status: "error",
        };

        (status, Json(body)).into_response()
    }
}
