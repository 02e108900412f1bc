//! Error types for Photon
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// No session cookie, or no live entry in the session store (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// A token was obtained but the provider returned no usable identity (401)
    #[error("Unauthorized")]
    IdentityUnresolved,

    /// Validation error (400)
    #[error("{0}")]
    Validation(String),

    /// Provider call returned a non-success status or a malformed body (500)
    #[error("{0}")]
    Upstream(String),

    /// Session store operation failed (500)
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// HTTP client error on an outbound provider call (500)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body. The response is always a returned value,
    /// so no failure path can leave the client without an answer.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), "unauthorized"),
            AppError::IdentityUnresolved => (
                StatusCode::UNAUTHORIZED,
                self.to_string(),
                "identity_unresolved",
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "upstream"),
            AppError::SessionStore(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "session_store",
            ),
            AppError::HttpClient(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                "http_client",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %self, "Request failed");
        }

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
