//! Error types for the chat API.
//!
//! Request errors render as `{"error": "..."}` JSON bodies. The client-facing
//! message is fixed per status code; details only go to the log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors raised while serving the chat API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// A required field was absent or empty, or the mode is unknown.
    #[error("Missing required fields")]
    MissingFields,

    /// Something failed before streaming started, including a body that is
    /// not valid JSON.
    #[error("Internal server error: {reason}")]
    Internal { reason: String },

    /// `start` was called on a server that is already listening.
    #[error("Server already running on {address}")]
    ServerAlreadyRunning { address: String },

    /// `stop` or `local_addr` was called on a server that is not listening.
    #[error("Server not running")]
    ServerNotRunning,

    /// The listen address could not be parsed or bound.
    #[error("Failed to bind server to {address}: {reason}")]
    ServerBind { address: String, reason: String },
}

impl ApiError {
    /// Check if this error is the caller's fault.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ApiError::MissingFields)
    }

    /// Check if this error concerns the server lifecycle rather than a request.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::ServerAlreadyRunning { .. }
                | ApiError::ServerNotRunning
                | ApiError::ServerBind { .. }
        )
    }

    /// HTTP status used when this error reaches a client.
    pub fn status_code(&self) -> StatusCode {
        if self.is_validation_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::BAD_REQUEST {
            "Missing required fields"
        } else {
            tracing::error!("Chat API error: {self}");
            "Internal server error"
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ApiError> for crate::Error {
    fn from(err: ApiError) -> Self {
        crate::Error::Api(err)
    }
}
