//! Wire types for the chat API.

use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::Mode;

/// Body of `POST /api/chat`.
///
/// Every field is optional at the serde level so that absent fields surface
/// as [`ApiError::MissingFields`] rather than as an extractor rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, mode: Mode, session_id: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            mode: Some(mode.as_str().to_string()),
            session_id: Some(session_id.into()),
        }
    }

    /// Check the request and extract its fields.
    ///
    /// Empty strings count as missing, and so does a mode other than
    /// `academic` or `clinical`. Whitespace is content and is passed through.
    pub fn validate(self) -> Result<ValidChat, ApiError> {
        let message = present(self.message).ok_or(ApiError::MissingFields)?;
        let session_id = present(self.session_id).ok_or(ApiError::MissingFields)?;
        let mode = present(self.mode)
            .and_then(|mode| mode.parse::<Mode>().ok())
            .ok_or(ApiError::MissingFields)?;

        Ok(ValidChat {
            message,
            mode,
            session_id,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A chat request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidChat {
    pub message: String,
    pub mode: Mode,
    pub session_id: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Where answers come from: `retrieval` or `demo`.
    pub source: String,
}
