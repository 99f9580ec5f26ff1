//! Error types for the retrieval module.

use std::time::Duration;

use thiserror::Error;

/// Reasons a knowledge service call produced no usable result.
///
/// Inside the gateway these are folded into `RetrievalOutcome::Unavailable`;
/// they only surface as errors when building a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RetrievalError {
    /// The configured base URL is not a valid absolute URL.
    #[error("Invalid knowledge service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The request never reached the service.
    #[error("Failed to connect to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The service did not answer before the deadline.
    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    /// The service answered with a non-success status.
    #[error("Knowledge service returned HTTP {status}")]
    Status { status: u16 },

    /// The body was not the expected JSON shape.
    #[error("Malformed knowledge service response: {0}")]
    MalformedResponse(String),
}

impl RetrievalError {
    /// Check if this is a network/connection error.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            RetrievalError::ConnectionFailed { .. } | RetrievalError::Timeout { .. }
        )
    }

    /// Check if this error indicates a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetrievalError::Timeout { .. })
    }

    /// Check if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RetrievalError::InvalidBaseUrl { .. } | RetrievalError::ClientBuild(_)
        )
    }
}

impl From<RetrievalError> for crate::Error {
    fn from(err: RetrievalError) -> Self {
        crate::Error::Retrieval(err)
    }
}
