//! Error types for the chat client.

use thiserror::Error;

/// Errors raised while talking to the chat API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The message to send has no visible content.
    #[error("Message is empty")]
    EmptyMessage,

    /// The server URL could not be parsed or is not http(s).
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// No response was received.
    #[error("Failed to reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Server returned HTTP {status}")]
    Status { status: u16 },

    /// The answer stream broke off after `received` bytes.
    #[error("Answer stream interrupted after {received} bytes: {reason}")]
    StreamInterrupted { received: usize, reason: String },

    /// A JSON response did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Check if this error comes from the network rather than the server's answer.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionFailed { .. } | ClientError::StreamInterrupted { .. }
        )
    }

    /// Check if this error was raised before anything was sent.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ClientError::EmptyMessage)
    }

    /// Check if some of the answer arrived before the failure.
    pub fn is_partial(&self) -> bool {
        matches!(self, ClientError::StreamInterrupted { received, .. } if *received > 0)
    }
}

impl From<ClientError> for crate::Error {
    fn from(err: ClientError) -> Self {
        crate::Error::Client(err)
    }
}
