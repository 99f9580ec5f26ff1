//! Error types for the session store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while mutating or persisting the session store.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// A message was added while no session was selected.
    #[error("No active session: select or create a session before adding messages")]
    NoActiveSession,

    /// Session id is not present in the store.
    #[error("Session not found: {id}")]
    SessionNotFound {
        /// The id that was looked up
        id: String,
    },

    /// Reading or writing the session file failed.
    #[error("Session file I/O error at {}", path.display())]
    FileIo {
        /// The file being accessed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Encoding the store as JSON failed.
    #[error("Session serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// The session file could not be decoded.
    #[error("Session file {} is invalid", path.display())]
    DeserializationFailed {
        /// The file being decoded
        path: PathBuf,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    /// Check if this error indicates a session was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::SessionNotFound { .. })
    }

    /// Check if this error means the caller broke a precondition.
    pub fn is_precondition_error(&self) -> bool {
        matches!(self, SessionError::NoActiveSession)
    }

    /// Check if this error is related to persistence.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            SessionError::FileIo { .. }
                | SessionError::SerializationFailed { .. }
                | SessionError::DeserializationFailed { .. }
        )
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
