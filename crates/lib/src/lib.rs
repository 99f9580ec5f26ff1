//!
//! Nelson: the session model and streamed-answer protocol behind Nelson-GPT,
//! a pediatric knowledge assistant.
//!
//! ## Core Concepts
//!
//! * **Sessions (`session::SessionStore`)**: The client-side source of truth. Holds chat sessions,
//!   their messages, the active response mode and user settings, and persists them as versioned JSON.
//! * **Modes (`Mode`)**: Academic or clinical framing. A mode decides how many passages are
//!   retrieved and how the answer is worded.
//! * **Retrieval (`retrieval::RetrievalGateway`)**: One outbound call per question to the external
//!   knowledge service. Every failure collapses into `RetrievalOutcome::Unavailable`.
//! * **Answers (`answer::assemble`)**: A pure function that turns a retrieval outcome into markdown.
//! * **Streaming (`stream::token_stream`)**: Paces a finished answer out to the client one
//!   space-delimited token at a time.
//! * **API (`api`)**: The `POST /api/chat` route tying the pieces together, served with axum.
//! * **Client (`client::ChatClient`)**: Reads the chunked answer and updates the session store
//!   incrementally as chunks arrive.

pub mod answer;
pub mod api;
pub mod client;
pub mod clock;
pub mod constants;
pub mod mode;
pub mod retrieval;
pub mod session;
pub mod stream;

pub use clock::{Clock, FixedClock, SystemClock};
pub use mode::Mode;

/// Result type used throughout the Nelson library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Nelson library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured session store errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured retrieval errors from the retrieval module
    #[error(transparent)]
    Retrieval(retrieval::RetrievalError),

    /// Structured HTTP API errors from the api module
    #[error(transparent)]
    Api(api::ApiError),

    /// Structured chat client errors from the client module
    #[error(transparent)]
    Client(client::ClientError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Session(_) => "session",
            Error::Retrieval(_) => "retrieval",
            Error::Api(_) => "api",
            Error::Client(_) => "client",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is caused by a bad request from the caller.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Api(api_err) => api_err.is_validation_error(),
            Error::Client(client_err) => client_err.is_validation_error(),
            Error::Session(session_err) => session_err.is_precondition_error(),
            _ => false,
        }
    }

    /// Check if this error is network related.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Retrieval(retrieval_err) => retrieval_err.is_network_error(),
            Error::Client(client_err) => client_err.is_network_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a timeout.
    pub fn is_timeout_error(&self) -> bool {
        match self {
            Error::Retrieval(retrieval_err) => retrieval_err.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) | Error::Serialize(_) => true,
            Error::Session(session_err) => session_err.is_io_error(),
            _ => false,
        }
    }
}
