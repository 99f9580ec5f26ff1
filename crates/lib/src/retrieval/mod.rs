//! Retrieval gateway to the external knowledge service.
//!
//! The gateway makes at most one attempt per question. Whatever goes wrong
//! (connection failure, timeout, non-2xx status, malformed body) is reported
//! as [`RetrievalOutcome::Unavailable`] rather than an error, and callers
//! treat that as a normal terminal state.

use async_trait::async_trait;

use crate::Mode;

mod errors;
pub mod mcp;
mod types;

pub use errors::RetrievalError;
pub use mcp::{GatewayConfig, McpGateway};
pub use types::{Citation, McpRequest, RetrievalContextItem, RetrievalResult};

/// Result of one knowledge service call.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// The service answered. `context` may still be empty.
    Found(RetrievalResult),
    /// The service could not be used for this question.
    Unavailable(RetrievalError),
}

impl RetrievalOutcome {
    /// Context items, empty when unavailable.
    pub fn context(&self) -> &[RetrievalContextItem] {
        match self {
            RetrievalOutcome::Found(result) => &result.context,
            RetrievalOutcome::Unavailable(_) => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, RetrievalOutcome::Unavailable(_))
    }
}

/// Source of context passages for a question.
#[async_trait]
pub trait RetrievalGateway: Send + Sync {
    /// Fetch up to `top_k` passages for `query`.
    ///
    /// Never fails: problems are returned as [`RetrievalOutcome::Unavailable`].
    async fn fetch_context(&self, query: &str, mode: Mode, top_k: usize) -> RetrievalOutcome;
}
