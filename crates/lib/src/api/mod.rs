//! The chat HTTP API.
//!
//! A chat request moves through `received → validated → retrieving →
//! assembling → streaming`. Validation failures stop it with a 400; anything
//! after validation either streams an answer or, for faults before the first
//! byte, returns a 500. Retrieval failures never reach the client as errors,
//! they become a fallback answer.
//!
//! Handlers share nothing mutable: [`AppState`] is cloned into each request.

use std::{any::Any, fmt, io, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use futures::Stream;
use tower_http::catch_panic::CatchPanicLayer;

use crate::{
    Mode,
    answer::{assemble, demonstration_answer},
    constants::{CHAT_PATH, DEFAULT_CHUNK_DELAY, HEALTH_PATH},
    retrieval::RetrievalGateway,
    stream::token_stream,
};

mod errors;
mod protocol;
mod server;

pub use errors::ApiError;
pub use protocol::{ChatRequest, HealthResponse, ValidChat};
pub use server::ChatServer;

/// Content type of streamed answers.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Where answers come from.
#[derive(Clone)]
pub enum AnswerSource {
    /// A fixed explanatory answer; no knowledge service is contacted.
    Demonstration,
    /// Answers assembled from the knowledge service's passages.
    Retrieval(Arc<dyn RetrievalGateway>),
}

impl AnswerSource {
    pub fn retrieval(gateway: impl RetrievalGateway + 'static) -> Self {
        AnswerSource::Retrieval(Arc::new(gateway))
    }

    /// Short name reported by the health endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerSource::Demonstration => "demo",
            AnswerSource::Retrieval(_) => "retrieval",
        }
    }

    /// Produce the full answer text for one question.
    pub async fn answer(&self, query: &str, mode: Mode) -> String {
        match self {
            AnswerSource::Demonstration => demonstration_answer(mode),
            AnswerSource::Retrieval(gateway) => {
                let outcome = gateway.fetch_context(query, mode, mode.top_k()).await;
                tracing::debug!(
                    unavailable = outcome.is_unavailable(),
                    passages = outcome.context().len(),
                    "assembling answer"
                );
                assemble(mode, query, &outcome)
            }
        }
    }
}

impl fmt::Debug for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    source: AnswerSource,
    chunk_delay: Duration,
}

impl AppState {
    pub fn new(source: AnswerSource) -> Self {
        Self {
            source,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }

    /// Pause between streamed chunks.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub fn source(&self) -> &AnswerSource {
        &self.source
    }

    pub fn chunk_delay(&self) -> Duration {
        self.chunk_delay
    }
}

/// Build the axum router serving the chat and health endpoints.
///
/// A handler that panics before its response is produced answers with the
/// generic `500` body instead of dropping the connection.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(CHAT_PATH, post(handle_chat))
        .route(HEALTH_PATH, get(handle_health))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal { reason }.into_response()
}

/// Handler for `POST /api/chat`.
async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(reject_body)?;
    let chat = request.validate()?;
    tracing::info!(session_id = %chat.session_id, mode = %chat.mode, "chat request");

    let answer = state.source.answer(&chat.message, chat.mode).await;
    chunked_text_response(token_stream(&answer, state.chunk_delay))
}

/// A body that is not JSON at all is an internal fault; a JSON body of the
/// wrong shape is missing its fields.
fn reject_body(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonSyntaxError(_) | JsonRejection::BytesRejection(_) => {
            ApiError::Internal {
                reason: rejection.body_text(),
            }
        }
        _ => {
            tracing::debug!("Rejected chat body: {rejection}");
            ApiError::MissingFields
        }
    }
}

/// Handler for `GET /health`.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: state.source.as_str().to_string(),
    })
}

/// Wrap a chunk stream in a `200` chunked `text/plain` response.
///
/// An `Err` item from `chunks` aborts the body mid-transfer, so the client
/// sees an incomplete response instead of a clean end.
pub fn chunked_text_response<S>(chunks: S) -> Result<Response, ApiError>
where
    S: Stream<Item = io::Result<Bytes>> + Send + 'static,
{
    Response::builder()
        .header(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)
        .body(Body::from_stream(chunks))
        .map_err(|e| ApiError::Internal {
            reason: e.to_string(),
        })
}
