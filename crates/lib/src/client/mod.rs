//! Chat client.
//!
//! [`ChatClient`] posts a question to the chat API and writes the streamed
//! answer into a [`SessionStore`] as it arrives: the assistant message is
//! replaced with everything received so far after every chunk.

use std::time::Duration;

use crate::{
    Result,
    api::{ChatRequest, HealthResponse},
    constants::{CHAT_PATH, HEALTH_PATH},
    session::{Message, SessionError, SessionStore},
};

mod errors;

pub use errors::ClientError;

/// Assistant message shown when no answer could be obtained.
pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// HTTP client for a running chat API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, reqwest::Client::builder())
    }

    /// Like [`ChatClient::new`], with a deadline on each whole request.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::build(base_url, reqwest::Client::builder().timeout(timeout))
    }

    fn build(base_url: &str, builder: reqwest::ClientBuilder) -> Result<Self> {
        let url = url::Url::parse(base_url.trim()).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }
            .into());
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetch the server's health report.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.url(HEALTH_PATH);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| connection_failed(&url, e))?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
            }
            .into());
        }
        let health = response
            .json()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        Ok(health)
    }

    /// Send `text` in the current session and stream the answer into `store`.
    pub async fn send(&self, store: &mut SessionStore, text: &str) -> Result<String> {
        self.send_with(store, text, |_| {}).await
    }

    /// Send `text` in the current session, calling `on_chunk` with each piece
    /// of the answer as it arrives.
    ///
    /// The user message is appended first. On success the assistant message
    /// holds the full answer, which is also returned. If nothing was received
    /// the assistant message is the [`ERROR_REPLY`] bubble; if the stream broke
    /// off midway the partial answer is kept. The store's loading flag is
    /// cleared in every case.
    ///
    /// # Errors
    /// `ClientError::EmptyMessage` for blank `text` and
    /// `SessionError::NoActiveSession` when no session is selected, both
    /// before the store is touched. `ClientError` when the request or stream
    /// fails.
    pub async fn send_with<F>(
        &self,
        store: &mut SessionStore,
        text: &str,
        on_chunk: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyMessage.into());
        }
        let session_id = store
            .current_session_id()
            .ok_or(SessionError::NoActiveSession)?
            .to_string();
        let mode = store.current_mode();

        let now = store.clock().now_utc();
        let user_id = store.next_message_id();
        store.add_message(Message::user(user_id, text, now))?;
        store.set_loading(true);

        let request = ChatRequest::new(text, mode, &session_id);
        let result = self.stream_reply(store, &request, on_chunk).await;
        store.set_loading(false);

        if let Err(e) = &result {
            tracing::warn!(%session_id, "Chat request failed: {e}");
        }
        result
    }

    async fn stream_reply<F>(
        &self,
        store: &mut SessionStore,
        request: &ChatRequest,
        mut on_chunk: F,
    ) -> Result<String>
    where
        F: FnMut(&str),
    {
        let assistant_id = store.next_message_id();
        let url = self.url(CHAT_PATH);

        let mut response = match self.http.post(&url).json(request).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                let status = response.status().as_u16();
                add_error_reply(store, &assistant_id)?;
                return Err(ClientError::Status { status }.into());
            }
            Err(e) => {
                add_error_reply(store, &assistant_id)?;
                return Err(connection_failed(&url, e).into());
            }
        };

        let mut decoder = Utf8Decoder::default();
        let mut content = String::new();
        let mut received = 0;
        let now = store.clock().now_utc();
        store.add_message(Message::assistant(&assistant_id, "", now))?;

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    received += chunk.len();
                    let piece = decoder.push(&chunk);
                    if piece.is_empty() {
                        continue;
                    }
                    on_chunk(&piece);
                    content.push_str(&piece);
                    let now = store.clock().now_utc();
                    store.add_message(Message::assistant(&assistant_id, &content, now))?;
                }
                Ok(None) => break,
                Err(e) => {
                    if received == 0 {
                        add_error_reply(store, &assistant_id)?;
                    }
                    return Err(ClientError::StreamInterrupted {
                        received,
                        reason: e.to_string(),
                    }
                    .into());
                }
            }
        }

        if decoder.has_pending() {
            on_chunk(REPLACEMENT);
            content.push_str(REPLACEMENT);
            let now = store.clock().now_utc();
            store.add_message(Message::assistant(&assistant_id, &content, now))?;
        }
        Ok(content)
    }
}

fn add_error_reply(store: &mut SessionStore, id: &str) -> Result<()> {
    let now = store.clock().now_utc();
    store.add_message(Message::assistant(id, ERROR_REPLY, now))
}

fn connection_failed(url: &str, err: reqwest::Error) -> ClientError {
    ClientError::ConnectionFailed {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

const REPLACEMENT: &str = "\u{FFFD}";

/// Incremental UTF-8 decoding of a byte stream.
///
/// A character split across chunks is held back until the rest of it
/// arrives. Invalid bytes become U+FFFD and are never revisited, so every
/// piece returned by [`Utf8Decoder::push`] is final.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Feed `bytes` and return the text they complete.
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut text = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.pending.clear();
                    return text;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));
                    match e.error_len() {
                        Some(invalid) => {
                            text.push_str(REPLACEMENT);
                            self.pending.drain(..valid_up_to + invalid);
                        }
                        // Incomplete character at the end; wait for more.
                        None => {
                            self.pending.drain(..valid_up_to);
                            return text;
                        }
                    }
                }
            }
        }
    }

    /// Whether a truncated character is still waiting for its last bytes.
    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
