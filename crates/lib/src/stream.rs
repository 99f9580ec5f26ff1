//! Streaming transport for finished answers.
//!
//! The answer is fully computed before the first byte is sent; streaming only
//! paces it out. The text is cut at single spaces (line breaks stay inside
//! tokens so markdown structure survives), each token gets one trailing space
//! back, and tokens are emitted one per chunk with a fixed pause between them.
//!
//! Dropping the stream, which is what the HTTP server does when the client
//! goes away, stops it between two chunks without raising anything.

use std::{io, time::Duration};

use bytes::Bytes;
use futures::{Stream, StreamExt, stream};

/// Split `text` into chunks of one token plus a trailing space.
///
/// Empty text yields no chunks. Concatenating the chunks gives back `text`
/// with one extra trailing space.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(' ').map(|token| format!("{token} ")).collect()
}

/// Stream `text` token by token, pausing `delay` between chunks.
///
/// The first chunk is sent immediately. This stream never yields an error
/// itself; the `io::Result` item type matches what an HTTP body expects so it
/// can be combined with fallible sources.
pub fn token_stream(
    text: &str,
    delay: Duration,
) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
    let tokens = tokenize(text);
    tracing::trace!(chunks = tokens.len(), ?delay, "streaming answer");

    stream::iter(tokens.into_iter().enumerate()).then(move |(index, token)| async move {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(Bytes::from(token))
    })
}
