use std::{
    io,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use nelson::{
    Mode,
    api::{AnswerSource, AppState, ChatServer, chunked_text_response},
    retrieval::{GatewayConfig, McpGateway, RetrievalGateway, RetrievalOutcome},
    stream::token_stream,
};
use serde_json::{Value, json};

/// Start a chat server on a free port with no pause between chunks.
pub async fn start_chat_server(source: AnswerSource) -> (ChatServer, String) {
    let state = AppState::new(source).with_chunk_delay(Duration::ZERO);
    let mut server = ChatServer::new(state);
    let addr = server.start("127.0.0.1:0").await.unwrap();
    (server, format!("http://{addr}"))
}

/// Start a chat server that answers from the knowledge service at `mcp_url`.
pub async fn start_retrieval_chat_server(mcp_url: &str) -> (ChatServer, String) {
    let gateway = McpGateway::new(GatewayConfig::new(mcp_url)).unwrap();
    start_chat_server(AnswerSource::retrieval(gateway)).await
}

/// A gateway that panics on every question.
pub struct PanickingGateway;

#[async_trait]
impl RetrievalGateway for PanickingGateway {
    async fn fetch_context(&self, _query: &str, _mode: Mode, _top_k: usize) -> RetrievalOutcome {
        panic!("gateway exploded");
    }
}

/// A canned reply from the stub knowledge service.
#[derive(Clone)]
pub struct StubReply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl StubReply {
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: json!({"error": "unavailable"}).to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct StubState {
    reply: StubReply,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// A stub knowledge service recording every request it receives.
pub struct StubService {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl StubService {
    pub async fn start(reply: StubReply) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            reply,
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/mcp", post(handle_mcp))
            .with_state(state);
        let addr = serve(app).await;

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle_mcp(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.requests.lock().unwrap().push(body);
    if !state.reply.delay.is_zero() {
        tokio::time::sleep(state.reply.delay).await;
    }
    (
        state.reply.status,
        [("content-type", "application/json")],
        state.reply.body.clone(),
    )
        .into_response()
}

/// A server whose `/api/chat` sends `chunks` and then fails the body.
pub async fn start_broken_chat_server(chunks: &[&str]) -> String {
    let chunks: Vec<String> = chunks.iter().map(|c| c.to_string()).collect();
    let app = Router::new().route(
        "/api/chat",
        post(move || {
            let chunks = chunks.clone();
            async move {
                let sent = stream::iter(chunks).map(|c| Ok::<_, io::Error>(Bytes::from(c)));
                // Pause so the chunks are flushed before the failure.
                let failure = stream::once(async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Err(io::Error::other("generator failed"))
                });
                chunked_text_response(sent.chain(failure))
            }
        }),
    );
    let addr = serve(app).await;
    format!("http://{addr}")
}

/// A server whose `/api/chat` sends `chunks` verbatim, pausing between them,
/// and then ends the body cleanly.
pub async fn start_raw_chat_server(chunks: Vec<Vec<u8>>) -> String {
    let app = Router::new().route(
        "/api/chat",
        post(move || {
            let chunks = chunks.clone();
            async move {
                let body = stream::iter(chunks.into_iter().enumerate()).then(|(i, c)| async move {
                    if i > 0 {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                    }
                    Ok::<_, io::Error>(Bytes::from(c))
                });
                chunked_text_response(body)
            }
        }),
    );
    let addr = serve(app).await;
    format!("http://{addr}")
}

/// A server whose `/api/chat` streams `text` with `delay` between chunks,
/// counting every chunk it produces.
pub async fn start_counting_chat_server(text: &str, delay: Duration) -> (String, Arc<AtomicUsize>) {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = produced.clone();
    let text = text.to_string();
    let app = Router::new().route(
        "/api/chat",
        post(move || {
            let counter = counter.clone();
            let text = text.clone();
            async move {
                chunked_text_response(token_stream(&text, delay).inspect(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }))
            }
        }),
    );
    let addr = serve(app).await;
    (format!("http://{addr}"), produced)
}

/// An address nothing is listening on.
pub async fn unused_address() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Serve `app` on a free port for the rest of the test.
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A knowledge service reply with `passages` context items and one citation each.
pub fn passages(count: u32) -> Value {
    let context: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "id": format!("ctx-{i}"),
                "chapterTitle": format!("Chapter {i}"),
                "pageNumber": 100 + i,
                "bookTitle": "Nelson Textbook of Pediatrics",
                "snippet": format!("Passage {i} text."),
            })
        })
        .collect();
    let citations: Vec<Value> = (1..=count)
        .map(|i| json!({"chapterTitle": format!("Chapter {i}"), "pageNumber": 100 + i}))
        .collect();
    json!({"context": context, "citations": citations, "meta": {"took_ms": 4}})
}
