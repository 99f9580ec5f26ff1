//! Serve command - runs the chat API server.

use std::time::Duration;

use nelson::{
    api::{AnswerSource, AppState, ChatServer},
    constants::{CHAT_PATH, HEALTH_PATH},
    retrieval::{GatewayConfig, McpGateway},
};
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::{ServeArgs, Source};

/// Run the Nelson server until SIGINT or SIGTERM
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = match args.source {
        Source::Demo => AnswerSource::Demonstration,
        Source::Retrieval => {
            let config = GatewayConfig::new(&args.mcp_url)
                .with_timeout(Duration::from_secs(args.retrieval_timeout));
            let gateway = McpGateway::new(config)?;
            tracing::info!("Answering from knowledge service at {}", gateway.endpoint());
            AnswerSource::retrieval(gateway)
        }
    };
    let state = AppState::new(source).with_chunk_delay(Duration::from_millis(args.chunk_delay_ms));

    // Set up signal handlers before binding so an early signal is not lost
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let mut server = ChatServer::new(state);
    let local_addr = server.start(&format!("{}:{}", args.host, args.port)).await?;

    println!("Nelson server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  POST {CHAT_PATH:<10} - Ask a question, answer streamed as text/plain");
    println!("  GET  {HEALTH_PATH:<10} - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }

    server.stop().await?;
    println!("Server shut down");
    Ok(())
}
