//! Lifecycle wrapper around the axum server.

use std::net::SocketAddr;

use tokio::{sync::oneshot, task::JoinHandle};

use super::{ApiError, AppState, router};
use crate::Result;

/// A chat API server that can be started and stopped in-process.
///
/// Binding to port 0 picks a free port; [`ChatServer::local_addr`] reports
/// the one actually bound.
#[derive(Debug)]
pub struct ChatServer {
    state: AppState,
    /// Shutdown signal for the serve loop.
    shutdown: Option<oneshot::Sender<()>>,
    /// The bound address while running.
    address: Option<SocketAddr>,
    task: Option<JoinHandle<()>>,
}

impl ChatServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            shutdown: None,
            address: None,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.address.is_some()
    }

    /// Get the bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.address.ok_or_else(|| ApiError::ServerNotRunning.into())
    }

    /// Bind `addr` (`host:port`) and start serving in a background task.
    pub async fn start(&mut self, addr: &str) -> Result<SocketAddr> {
        if let Some(running) = self.address {
            return Err(ApiError::ServerAlreadyRunning {
                address: running.to_string(),
            }
            .into());
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::ServerBind {
                address: addr.to_string(),
                reason: e.to_string(),
            })?;
        // Important for port 0
        let actual_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(self.state.clone());
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("Chat server failed: {e}");
            }
        });

        tracing::info!(
            address = %actual_addr,
            source = self.state.source().as_str(),
            "chat server started"
        );
        self.address = Some(actual_addr);
        self.shutdown = Some(shutdown_tx);
        self.task = Some(task);
        Ok(actual_addr)
    }

    /// Signal shutdown and wait for in-flight connections to finish.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(address) = self.address.take() else {
            return Err(ApiError::ServerNotRunning.into());
        };
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!("Chat server task ended abnormally: {e}");
        }
        tracing::info!(%address, "chat server stopped");
        Ok(())
    }
}

impl Drop for ChatServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
