//! HTTP gateway to the MCP knowledge service.
//!
//! Sends a single JSON POST to `{base_url}/mcp` with reqwest and decodes the
//! `{context, citations, meta}` response.

use std::time::Duration;

use async_trait::async_trait;

use super::{McpRequest, RetrievalError, RetrievalGateway, RetrievalOutcome, RetrievalResult};
use crate::{
    Mode, Result,
    constants::{DEFAULT_MCP_URL, DEFAULT_RETRIEVAL_TIMEOUT, MCP_PATH},
};

/// Connection settings for [`McpGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the knowledge service, without the `/mcp` suffix.
    pub base_url: String,
    /// Deadline for the whole call, body included.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MCP_URL.to_string(),
            timeout: DEFAULT_RETRIEVAL_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Resolve the request URL from a base URL.
///
/// Any path on the base is kept, so `http://host/kb/` becomes `http://host/kb/mcp`.
pub fn endpoint_url(base_url: &str) -> std::result::Result<String, RetrievalError> {
    let url = url::Url::parse(base_url.trim()).map_err(|e| RetrievalError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RetrievalError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(format!("{}{MCP_PATH}", url.as_str().trim_end_matches('/')))
}

/// Knowledge service client.
#[derive(Debug, Clone)]
pub struct McpGateway {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl McpGateway {
    /// Create a gateway for the service described by `config`.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let endpoint = endpoint_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            timeout: config.timeout,
        })
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> RetrievalError {
        if err.is_timeout() {
            RetrievalError::Timeout {
                endpoint: self.endpoint.clone(),
                timeout: self.timeout,
            }
        } else {
            RetrievalError::ConnectionFailed {
                endpoint: self.endpoint.clone(),
                reason: err.to_string(),
            }
        }
    }

    async fn request(
        &self,
        body: &McpRequest,
    ) -> std::result::Result<RetrievalResult, RetrievalError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&bytes).map_err(|e| RetrievalError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl RetrievalGateway for McpGateway {
    async fn fetch_context(&self, query: &str, mode: Mode, top_k: usize) -> RetrievalOutcome {
        let body = McpRequest::answer(query, top_k);
        tracing::debug!(endpoint = %self.endpoint, %mode, top_k, "querying knowledge service");

        match self.request(&body).await {
            Ok(result) => {
                tracing::debug!(
                    context = result.context.len(),
                    citations = result.citations.len(),
                    "knowledge service answered"
                );
                RetrievalOutcome::Found(result)
            }
            Err(e) => {
                tracing::warn!("Knowledge service unavailable: {e}");
                RetrievalOutcome::Unavailable(e)
            }
        }
    }
}
