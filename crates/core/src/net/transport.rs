//! HTTP transport seam and the reqwest-backed implementation.

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::types::{ApiResponse, NetError};

/// Low level GET transport the governor dispatches through.
///
/// Implementations take api paths (starting with `/`) relative to their
/// base url. The trait exists so tier behavior can be tested against a mock
/// that records call depth and timing.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Issues a GET for the given api path and buffers the response.
    async fn get(&self, api_path: &str) -> Result<ApiResponse, NetError>;

    /// Full url for an api path, for logging and diagnostics.
    fn full_url(&self, api_path: &str) -> String;

    /// Releases the underlying connection resources.
    async fn close(&self);

    /// Whether `close` has been called and no request has revived the
    /// transport since.
    async fn is_closed(&self) -> bool;
}

/// Transport backed by a shared `reqwest::Client`.
///
/// The client handle is swappable under a lock: `close` drops it, and a
/// request that finds the slot empty recreates the client under the write
/// lock and completes once. The double-checked recreation keeps concurrent
/// requests from racing to build multiple clients.
pub struct HttpTransport {
    base_url: String,
    verify_tls: bool,
    client: RwLock<Option<Client>>,
}

impl HttpTransport {
    /// Builds the transport and its initial client.
    ///
    /// `base_url` must carry its schema and no trailing slash is required.
    pub fn new(base_url: &str, verify_tls: bool) -> Result<Self, NetError> {
        let client = build_client(verify_tls)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            verify_tls,
            client: RwLock::new(Some(client)),
        })
    }

    /// Returns a usable client handle, recreating it if the slot was
    /// emptied by `close`.
    async fn client(&self) -> Result<Client, NetError> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(client.clone());
        }

        let mut slot = self.client.write().await;
        // Another request may have recreated it while we waited.
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        warn!("HTTP client already closed, creating a new one");
        let client = build_client(self.verify_tls)?;
        *slot = Some(client.clone());
        Ok(client)
    }
}

fn build_client(verify_tls: bool) -> Result<Client, NetError> {
    Client::builder()
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(|e| NetError::ClientBuild(e.to_string()))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, api_path: &str) -> Result<ApiResponse, NetError> {
        let url = self.full_url(api_path);
        let client = self.client().await?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?;

        Ok(ApiResponse { status, body, url })
    }

    fn full_url(&self, api_path: &str) -> String {
        format!("{}{}", self.base_url, api_path)
    }

    async fn close(&self) {
        *self.client.write().await = None;
        debug!("Closed client connection");
    }

    async fn is_closed(&self) -> bool {
        self.client.read().await.is_none()
    }
}
