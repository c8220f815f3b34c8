//! Mock transport for testing.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;

use crate::net::{ApiResponse, NetError, Transport};

/// Canned response for a route.
#[derive(Debug, Clone)]
struct Route {
    status: StatusCode,
    body: Bytes,
}

/// Mock implementation of the [`Transport`] trait.
///
/// Provides controllable behavior for testing:
/// - Canned responses per api path (unknown paths get 404)
/// - A configurable per-request delay
/// - Recorded request paths for assertions
/// - An in-flight depth counter with a high-water mark, for verifying the
///   governor's concurrency bound
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<RwLock<HashMap<String, Route>>>,
    requests: Arc<RwLock<Vec<String>>>,
    delay: Arc<RwLock<Duration>>,
    fail_paths: Arc<RwLock<HashMap<String, String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a 200 response with the given body.
    pub async fn respond_ok(&self, api_path: &str, body: impl Into<Bytes>) {
        self.respond(api_path, StatusCode::OK, body).await;
    }

    /// Registers a response with an explicit status.
    pub async fn respond(&self, api_path: &str, status: StatusCode, body: impl Into<Bytes>) {
        self.routes.write().await.insert(
            api_path.to_string(),
            Route {
                status,
                body: body.into(),
            },
        );
    }

    /// Makes requests for the given path fail with a connection error.
    pub async fn fail_with(&self, api_path: &str, message: &str) {
        self.fail_paths
            .write()
            .await
            .insert(api_path.to_string(), message.to_string());
    }

    /// Sets a delay applied to every request, simulating network latency.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// All request paths seen so far, in arrival order.
    pub async fn recorded_requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Number of requests seen so far.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Highest number of concurrently executing requests observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, api_path: &str) -> Result<ApiResponse, NetError> {
        self.requests.write().await.push(api_path.to_string());

        let depth = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(depth, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = if let Some(message) = self.fail_paths.read().await.get(api_path) {
            Err(NetError::ConnectionFailed(message.clone()))
        } else {
            let url = self.full_url(api_path);
            Ok(match self.routes.read().await.get(api_path) {
                Some(route) => ApiResponse {
                    status: route.status,
                    body: route.body.clone(),
                    url,
                },
                None => ApiResponse {
                    status: StatusCode::NOT_FOUND,
                    body: Bytes::new(),
                    url,
                },
            })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn full_url(&self, api_path: &str) -> String {
        format!("http://mock{}", api_path)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    async fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
