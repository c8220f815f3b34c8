//! Types for the network access layer.

use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the network access layer.
///
/// Note that a non-2xx status is *not* an error here: the governor hands the
/// response back with its status and callers inspect it. Only transport
/// level failures surface as `NetError`.
#[derive(Debug, Error)]
pub enum NetError {
    /// The request never completed (DNS, connect, TLS, timeout, aborted
    /// body read).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The HTTP client could not be constructed (bad TLS configuration or
    /// similar). Fatal at the binary boundary.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// A completed GET as seen by governor callers.
///
/// The body is fully buffered; images and detail payloads here are small.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status, carried as data.
    pub status: StatusCode,
    /// Response body.
    pub body: Bytes,
    /// Full url the request was (or would have been) issued against.
    pub url: String,
}

impl ApiResponse {
    /// A fabricated response standing in for a request a tier declined to
    /// send: 412 Precondition Failed with an empty body, no network call.
    pub fn not_sent(url: String) -> Self {
        Self {
            status: StatusCode::PRECONDITION_FAILED,
            body: Bytes::new(),
            url,
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
