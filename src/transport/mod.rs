//! HTTP transport abstraction.
//!
//! # Design Decisions
//! - Adapters speak `TransportRequest`/`TransportResponse`, never a concrete
//!   HTTP client type, so tests can script responses without a network
//! - A transport call is synchronous from the adapter's point of view: one
//!   request in, status + headers + body out
//! - Timeout classification happens here; adapters only map it onto the
//!   canonical taxonomy

pub mod client;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

pub use client::HttpTransport;

/// HTTP methods used by the payment gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single outbound provider request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    /// Caller-supplied deadline for this call.
    pub timeout: Duration,
}

impl TransportRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout,
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>, timeout: Duration) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: HashMap::new(),
            body: Some(body),
            timeout,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A provider response, fully buffered.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failures, before any provider semantics apply.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// Blocking send of one request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
