//! Transport - sending payloads to providers
//!
//! [`TransportClient`] attaches authentication, applies the per-call timeout
//! and retries transient failures against the same provider. The actual HTTP
//! exchange sits behind [`HttpExchange`] so retry behaviour can be tested
//! without a network.

mod client;
mod config;
mod exchange;

#[cfg(test)]
mod tests;

pub use client::TransportClient;
pub use config::{Endpoints, ProviderEndpoint, TransportConfig};
pub use exchange::{
    ExchangeError, ExchangeErrorKind, HttpExchange, HttpReply, HttpRequest, ReqwestExchange,
};

#[cfg(test)]
pub use exchange::MockHttpExchange;

use crate::providers::ProviderPayload;
use crate::util::redact_headers;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

// ============================================================================
// Raw response
// ============================================================================

/// Unmodified provider reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    /// HTTP status
    pub status: u16,
    /// Response headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Body text, verbatim unless the provider sent invalid UTF-8
    pub body: String,
    /// Original body bytes when `body` had to be decoded lossily
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_bytes: Option<Vec<u8>>,
    /// Send attempts it took to get this reply
    pub attempts: u32,
    /// When the reply arrived
    pub received_at: DateTime<Utc>,
}

impl RawResponse {
    /// Response with a status and body, no headers, one attempt
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            raw_bytes: None,
            attempts: 1,
            received_at: Utc::now(),
        }
    }

    /// Attach headers
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the attempt count
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Body exactly as received
    pub fn body_bytes(&self) -> &[u8] {
        self.raw_bytes.as_deref().unwrap_or(self.body.as_bytes())
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON, if it is JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Headers with credential values replaced
    pub fn redacted_headers(&self) -> Vec<(String, String)> {
        redact_headers(&self.headers)
    }
}

// ============================================================================
// Transport error
// ============================================================================

/// Transport failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// Per-call timeout elapsed
    Timeout,
    /// Connection could not be established
    Connect,
    /// Caller deadline elapsed
    Deadline,
    /// Provider endpoint or key missing
    NotConfigured,
    /// Anything else (request building, body decoding)
    Other,
}

impl TransportErrorKind {
    /// Whether this class is retried
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connection failure",
            Self::Deadline => "deadline exceeded",
            Self::NotConfigured => "not configured",
            Self::Other => "transport failure",
        }
    }
}

/// Terminal transport failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} after {attempts} attempt(s): {detail}")]
pub struct TransportError {
    /// Failure class
    pub kind: TransportErrorKind,
    /// Human-readable detail, secrets removed
    pub detail: String,
    /// Send attempts made
    pub attempts: u32,
}

impl TransportError {
    /// Create a transport error
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>, attempts: u32) -> Self {
        Self {
            kind,
            detail: detail.into(),
            attempts,
        }
    }

    /// Whether the failure class is retryable
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the transport hands to the validator
pub type SendResult = std::result::Result<RawResponse, TransportError>;

// ============================================================================
// Transport trait
// ============================================================================

/// Sends provider payloads
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a payload, retrying transient failures
    async fn send(&self, payload: ProviderPayload) -> SendResult;

    /// [`send`](Transport::send), bumping `attempts` as each attempt starts
    ///
    /// The counter stays readable if the caller drops the future part way.
    async fn send_counted(&self, payload: ProviderPayload, attempts: &AtomicU32) -> SendResult {
        attempts.fetch_add(1, Ordering::Relaxed);
        self.send(payload).await
    }
}
