//! HTTP exchange seam

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Fully built POST request
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    /// Absolute URL
    pub url: String,
    /// Request headers, credentials included
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Value,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("url", &self.url)
            .field("headers", &crate::util::redact_headers(&self.headers))
            .finish_non_exhaustive()
    }
}

impl HttpRequest {
    /// Value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP reply of any status
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Body text
    pub body: String,
    /// Original body bytes, kept only when they are not valid UTF-8
    pub raw_bytes: Option<Vec<u8>>,
}

impl HttpReply {
    /// Reply with no headers
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            raw_bytes: None,
        }
    }

    /// Reply from an undecoded body
    pub fn from_bytes(status: u16, headers: Vec<(String, String)>, bytes: Vec<u8>) -> Self {
        let (body, raw_bytes) = match String::from_utf8(bytes) {
            Ok(body) => (body, None),
            Err(e) => (
                String::from_utf8_lossy(e.as_bytes()).into_owned(),
                Some(e.into_bytes()),
            ),
        };
        Self {
            status,
            headers,
            body,
            raw_bytes,
        }
    }

    /// Status worth retrying (429 or 5xx)
    pub fn is_transient(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }
}

/// Exchange failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeErrorKind {
    /// Request timed out
    Timeout,
    /// Connection failed
    Connect,
    /// Anything else
    Other,
}

/// Exchange failure with no HTTP reply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct ExchangeError {
    /// Failure class
    pub kind: ExchangeErrorKind,
    /// Detail text
    pub detail: String,
}

impl ExchangeError {
    /// Timeout failure
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self {
            kind: ExchangeErrorKind::Timeout,
            detail: detail.into(),
        }
    }

    /// Connection failure
    pub fn connect(detail: impl Into<String>) -> Self {
        Self {
            kind: ExchangeErrorKind::Connect,
            detail: detail.into(),
        }
    }

    /// Other failure
    pub fn other(detail: impl Into<String>) -> Self {
        Self {
            kind: ExchangeErrorKind::Other,
            detail: detail.into(),
        }
    }

    /// Timeouts and connection failures are retried
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ExchangeErrorKind::Timeout | ExchangeErrorKind::Connect
        )
    }

    fn from_reqwest(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            ExchangeErrorKind::Timeout
        } else if error.is_connect() {
            ExchangeErrorKind::Connect
        } else {
            ExchangeErrorKind::Other
        };
        // Gemini URLs can carry the key as a query parameter
        let detail = error.without_url().to_string();
        Self { kind, detail }
    }
}

/// Performs one HTTP POST
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpExchange: Send + Sync {
    /// Send the request once
    async fn post(&self, request: &HttpRequest) -> std::result::Result<HttpReply, ExchangeError>;
}

/// reqwest-backed exchange
#[derive(Debug, Clone)]
pub struct ReqwestExchange {
    client: Client,
}

impl ReqwestExchange {
    /// Create an exchange with a per-call timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpExchange for ReqwestExchange {
    async fn post(&self, request: &HttpRequest) -> std::result::Result<HttpReply, ExchangeError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(ExchangeError::from_reqwest)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let bytes = response.bytes().await.map_err(ExchangeError::from_reqwest)?;

        Ok(HttpReply::from_bytes(status, headers, bytes.to_vec()))
    }
}
