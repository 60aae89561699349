//! Validate - enforcement of grounding and reasoning
//!
//! A response is trusted only if it proves that provider-side search ran and
//! that reasoning was returned. The checks run in a fixed order and the first
//! failing check decides the outcome:
//!
//! 1. transport failed upstream: `TRANSPORT_ERROR`
//! 2. non-2xx status or a top-level `error` object: `PROVIDER_ERROR`
//! 3. no tool-usage evidence: `REJECTED_NO_TOOL`
//! 4. no reasoning distinct from the answer: `REJECTED_NO_REASONING`
//! 5. otherwise `ACCEPTED`

mod evidence;

#[cfg(test)]
mod tests;

pub use evidence::{scan, Evidence};

use crate::transport::{RawResponse, SendResult};
use crate::util::sanitize_api_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Normalized citation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Page URL
    #[serde(default)]
    pub url: String,
    /// Quoted snippet
    #[serde(default)]
    pub snippet: String,
}

impl Source {
    /// Source with only a URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the snippet
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }
}

/// Terminal verdict for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationOutcome {
    /// Grounded and reasoned
    Accepted {
        /// Extracted reasoning
        reasoning_text: String,
        /// De-duplicated sources
        sources: Vec<Source>,
    },
    /// No evidence that provider-side search ran
    RejectedNoTool,
    /// Search ran but no reasoning was returned
    RejectedNoReasoning,
    /// Provider returned an error
    ProviderError {
        /// Sanitized error detail
        detail: String,
    },
    /// No usable reply reached us
    TransportError {
        /// Failure detail
        detail: String,
    },
}

/// Outcome without payload, as stored in audit records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeTag {
    /// Grounded and reasoned
    Accepted,
    /// No search evidence
    RejectedNoTool,
    /// No reasoning evidence
    RejectedNoReasoning,
    /// Provider error
    ProviderError,
    /// Transport error
    TransportError,
}

impl OutcomeTag {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::RejectedNoTool => "REJECTED_NO_TOOL",
            Self::RejectedNoReasoning => "REJECTED_NO_REASONING",
            Self::ProviderError => "PROVIDER_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
        }
    }
}

impl fmt::Display for OutcomeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ValidationOutcome {
    /// Payload-free tag
    #[must_use]
    pub fn tag(&self) -> OutcomeTag {
        match self {
            Self::Accepted { .. } => OutcomeTag::Accepted,
            Self::RejectedNoTool => OutcomeTag::RejectedNoTool,
            Self::RejectedNoReasoning => OutcomeTag::RejectedNoReasoning,
            Self::ProviderError { .. } => OutcomeTag::ProviderError,
            Self::TransportError { .. } => OutcomeTag::TransportError,
        }
    }

    /// Whether output may be trusted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Validate whatever the transport produced
#[must_use]
pub fn validate(result: &SendResult) -> ValidationOutcome {
    match result {
        Ok(raw) => validate_response(raw),
        Err(e) => ValidationOutcome::TransportError {
            detail: e.to_string(),
        },
    }
}

/// Validate a provider reply
///
/// Pure: the same response always yields the same outcome.
#[must_use]
pub fn validate_response(raw: &RawResponse) -> ValidationOutcome {
    let json = raw.json();

    if !raw.is_success() {
        return ValidationOutcome::ProviderError {
            detail: provider_error_detail(raw.status, json.as_ref(), &raw.body),
        };
    }

    let Some(json) = json else {
        return ValidationOutcome::RejectedNoTool;
    };

    if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
        return ValidationOutcome::ProviderError {
            detail: format!(
                "HTTP {}: {}",
                raw.status,
                sanitize_api_error(&error_message(error))
            ),
        };
    }

    let evidence = scan(&json);
    if !evidence.has_tool_evidence() {
        return ValidationOutcome::RejectedNoTool;
    }

    match evidence.reasoning_text() {
        Some(reasoning_text) => ValidationOutcome::Accepted {
            reasoning_text,
            sources: evidence.sources,
        },
        None => ValidationOutcome::RejectedNoReasoning,
    }
}

fn provider_error_detail(status: u16, json: Option<&Value>, body: &str) -> String {
    let message = json
        .and_then(|v| v.get("error"))
        .map(error_message)
        .unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {}", sanitize_api_error(&message))
    }
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}
