//! Error types for promptforge-core
//!
//! Every failure surfaces as a [`GroundingError`]. Its [`ErrorKind`] decides
//! the process exit status, and `audit_reference` points at the record when
//! the request got far enough to leave one.

use promptforge_llm::ValidationOutcome;
use serde::Serialize;
use std::fmt;
use thiserror::Error;


/// Failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Provider/model pair cannot do grounded generation
    Capability,
    /// Canonical request could not be translated
    Translation,
    /// Nothing usable came back over the wire
    Transport,
    /// Provider answered with an error
    Provider,
    /// No evidence that the search tool ran
    RejectedNoTool,
    /// Tool evidence but no reasoning
    RejectedNoReasoning,
    /// Audit record could not be written
    Audit,
    /// Configuration or local I/O problem
    Config,
}

impl ErrorKind {
    /// Process exit status for this class
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Capability | Self::Translation => 2,
            Self::Transport | Self::Provider => 3,
            Self::RejectedNoTool | Self::RejectedNoReasoning => 4,
            Self::Audit | Self::Config => 1,
        }
    }

    /// Whether the failure happened before any network call
    #[must_use]
    pub fn is_pre_flight(&self) -> bool {
        matches!(self, Self::Capability | Self::Translation)
    }

    /// Whether the validator refused the response
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RejectedNoTool | Self::RejectedNoReasoning)
    }

    /// Stable name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capability => "capability",
            Self::Translation => "translation",
            Self::Transport => "transport",
            Self::Provider => "provider",
            Self::RejectedNoTool => "rejected_no_tool",
            Self::RejectedNoReasoning => "rejected_no_reasoning",
            Self::Audit => "audit",
            Self::Config => "config",
        }
    }

    /// Error class for a non-accepted verdict
    #[must_use]
    pub fn from_outcome(outcome: &ValidationOutcome) -> Option<Self> {
        match outcome {
            ValidationOutcome::Accepted { .. } => None,
            ValidationOutcome::RejectedNoTool => Some(Self::RejectedNoTool),
            ValidationOutcome::RejectedNoReasoning => Some(Self::RejectedNoReasoning),
            ValidationOutcome::ProviderError { .. } => Some(Self::Provider),
            ValidationOutcome::TransportError { .. } => Some(Self::Transport),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one grounded run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct GroundingError {
    /// Failure class
    pub kind: ErrorKind,
    /// Human-readable detail, secrets removed
    pub detail: String,
    /// Audit record path, when one was written
    pub audit_reference: Option<String>,
}

impl GroundingError {
    /// Create an error without an audit reference
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            audit_reference: None,
        }
    }

    /// Attach the audit record reference
    #[must_use]
    pub fn with_audit_reference(mut self, reference: impl Into<String>) -> Self {
        self.audit_reference = Some(reference.into());
        self
    }

    /// Process exit status
    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl From<promptforge_llm::Error> for GroundingError {
    fn from(e: promptforge_llm::Error) -> Self {
        use promptforge_llm::Error as LlmError;

        let kind = match &e {
            LlmError::Capability { .. } => ErrorKind::Capability,
            LlmError::Translation(_) => ErrorKind::Translation,
            LlmError::Network(_) => ErrorKind::Transport,
            LlmError::Pricing(_) => ErrorKind::Config,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<promptforge_replay::Error> for GroundingError {
    fn from(e: promptforge_replay::Error) -> Self {
        Self::new(ErrorKind::Audit, e.to_string())
    }
}

/// Crate error type
pub type Error = GroundingError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
