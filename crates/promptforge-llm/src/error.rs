//! Error types for promptforge-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// The provider/model pair cannot satisfy the grounding requirement
    #[error("capability error: {provider}/{model}: {reason}")]
    Capability {
        /// Provider id as requested
        provider: String,
        /// Model id as requested
        model: String,
        /// Why the pair was refused
        reason: String,
    },

    /// Malformed canonical request
    #[error("translation error: {0}")]
    Translation(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Pricing index could not be loaded
    #[error("pricing error: {0}")]
    Pricing(String),
}

impl Error {
    /// Build a capability error for a provider/model pair
    pub fn capability(
        provider: impl Into<String>,
        model: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Capability {
            provider: provider.into(),
            model: model.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
