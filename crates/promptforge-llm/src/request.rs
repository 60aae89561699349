//! Canonical request types
//!
//! A [`CanonicalRequest`] is the provider-neutral description of one grounded
//! generation. It is built once per invocation and only read afterwards; the
//! translators in [`crate::providers`] turn it into provider-native payloads.

use crate::capability::WHITELIST_VERSION;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Default number of search results requested from providers that accept it
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Default instruction attached to web search results
pub const DEFAULT_SEARCH_PROMPT: &str = "A web search was conducted. Use the following web \
search results to supplement your answer. Cite the sources you rely on as markdown links \
named after the domain of each source.";

/// How much reasoning the caller asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningLevel {
    /// Short justification
    Low,
    /// Step-by-step reasoning
    Medium,
    /// Thorough reasoning
    #[default]
    High,
}

impl ReasoningLevel {
    /// Wire name used by providers that accept an effort string
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Output token budget for this level before the model ceiling applies
    #[must_use]
    pub fn token_budget(&self) -> u32 {
        match self {
            Self::Low => 4096,
            Self::Medium => 8192,
            Self::High => 16384,
        }
    }

    /// Soft instruction injected into the system text
    #[must_use]
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Low => "Briefly explain the reasoning behind your answer before giving it.",
            Self::Medium => "Explain your reasoning step by step before giving the final answer.",
            Self::High => {
                "Reason carefully and thoroughly. Lay out your reasoning step by step, weigh \
                 the evidence from your web search results, then give the final answer."
            }
        }
    }
}

impl fmt::Display for ReasoningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown reasoning level: {other}")),
        }
    }
}

/// Provider-neutral grounded generation request
///
/// Fields are private; construct with [`CanonicalRequest::new`] and the
/// `with_*` builders, then share by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    provider_id: String,
    model_id: String,
    system_prompt: String,
    user_prompt: String,
    grounding_required: bool,
    max_results: u32,
    search_prompt: String,
    reasoning_level: ReasoningLevel,
}

impl CanonicalRequest {
    /// Create a grounded request with default search settings
    #[must_use]
    pub fn new(
        provider_id: impl Into<String>,
        model_id: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            grounding_required: true,
            max_results: DEFAULT_MAX_RESULTS,
            search_prompt: DEFAULT_SEARCH_PROMPT.to_string(),
            reasoning_level: ReasoningLevel::default(),
        }
    }

    /// Set the number of search results to request
    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the instruction attached to search results
    #[must_use]
    pub fn with_search_prompt(mut self, search_prompt: impl Into<String>) -> Self {
        self.search_prompt = search_prompt.into();
        self
    }

    /// Set the reasoning level
    #[must_use]
    pub fn with_reasoning_level(mut self, level: ReasoningLevel) -> Self {
        self.reasoning_level = level;
        self
    }

    /// Toggle the grounding requirement
    ///
    /// Translators refuse requests where this is false.
    #[must_use]
    pub fn with_grounding_required(mut self, required: bool) -> Self {
        self.grounding_required = required;
        self
    }

    /// Provider id
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Model id
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// System prompt
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// User prompt
    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    /// Whether grounding is required
    pub fn grounding_required(&self) -> bool {
        self.grounding_required
    }

    /// Requested number of search results
    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Instruction attached to search results
    pub fn search_prompt(&self) -> &str {
        &self.search_prompt
    }

    /// Requested reasoning level
    pub fn reasoning_level(&self) -> ReasoningLevel {
        self.reasoning_level
    }

    /// SHA-256 over system and user prompt, hex encoded
    #[must_use]
    pub fn prompt_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.system_prompt.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.user_prompt.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Summary suitable for the audit trail (no prompt text)
    #[must_use]
    pub fn summary(&self) -> RequestSummary {
        RequestSummary {
            provider_id: self.provider_id.clone(),
            model_id: self.model_id.clone(),
            reasoning_level: self.reasoning_level,
            max_results: self.max_results,
            search_prompt: self.search_prompt.clone(),
            system_prompt_chars: self.system_prompt.chars().count(),
            user_prompt_chars: self.user_prompt.chars().count(),
            prompt_sha256: self.prompt_digest(),
            whitelist_version: WHITELIST_VERSION.to_string(),
            grounding_mechanism: None,
        }
    }
}

/// What was asked for, as recorded in the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSummary {
    /// Provider id
    pub provider_id: String,
    /// Model id as requested
    pub model_id: String,
    /// Requested reasoning level
    pub reasoning_level: ReasoningLevel,
    /// Requested number of search results
    pub max_results: u32,
    /// Instruction attached to search results
    pub search_prompt: String,
    /// System prompt length in characters
    pub system_prompt_chars: usize,
    /// User prompt length in characters
    pub user_prompt_chars: usize,
    /// Digest of the prompt pair
    pub prompt_sha256: String,
    /// Version of the capability whitelist used
    pub whitelist_version: String,
    /// Grounding mechanism placed in the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_mechanism: Option<String>,
}

impl RequestSummary {
    /// Record the grounding mechanism the translator chose
    #[must_use]
    pub fn with_mechanism(mut self, mechanism: impl Into<String>) -> Self {
        self.grounding_mechanism = Some(mechanism.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_level_parse() {
        assert_eq!("HIGH".parse::<ReasoningLevel>(), Ok(ReasoningLevel::High));
        assert_eq!(" low ".parse::<ReasoningLevel>(), Ok(ReasoningLevel::Low));
        assert!("extreme".parse::<ReasoningLevel>().is_err());
    }

    #[test]
    fn test_reasoning_level_budgets_increase() {
        assert!(ReasoningLevel::Low.token_budget() < ReasoningLevel::Medium.token_budget());
        assert!(ReasoningLevel::Medium.token_budget() < ReasoningLevel::High.token_budget());
    }

    #[test]
    fn test_request_defaults() {
        let request = CanonicalRequest::new("openai", "gpt-5", "sys", "user");
        assert!(request.grounding_required());
        assert_eq!(request.max_results(), DEFAULT_MAX_RESULTS);
        assert_eq!(request.search_prompt(), DEFAULT_SEARCH_PROMPT);
        assert_eq!(request.reasoning_level(), ReasoningLevel::High);
    }

    #[test]
    fn test_summary_omits_prompt_text() {
        let request = CanonicalRequest::new("google", "gemini-2.5-pro", "secret system", "question")
            .with_reasoning_level(ReasoningLevel::Low);
        let summary = request.summary().with_mechanism("tool:google_search");

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("secret system"));
        assert_eq!(summary.system_prompt_chars, 13);
        assert_eq!(summary.prompt_sha256.len(), 64);
        assert_eq!(summary.whitelist_version, WHITELIST_VERSION);
        assert_eq!(summary.grounding_mechanism.as_deref(), Some("tool:google_search"));
    }

    #[test]
    fn test_prompt_digest_separates_fields() {
        let a = CanonicalRequest::new("openai", "gpt-5", "ab", "c");
        let b = CanonicalRequest::new("openai", "gpt-5", "a", "bc");
        assert_ne!(a.prompt_digest(), b.prompt_digest());
    }
}
