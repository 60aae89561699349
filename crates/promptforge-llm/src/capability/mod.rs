//! Capability - what each provider/model pair can do
//!
//! Answers are taken from a static, versioned whitelist first. Pairs the
//! whitelist does not know can be resolved by a live probe; probe results are
//! cached write-once for the process lifetime.

mod probe;
mod registry;
mod whitelist;


pub use probe::{CapabilityProbe, LiveProbe, PROBE_PROMPT};
pub use registry::CapabilityRegistry;
pub use whitelist::{
    canonical_provider, lookup, normalize_model, WhitelistEntry, WHITELIST, WHITELIST_VERSION,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a capability record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilitySource {
    /// Static whitelist table
    Whitelist,
    /// Live probe result
    Probed,
    /// Neither whitelist nor probe could answer
    Unknown,
}

impl CapabilitySource {
    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Whitelist => "whitelist",
            Self::Probed => "probed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CapabilitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output ceiling assumed for pairs resolved by a probe
pub const PROBED_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Capability facts for one provider/model pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRecord {
    /// Provider id as requested
    pub provider_id: String,
    /// Model id as requested
    pub model_id: String,
    /// Provider-side web search is available
    pub supports_web_search: bool,
    /// Reasoning output is available
    pub supports_reasoning: bool,
    /// An explicit per-call grounding tool is accepted for this model
    pub per_call_tool: bool,
    /// Hard output token ceiling
    pub max_output_tokens: u32,
    /// Provenance
    pub source: CapabilitySource,
}

impl CapabilityRecord {
    /// Record for a pair nobody could vouch for
    #[must_use]
    pub fn unknown(provider_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
            supports_web_search: false,
            supports_reasoning: false,
            per_call_tool: false,
            max_output_tokens: 0,
            source: CapabilitySource::Unknown,
        }
    }

    /// Record built from a whitelist row
    #[must_use]
    pub fn from_whitelist(
        provider_id: impl Into<String>,
        model_id: impl Into<String>,
        entry: &WhitelistEntry,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
            supports_web_search: entry.web_search,
            supports_reasoning: entry.reasoning,
            per_call_tool: entry.per_call_tool,
            max_output_tokens: entry.max_output_tokens,
            source: CapabilitySource::Whitelist,
        }
    }

    /// Record built from a probe verdict
    #[must_use]
    pub fn probed(
        provider_id: impl Into<String>,
        model_id: impl Into<String>,
        supports_web_search: bool,
        supports_reasoning: bool,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
            supports_web_search,
            supports_reasoning,
            per_call_tool: true,
            max_output_tokens: PROBED_MAX_OUTPUT_TOKENS,
            source: CapabilitySource::Probed,
        }
    }

    /// Both grounding and reasoning are available
    #[must_use]
    pub fn is_grounding_ready(&self) -> bool {
        self.supports_web_search && self.supports_reasoning
    }
}
