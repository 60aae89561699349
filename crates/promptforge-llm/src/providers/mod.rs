//! Providers - canonical request to provider-native payload
//!
//! Each provider family expresses "search the web" and "show your reasoning"
//! differently. One [`ProviderAdapter`] per family hides that divergence:
//! - `openai`: OpenAI Responses API (`web_search_preview` tool)
//! - `openai_deep_research`: deep-research models on the Responses API
//! - `gemini`: Google `generateContent` with `google_search`
//! - `openrouter`: chat completions with the `web` plugin or `:online` slug

mod gemini;
mod openai;
mod openai_deep_research;
mod openrouter;


pub use gemini::GeminiAdapter;
pub use openai::OpenAiResponsesAdapter;
pub use openai_deep_research::DeepResearchAdapter;
pub use openrouter::OpenRouterAdapter;

use crate::capability::{canonical_provider, normalize_model, CapabilityRecord};
use crate::error::{Error, Result};
use crate::request::CanonicalRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Types
// ============================================================================

/// Provider family a payload was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// OpenAI Responses API
    OpenAiResponses,
    /// OpenAI deep-research models
    OpenAiDeepResearch,
    /// Google Gemini
    Gemini,
    /// OpenRouter aggregator
    OpenRouter,
}

impl ProviderFamily {
    /// Snake-case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAiResponses => "openai_responses",
            Self::OpenAiDeepResearch => "openai_deep_research",
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grounding mechanism placed into a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum GroundingMechanism {
    /// Explicit per-call tool
    Tool(String),
    /// Request plugin
    Plugin(String),
    /// Model slug suffix
    ModelSuffix(String),
}

impl fmt::Display for GroundingMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool(name) => write!(f, "tool:{name}"),
            Self::Plugin(name) => write!(f, "plugin:{name}"),
            Self::ModelSuffix(suffix) => write!(f, "model_suffix:{suffix}"),
        }
    }
}

/// Provider-shaped request body
///
/// Consumed by the transport when sent; deliberately not `Clone`.
#[derive(Debug)]
pub struct ProviderPayload {
    family: ProviderFamily,
    provider_id: String,
    model: String,
    endpoint: String,
    body: Value,
    mechanism: GroundingMechanism,
    max_output_tokens: u32,
}

impl ProviderPayload {
    pub(crate) fn new(
        family: ProviderFamily,
        provider_id: &str,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        body: Value,
        mechanism: GroundingMechanism,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            family,
            provider_id: canonical_provider(provider_id),
            model: model.into(),
            endpoint: endpoint.into(),
            body,
            mechanism,
            max_output_tokens,
        }
    }

    /// Provider family
    pub fn family(&self) -> ProviderFamily {
        self.family
    }

    /// Canonical provider id
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Model id as sent (may carry a variant suffix)
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint path relative to the provider base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// JSON body
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Grounding mechanism requested
    pub fn mechanism(&self) -> &GroundingMechanism {
        &self.mechanism
    }

    /// Output ceiling placed in the body
    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }
}

// ============================================================================
// Adapter trait
// ============================================================================

/// Translates canonical requests for one provider family
pub trait ProviderAdapter: Send + Sync {
    /// Family this adapter serves
    fn family(&self) -> ProviderFamily;

    /// Build the native payload
    ///
    /// Fails with [`Error::Translation`] for malformed requests and
    /// [`Error::Capability`] when the record does not support grounding and
    /// reasoning.
    fn translate(
        &self,
        request: &CanonicalRequest,
        capability: &CapabilityRecord,
    ) -> Result<ProviderPayload>;
}

/// Select the adapter for a provider/model pair
pub fn adapter_for(provider_id: &str, model_id: &str) -> Result<Box<dyn ProviderAdapter>> {
    match canonical_provider(provider_id).as_str() {
        "openai" if is_deep_research(model_id) => Ok(Box::new(DeepResearchAdapter)),
        "openai" => Ok(Box::new(OpenAiResponsesAdapter)),
        "google" => Ok(Box::new(GeminiAdapter)),
        "openrouter" => Ok(Box::new(OpenRouterAdapter)),
        other => Err(Error::capability(
            other,
            model_id,
            "no translator for this provider",
        )),
    }
}

/// Deep-research models need their own request shape
pub(crate) fn is_deep_research(model_id: &str) -> bool {
    normalize_model(model_id).contains("deep-research")
}

// ============================================================================
// Shared checks
// ============================================================================

/// Reject malformed requests and pairs that cannot ground and reason
pub(crate) fn ensure_translatable(
    request: &CanonicalRequest,
    capability: &CapabilityRecord,
) -> Result<()> {
    if request.provider_id().trim().is_empty() || request.model_id().trim().is_empty() {
        return Err(Error::Translation(
            "provider_id and model_id must be non-empty".to_string(),
        ));
    }
    if request.user_prompt().trim().is_empty() {
        return Err(Error::Translation("user prompt is empty".to_string()));
    }
    if request.max_results() == 0 {
        return Err(Error::Translation(
            "max_results must be at least 1".to_string(),
        ));
    }
    if !request.grounding_required() {
        return Err(Error::Translation(
            "grounding_required must be true".to_string(),
        ));
    }
    if !capability.supports_web_search {
        return Err(Error::capability(
            request.provider_id(),
            request.model_id(),
            format!(
                "provider-side web search not supported (source: {})",
                capability.source
            ),
        ));
    }
    if !capability.supports_reasoning {
        return Err(Error::capability(
            request.provider_id(),
            request.model_id(),
            format!(
                "reasoning output not supported (source: {})",
                capability.source
            ),
        ));
    }
    if capability.max_output_tokens == 0 {
        return Err(Error::capability(
            request.provider_id(),
            request.model_id(),
            "model output ceiling unknown",
        ));
    }
    Ok(())
}

/// Hard output cap for a request
pub(crate) fn output_ceiling(request: &CanonicalRequest, capability: &CapabilityRecord) -> u32 {
    request
        .reasoning_level()
        .token_budget()
        .min(capability.max_output_tokens)
}

/// System text with grounding and reasoning instructions appended
///
/// `native_search_options` is true when the provider takes `max_results` and
/// `search_prompt` as request fields, in which case they are left out here.
pub(crate) fn instructed_system_prompt(
    request: &CanonicalRequest,
    native_search_options: bool,
) -> String {
    let mut text = String::new();
    if !request.system_prompt().trim().is_empty() {
        text.push_str(request.system_prompt().trim_end());
        text.push_str("\n\n");
    }
    text.push_str("Use web search to find current, authoritative information before answering.");
    if !native_search_options {
        text.push_str(&format!(
            " Consult up to {} search results. {}",
            request.max_results(),
            request.search_prompt()
        ));
    }
    text.push_str("\n\n");
    text.push_str(request.reasoning_level().instruction());
    text
}

pub(crate) fn to_body<T: Serialize>(body: &T) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| Error::Translation(format!("payload encoding: {e}")))
}
