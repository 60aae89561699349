//! Google Gemini translator
//!
//! Gemini 2.x takes the `google_search` tool per call; legacy 1.5 models only
//! understand `google_search_retrieval`. Thinking models expose their
//! reasoning as `thought` parts when `includeThoughts` is set.

use super::{
    ensure_translatable, instructed_system_prompt, output_ceiling, to_body, GroundingMechanism,
    ProviderAdapter, ProviderFamily, ProviderPayload,
};
use crate::capability::CapabilityRecord;
use crate::error::Result;
use crate::request::{CanonicalRequest, ReasoningLevel};
use serde::Serialize;

/// Per-call search tool
pub const GOOGLE_SEARCH: &str = "google_search";

/// Legacy retrieval tool
pub const GOOGLE_SEARCH_RETRIEVAL: &str = "google_search_retrieval";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'static>,
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: std::borrow::Cow<'a, str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Tool {
    GoogleSearch(EmptyObject),
    GoogleSearchRetrieval(RetrievalConfig),
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Serialize)]
struct RetrievalConfig {
    dynamic_retrieval_config: DynamicRetrieval,
}

#[derive(Debug, Serialize)]
struct DynamicRetrieval {
    mode: &'static str,
    dynamic_threshold: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
    include_thoughts: bool,
}

/// Thinking budget for a level, never more than half the output ceiling
fn thinking_budget(level: ReasoningLevel, ceiling: u32) -> u32 {
    let wanted = match level {
        ReasoningLevel::Low => 1024,
        ReasoningLevel::Medium => 4096,
        ReasoningLevel::High => 8192,
    };
    wanted.min(ceiling / 2)
}

/// Translator for the Gemini `generateContent` API
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiAdapter;

impl ProviderAdapter for GeminiAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Gemini
    }

    fn translate(
        &self,
        request: &CanonicalRequest,
        capability: &CapabilityRecord,
    ) -> Result<ProviderPayload> {
        ensure_translatable(request, capability)?;
        let max_output_tokens = output_ceiling(request, capability);

        // 1.5 models reject thinkingConfig; they only get the instruction
        let (tool, mechanism) = if capability.per_call_tool {
            (Tool::GoogleSearch(EmptyObject {}), GOOGLE_SEARCH)
        } else {
            (
                Tool::GoogleSearchRetrieval(RetrievalConfig {
                    dynamic_retrieval_config: DynamicRetrieval {
                        mode: "MODE_DYNAMIC",
                        dynamic_threshold: 0.0,
                    },
                }),
                GOOGLE_SEARCH_RETRIEVAL,
            )
        };

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: instructed_system_prompt(request, false).into(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: request.user_prompt().into(),
                }],
            }],
            tools: vec![tool],
            generation_config: GenerationConfig {
                max_output_tokens,
                thinking_config: capability.per_call_tool.then(|| ThinkingConfig {
                    thinking_budget: thinking_budget(request.reasoning_level(), max_output_tokens),
                    include_thoughts: true,
                }),
            },
        };

        Ok(ProviderPayload::new(
            self.family(),
            request.provider_id(),
            request.model_id(),
            format!("/models/{}:generateContent", request.model_id()),
            to_body(&body)?,
            GroundingMechanism::Tool(mechanism.to_string()),
            max_output_tokens,
        ))
    }
}
