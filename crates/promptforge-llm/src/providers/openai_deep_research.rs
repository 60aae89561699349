//! OpenAI deep-research translator
//!
//! Deep-research models run on the Responses API but only accept a medium
//! search context and a fixed medium effort. The requested reasoning level
//! still drives the soft instruction and the output ceiling.

use super::openai::{
    InputMessage, ReasoningConfig, ResponsesRequest, WebSearchTool, RESPONSES_ENDPOINT,
    WEB_SEARCH_TOOL,
};
use super::{
    ensure_translatable, instructed_system_prompt, is_deep_research, output_ceiling, to_body,
    GroundingMechanism, ProviderAdapter, ProviderFamily, ProviderPayload,
};
use crate::capability::CapabilityRecord;
use crate::error::{Error, Result};
use crate::request::CanonicalRequest;

/// Search context size accepted by deep-research models
pub const DEEP_RESEARCH_CONTEXT_SIZE: &str = "medium";

/// Effort accepted by deep-research models
pub const DEEP_RESEARCH_EFFORT: &str = "medium";

/// Translator for `o3-deep-research` and `o4-mini-deep-research`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepResearchAdapter;

impl ProviderAdapter for DeepResearchAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::OpenAiDeepResearch
    }

    fn translate(
        &self,
        request: &CanonicalRequest,
        capability: &CapabilityRecord,
    ) -> Result<ProviderPayload> {
        ensure_translatable(request, capability)?;
        if !is_deep_research(request.model_id()) {
            return Err(Error::Translation(format!(
                "{} is not a deep-research model",
                request.model_id()
            )));
        }
        let max_output_tokens = output_ceiling(request, capability);

        let body = ResponsesRequest {
            model: request.model_id(),
            instructions: instructed_system_prompt(request, false),
            input: vec![InputMessage {
                role: "user",
                content: request.user_prompt(),
            }],
            tools: vec![WebSearchTool {
                tool_type: WEB_SEARCH_TOOL,
                search_context_size: Some(DEEP_RESEARCH_CONTEXT_SIZE),
            }],
            tool_choice: "auto",
            reasoning: ReasoningConfig {
                effort: DEEP_RESEARCH_EFFORT,
                summary: "auto",
            },
            max_output_tokens,
        };

        Ok(ProviderPayload::new(
            self.family(),
            request.provider_id(),
            request.model_id(),
            RESPONSES_ENDPOINT,
            to_body(&body)?,
            GroundingMechanism::Tool(WEB_SEARCH_TOOL.to_string()),
            max_output_tokens,
        ))
    }
}
