//! OpenAI Responses API translator

use super::{
    ensure_translatable, instructed_system_prompt, output_ceiling, to_body, GroundingMechanism,
    ProviderAdapter, ProviderFamily, ProviderPayload,
};
use crate::capability::CapabilityRecord;
use crate::error::Result;
use crate::request::CanonicalRequest;
use serde::Serialize;

/// Responses endpoint
pub const RESPONSES_ENDPOINT: &str = "/responses";

/// Web search tool type
pub const WEB_SEARCH_TOOL: &str = "web_search_preview";

#[derive(Debug, Serialize)]
pub(crate) struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub instructions: String,
    pub input: Vec<InputMessage<'a>>,
    pub tools: Vec<WebSearchTool>,
    pub tool_choice: &'static str,
    pub reasoning: ReasoningConfig,
    pub max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct InputMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct WebSearchTool {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_context_size: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReasoningConfig {
    pub effort: &'static str,
    pub summary: &'static str,
}

/// Translator for GPT-5 and o-series models
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiResponsesAdapter;

impl ProviderAdapter for OpenAiResponsesAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::OpenAiResponses
    }

    fn translate(
        &self,
        request: &CanonicalRequest,
        capability: &CapabilityRecord,
    ) -> Result<ProviderPayload> {
        ensure_translatable(request, capability)?;
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
                search_context_size: None,
            }],
            tool_choice: "auto",
            reasoning: ReasoningConfig {
                effort: request.reasoning_level().as_str(),
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
