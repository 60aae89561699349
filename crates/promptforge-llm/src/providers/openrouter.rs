//! OpenRouter translator
//!
//! OpenRouter grounds either through the `web` plugin (per call, carries
//! `max_results` and `search_prompt` natively) or through the `:online`
//! model-slug variant, which takes no options.

use super::{
    ensure_translatable, instructed_system_prompt, output_ceiling, to_body, GroundingMechanism,
    ProviderAdapter, ProviderFamily, ProviderPayload,
};
use crate::capability::CapabilityRecord;
use crate::error::Result;
use crate::request::CanonicalRequest;
use serde::Serialize;

/// Chat completions endpoint
pub const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";

/// Web plugin id
pub const WEB_PLUGIN: &str = "web";

/// Model-slug suffix that enables search
pub const ONLINE_SUFFIX: &str = ":online";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: String,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    plugins: Vec<WebPlugin<'a>>,
    reasoning: Reasoning,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: std::borrow::Cow<'a, str>,
}

#[derive(Debug, Serialize)]
struct WebPlugin<'a> {
    id: &'static str,
    max_results: u32,
    search_prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct Reasoning {
    effort: &'static str,
}

/// Strip any variant suffix from a slug
fn base_slug(model_id: &str) -> &str {
    model_id
        .split_once(':')
        .map_or(model_id, |(base, _)| base)
        .trim()
}

/// Translator for the OpenRouter chat completions API
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRouterAdapter;

impl ProviderAdapter for OpenRouterAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::OpenRouter
    }

    fn translate(
        &self,
        request: &CanonicalRequest,
        capability: &CapabilityRecord,
    ) -> Result<ProviderPayload> {
        ensure_translatable(request, capability)?;
        let max_output_tokens = output_ceiling(request, capability);
        let per_call = capability.per_call_tool;
        let base = base_slug(request.model_id());

        let (model, plugins, mechanism) = if per_call {
            (
                base.to_string(),
                vec![WebPlugin {
                    id: WEB_PLUGIN,
                    max_results: request.max_results(),
                    search_prompt: request.search_prompt(),
                }],
                GroundingMechanism::Plugin(WEB_PLUGIN.to_string()),
            )
        } else {
            (
                format!("{base}{ONLINE_SUFFIX}"),
                Vec::new(),
                GroundingMechanism::ModelSuffix(ONLINE_SUFFIX.to_string()),
            )
        };

        let body = ChatRequest {
            model: model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instructed_system_prompt(request, per_call).into(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt().into(),
                },
            ],
            plugins,
            reasoning: Reasoning {
                effort: request.reasoning_level().as_str(),
            },
            max_tokens: max_output_tokens,
        };

        Ok(ProviderPayload::new(
            self.family(),
            request.provider_id(),
            model,
            CHAT_COMPLETIONS_ENDPOINT,
            to_body(&body)?,
            mechanism,
            max_output_tokens,
        ))
    }
}
