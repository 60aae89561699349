//! Live capability probes

use super::{CapabilityRecord, CapabilitySource};
use crate::providers::adapter_for;
use crate::request::{CanonicalRequest, ReasoningLevel};
use crate::transport::Transport;
use crate::validate::{validate_response, ValidationOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Prompt sent by [`LiveProbe`]
pub const PROBE_PROMPT: &str =
    "Search the web for today's top news headline and answer in one sentence.";

/// Determines capabilities for a pair the whitelist does not cover
///
/// Probes never fail: anything that goes wrong is folded into a record with
/// `supports_*` set to false and `source` set to probed.
#[async_trait]
pub trait CapabilityProbe: Send + Sync {
    /// Probe one provider/model pair
    async fn probe(&self, provider_id: &str, model_id: &str) -> CapabilityRecord;
}

/// Probe that sends a minimal grounded request and validates the reply
pub struct LiveProbe {
    transport: Arc<dyn Transport>,
}

impl LiveProbe {
    /// Create a probe over a transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    fn optimistic(provider_id: &str, model_id: &str) -> CapabilityRecord {
        CapabilityRecord {
            provider_id: provider_id.to_string(),
            model_id: model_id.to_string(),
            supports_web_search: true,
            supports_reasoning: true,
            per_call_tool: true,
            max_output_tokens: 1024,
            source: CapabilitySource::Probed,
        }
    }
}

#[async_trait]
impl CapabilityProbe for LiveProbe {
    async fn probe(&self, provider_id: &str, model_id: &str) -> CapabilityRecord {
        let unsupported = CapabilityRecord::probed(provider_id, model_id, false, false);

        let request = CanonicalRequest::new(
            provider_id,
            model_id,
            "You are a capability probe.",
            PROBE_PROMPT,
        )
        .with_max_results(1)
        .with_reasoning_level(ReasoningLevel::Low);

        let payload = match adapter_for(provider_id, model_id)
            .and_then(|adapter| adapter.translate(&request, &Self::optimistic(provider_id, model_id)))
        {
            Ok(payload) => payload,
            Err(e) => {
                debug!(provider = provider_id, model = model_id, error = %e, "probe payload not buildable");
                return unsupported;
            }
        };

        let raw = match self.transport.send(payload).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(provider = provider_id, model = model_id, error = %e, "capability probe failed");
                return unsupported;
            }
        };

        let (web_search, reasoning) = match validate_response(&raw) {
            ValidationOutcome::Accepted { .. } => (true, true),
            ValidationOutcome::RejectedNoReasoning => (true, false),
            ValidationOutcome::RejectedNoTool
            | ValidationOutcome::ProviderError { .. }
            | ValidationOutcome::TransportError { .. } => (false, false),
        };
        debug!(provider = provider_id, model = model_id, web_search, reasoning, "probe verdict");

        CapabilityRecord::probed(provider_id, model_id, web_search, reasoning)
    }
}
