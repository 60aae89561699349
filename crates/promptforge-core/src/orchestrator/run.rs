//! Running requests end to end

use chrono::Utc;
use futures::stream::{self, StreamExt};
use promptforge_llm::util::truncate_chars;
use promptforge_llm::validate::scan;
use promptforge_llm::{
    adapter_for, validate, CanonicalRequest, GroundingMechanism, ProviderPayload, SendResult,
    TransportError, TransportErrorKind, ValidationOutcome,
};
use promptforge_replay::AuditEntry;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{info, instrument, warn};

use super::core::GroundingOrchestrator;
use super::types::GroundedResult;
use crate::error::{ErrorKind, GroundingError, Result};

impl GroundingOrchestrator {
    /// Run one canonical request
    ///
    /// Capability and translation failures return before any network call and
    /// leave no audit record. Everything after that point is audited exactly
    /// once, and only an accepted verdict yields a [`GroundedResult`].
    #[instrument(
        skip(self, request),
        fields(provider = %request.provider_id(), model = %request.model_id())
    )]
    pub async fn run(&self, request: CanonicalRequest) -> Result<GroundedResult> {
        let capability = self
            .registry
            .resolve(request.provider_id(), request.model_id())
            .await?;
        let adapter = adapter_for(request.provider_id(), request.model_id())?;
        let payload = adapter.translate(&request, &capability)?;

        let mechanism = payload.mechanism().clone();
        let provider = payload.provider_id().to_string();
        let model_sent = payload.model().to_string();
        let summary = request.summary().with_mechanism(mechanism.to_string());
        let started_at = Utc::now();

        let sent = self.send(payload).await;
        let outcome = validate(&sent);

        let evidence = sent.as_ref().ok().and_then(|raw| raw.json()).map(|json| scan(&json));
        let usage = evidence.as_ref().and_then(|e| e.usage);
        let cost_usd = usage
            .as_ref()
            .and_then(|u| self.pricing.cost(&provider, request.model_id(), u));
        let attempts = match &sent {
            Ok(raw) => raw.attempts,
            Err(e) => e.attempts,
        };
        let detail = outcome_detail(&outcome, &mechanism);

        let entry = AuditEntry::new(summary, sent.as_ref().ok(), &outcome)
            .with_model(model_sent)
            .with_attempts(attempts)
            .with_detail(detail.clone())
            .with_usage(usage, cost_usd)
            .with_started_at(started_at);
        let record = self.audit.record(entry).await?;
        let reference = record.reference().to_string();

        match outcome {
            ValidationOutcome::Accepted {
                reasoning_text,
                sources,
            } => {
                info!(
                    audit_id = %record.id,
                    sources = sources.len(),
                    attempts,
                    "grounded response accepted"
                );
                Ok(GroundedResult {
                    text: evidence.map(|e| e.answer_text()).unwrap_or_default(),
                    sources,
                    reasoning_excerpt: truncate_chars(
                        &reasoning_text,
                        self.config.reasoning_excerpt_chars,
                    ),
                    audit_reference: reference,
                    usage,
                    cost_usd,
                })
            }
            rejected => {
                let kind = ErrorKind::from_outcome(&rejected).unwrap_or(ErrorKind::Provider);
                let detail = detail.unwrap_or_else(|| rejected.tag().to_string());
                warn!(
                    audit_id = %record.id,
                    outcome = %rejected.tag(),
                    attempts,
                    reference = %reference,
                    "grounded response rejected"
                );
                Err(GroundingError::new(kind, detail).with_audit_reference(reference))
            }
        }
    }

    /// Run independent requests with at most `max_concurrent` in flight
    ///
    /// Results come back in completion order, each tagged with its key.
    pub async fn run_batch<K>(
        &self,
        jobs: Vec<(K, CanonicalRequest)>,
        max_concurrent: usize,
    ) -> Vec<(K, Result<GroundedResult>)> {
        info!(jobs = jobs.len(), max_concurrent, "starting batch");
        stream::iter(jobs)
            .map(|(key, request)| async move { (key, self.run(request).await) })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await
    }

    async fn send(&self, payload: ProviderPayload) -> SendResult {
        let Some(deadline) = self.config.deadline else {
            return self.transport.send(payload).await;
        };

        let attempts = AtomicU32::new(0);
        let sent = tokio::time::timeout(deadline, self.transport.send_counted(payload, &attempts));
        match sent.await {
            Ok(result) => result,
            Err(_) => Err(TransportError::new(
                TransportErrorKind::Deadline,
                format!("no verdict within {}s", deadline.as_secs_f64()),
                attempts.load(Ordering::Relaxed).max(1),
            )),
        }
    }
}

fn outcome_detail(outcome: &ValidationOutcome, mechanism: &GroundingMechanism) -> Option<String> {
    match outcome {
        ValidationOutcome::Accepted { .. } => None,
        ValidationOutcome::RejectedNoTool => Some(format!(
            "no tool-usage evidence for requested {mechanism}; the provider may have declined \
             the tool or an intermediary may have dropped the parameter, which cannot be \
             told apart client-side"
        )),
        ValidationOutcome::RejectedNoReasoning => Some(format!(
            "tool evidence present for {mechanism} but no reasoning was returned"
        )),
        ValidationOutcome::ProviderError { detail } | ValidationOutcome::TransportError { detail } => {
            Some(detail.clone())
        }
    }
}
