//! Audit writer - builds records and hands them to a store

use super::traits::AuditStore;
use crate::error::Result;
use crate::record::{AuditBundle, AuditRecord};
use chrono::{DateTime, Utc};
use promptforge_llm::{RawResponse, RequestSummary, TokenUsage, ValidationOutcome};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Inputs for one audit record
#[derive(Debug)]
pub struct AuditEntry<'a> {
    request: RequestSummary,
    response: Option<&'a RawResponse>,
    outcome: &'a ValidationOutcome,
    model: Option<String>,
    attempts: Option<u32>,
    detail: Option<String>,
    usage: Option<TokenUsage>,
    cost_usd: Option<f64>,
    started_at: DateTime<Utc>,
}

impl<'a> AuditEntry<'a> {
    /// Entry for a verdict; `response` is `None` when nothing arrived
    pub fn new(
        request: RequestSummary,
        response: Option<&'a RawResponse>,
        outcome: &'a ValidationOutcome,
    ) -> Self {
        Self {
            request,
            response,
            outcome,
            model: None,
            attempts: None,
            detail: None,
            usage: None,
            cost_usd: None,
            started_at: Utc::now(),
        }
    }

    /// Model id as actually sent, when it differs from the request
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Send attempts, for failures that produced no reply
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Attach a detail note
    #[must_use]
    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Attach token usage and cost
    #[must_use]
    pub fn with_usage(mut self, usage: Option<TokenUsage>, cost_usd: Option<f64>) -> Self {
        self.usage = usage;
        self.cost_usd = cost_usd;
        self
    }

    /// Set the request start time
    #[must_use]
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }
}

/// Writes one record per request, whatever the verdict
#[derive(Clone)]
pub struct AuditWriter {
    store: Arc<dyn AuditStore>,
}

impl std::fmt::Debug for AuditWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditWriter")
            .field("store", &self.store.name())
            .finish()
    }
}

impl AuditWriter {
    /// Create a writer over a store
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Persist the raw reply, the verdict and, on acceptance, the artifacts
    #[instrument(skip_all, fields(outcome = %entry.outcome.tag(), store = self.store.name()))]
    pub async fn record(&self, entry: AuditEntry<'_>) -> Result<AuditRecord> {
        let (reasoning, sources) = match entry.outcome {
            ValidationOutcome::Accepted {
                reasoning_text,
                sources,
            } => (Some(reasoning_text.clone()), Some(sources.clone())),
            _ => (None, None),
        };

        let record = AuditRecord {
            id: Uuid::new_v4(),
            provider: entry.request.provider_id.clone(),
            model: entry
                .model
                .unwrap_or_else(|| entry.request.model_id.clone()),
            request: entry.request,
            outcome: entry.outcome.tag(),
            detail: entry.detail,
            http_status: entry.response.map(|r| r.status),
            attempts: entry
                .attempts
                .or_else(|| entry.response.map(|r| r.attempts))
                .unwrap_or(0),
            raw_response_ref: String::new(),
            record_ref: String::new(),
            artifacts: None,
            usage: entry.usage,
            cost_usd: entry.cost_usd,
            started_at: entry.started_at,
            finished_at: Utc::now(),
        };

        let bundle = AuditBundle {
            record,
            raw_body: entry
                .response
                .map(|r| r.body_bytes().to_vec())
                .unwrap_or_default(),
            raw_headers: entry
                .response
                .map(RawResponse::redacted_headers)
                .unwrap_or_default(),
            reasoning,
            sources,
        };

        let record = self.store.persist(bundle).await?;
        info!(
            audit_id = %record.id,
            provider = %record.provider,
            model = %record.model,
            reference = %record.record_ref,
            "audit record written"
        );
        Ok(record)
    }
}
