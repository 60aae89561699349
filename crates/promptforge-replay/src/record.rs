//! Audit record schema

use chrono::{DateTime, Utc};
use promptforge_llm::{OutcomeTag, RequestSummary, Source, TokenUsage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// References to artifacts persisted for accepted responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRefs {
    /// Extracted reasoning text
    pub reasoning: String,
    /// Normalized source list
    pub sources: String,
    /// Number of sources
    pub source_count: usize,
}

/// One audited request
///
/// Self-describing JSON: the `outcome` tag, provider, model and timestamps
/// are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record ID
    pub id: Uuid,
    /// What was asked for
    pub request: RequestSummary,
    /// Provider id
    pub provider: String,
    /// Model id as sent
    pub model: String,
    /// Terminal verdict
    pub outcome: OutcomeTag,
    /// Rejection attribution note or error detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// HTTP status, when a reply arrived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Send attempts made
    pub attempts: u32,
    /// Where the raw reply body is stored
    pub raw_response_ref: String,
    /// Where this record is stored
    pub record_ref: String,
    /// Reasoning and sources, for accepted responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactRefs>,
    /// Token usage, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Estimated cost (USD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    /// Request start
    pub started_at: DateTime<Utc>,
    /// Verdict reached
    pub finished_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Reference to hand back to callers
    pub fn reference(&self) -> &str {
        &self.record_ref
    }
}

/// Everything a store persists for one request
#[derive(Debug, Clone)]
pub struct AuditBundle {
    /// Record with store references still empty
    pub record: AuditRecord,
    /// Raw reply body, verbatim (empty when no reply arrived)
    pub raw_body: Vec<u8>,
    /// Reply headers, credentials redacted
    pub raw_headers: Vec<(String, String)>,
    /// Reasoning text, for accepted responses
    pub reasoning: Option<String>,
    /// Sources, for accepted responses
    pub sources: Option<Vec<Source>>,
}
