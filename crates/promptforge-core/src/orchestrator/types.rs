//! Orchestrator output types

use promptforge_llm::{Source, TokenUsage};
use serde::Serialize;

/// Output of an accepted run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundedResult {
    /// Answer text
    pub text: String,
    /// Sources the provider cited
    pub sources: Vec<Source>,
    /// Leading part of the reasoning text
    pub reasoning_excerpt: String,
    /// Audit record path
    pub audit_reference: String,
    /// Token usage, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Estimated cost (USD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}
