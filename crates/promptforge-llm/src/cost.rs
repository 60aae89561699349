//! Cost - token usage and pricing
//!
//! Usage is read from whatever the provider reports (`usage` with
//! `input_tokens`/`output_tokens` or `prompt_tokens`/`completion_tokens`,
//! Gemini `usageMetadata`). Prices are per 1M tokens in USD and come from a
//! built-in table, optionally replaced by a JSON pricing index.

use crate::capability::{canonical_provider, normalize_model};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

// ============================================================================
// Token usage
// ============================================================================

/// Token counts reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub input_tokens: u32,
    /// Generated tokens, reasoning included
    pub output_tokens: u32,
    /// Reasoning tokens, when broken out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
}

impl TokenUsage {
    /// Read usage from a response object
    pub fn from_response(obj: &Map<String, Value>) -> Option<Self> {
        let count = |map: &Value, key: &str| {
            map.get(key)
                .and_then(Value::as_u64)
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        };

        if let Some(usage) = obj.get("usage").filter(|u| u.is_object()) {
            let input = count(usage, "input_tokens").or_else(|| count(usage, "prompt_tokens"));
            let output =
                count(usage, "output_tokens").or_else(|| count(usage, "completion_tokens"));
            let reasoning = usage
                .get("output_tokens_details")
                .or_else(|| usage.get("completion_tokens_details"))
                .and_then(|d| count(d, "reasoning_tokens"));
            if input.is_some() || output.is_some() {
                return Some(Self {
                    input_tokens: input.unwrap_or(0),
                    output_tokens: output.unwrap_or(0),
                    reasoning_tokens: reasoning,
                });
            }
        }

        let metadata = obj.get("usageMetadata").filter(|u| u.is_object())?;
        let input = count(metadata, "promptTokenCount");
        let candidates = count(metadata, "candidatesTokenCount");
        let thoughts = count(metadata, "thoughtsTokenCount");
        if input.is_none() && candidates.is_none() {
            return None;
        }
        Some(Self {
            input_tokens: input.unwrap_or(0),
            output_tokens: candidates.unwrap_or(0).saturating_add(thoughts.unwrap_or(0)),
            reasoning_tokens: thoughts,
        })
    }
}

// ============================================================================
// Pricing
// ============================================================================

/// Price of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Provider id
    pub provider: String,
    /// Model id or family prefix
    pub model: String,
    /// Cost per 1M input tokens (USD)
    #[serde(rename = "input_price_per_million_usd")]
    pub input_cost_per_million: f64,
    /// Cost per 1M output tokens (USD)
    #[serde(rename = "output_price_per_million_usd")]
    pub output_cost_per_million: f64,
}

impl ModelPricing {
    fn new(provider: &str, model: &str, input: f64, output: f64) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            input_cost_per_million: input,
            output_cost_per_million: output,
        }
    }

    /// Calculate cost for given usage
    #[must_use]
    pub fn calculate_cost(&self, usage: &TokenUsage) -> f64 {
        let input_cost = (f64::from(usage.input_tokens) / 1_000_000.0) * self.input_cost_per_million;
        let output_cost =
            (f64::from(usage.output_tokens) / 1_000_000.0) * self.output_cost_per_million;
        input_cost + output_cost
    }
}

/// Pricing lookup by provider and model
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    entries: Vec<ModelPricing>,
}

impl PricingTable {
    /// Built-in prices for the whitelisted models
    #[must_use]
    pub fn builtin() -> Self {
        let entries = vec![
            ModelPricing::new("openai", "gpt-5", 1.25, 10.00),
            ModelPricing::new("openai", "gpt-5-mini", 0.25, 2.00),
            ModelPricing::new("openai", "gpt-5-nano", 0.05, 0.40),
            ModelPricing::new("openai", "o3", 2.00, 8.00),
            ModelPricing::new("openai", "o4-mini", 1.10, 4.40),
            ModelPricing::new("openai", "o3-deep-research", 10.00, 40.00),
            ModelPricing::new("openai", "o4-mini-deep-research", 2.00, 8.00),
            ModelPricing::new("openai", "gpt-4.1", 2.00, 8.00),
            ModelPricing::new("openai", "gpt-4o", 2.50, 10.00),
            ModelPricing::new("google", "gemini-2.5-pro", 1.25, 10.00),
            ModelPricing::new("google", "gemini-2.5-flash", 0.30, 2.50),
            ModelPricing::new("google", "gemini-2.5-flash-lite", 0.10, 0.40),
            ModelPricing::new("google", "gemini-2.0-flash", 0.10, 0.40),
            ModelPricing::new("anthropic", "claude-sonnet-4", 3.00, 15.00),
            ModelPricing::new("x-ai", "grok-4", 3.00, 15.00),
            ModelPricing::new("deepseek", "deepseek-r1", 0.55, 2.19),
        ];
        Self { entries }
    }

    /// Table from explicit entries
    #[must_use]
    pub fn from_entries(entries: Vec<ModelPricing>) -> Self {
        Self { entries }
    }

    /// Load a JSON pricing index
    ///
    /// The file is an array of
    /// `{provider, model, input_price_per_million_usd, output_price_per_million_usd}`.
    pub fn load_index(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Pricing(format!("failed to read {}: {e}", path.display())))?;
        let entries: Vec<ModelPricing> = serde_json::from_str(&content)
            .map_err(|e| Error::Pricing(format!("invalid pricing index {}: {e}", path.display())))?;
        Ok(Self { entries })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Price for a pair
    ///
    /// OpenRouter slugs (`vendor/model`) fall back to the vendor's own entry.
    /// Longest model prefix wins, as for the capability whitelist.
    pub fn lookup(&self, provider_id: &str, model_id: &str) -> Option<&ModelPricing> {
        let provider = canonical_provider(provider_id);
        let model = normalize_model(model_id);

        self.find(&provider, &model).or_else(|| {
            let (vendor, bare) = model.split_once('/')?;
            self.find(&canonical_provider(vendor), bare)
        })
    }

    fn find(&self, provider: &str, model: &str) -> Option<&ModelPricing> {
        self.entries
            .iter()
            .filter(|e| canonical_provider(&e.provider) == provider)
            .filter(|e| {
                let prefix = e.model.to_lowercase();
                model == prefix
                    || model
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            })
            .max_by_key(|e| e.model.len())
    }

    /// Cost in USD, when the pair is priced
    pub fn cost(&self, provider_id: &str, model_id: &str, usage: &TokenUsage) -> Option<f64> {
        self.lookup(provider_id, model_id)
            .map(|pricing| pricing.calculate_cost(usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn usage_of(value: Value) -> Option<TokenUsage> {
        TokenUsage::from_response(value.as_object().unwrap())
    }

    #[test]
    fn test_usage_responses_shape() {
        let usage = usage_of(json!({
            "usage": {
                "input_tokens": 120,
                "output_tokens": 900,
                "output_tokens_details": {"reasoning_tokens": 640}
            }
        }))
        .unwrap();
        assert_eq!(usage.input_tokens, 120);
        assert_eq!(usage.output_tokens, 900);
        assert_eq!(usage.reasoning_tokens, Some(640));
    }

    #[test]
    fn test_usage_chat_shape() {
        let usage = usage_of(json!({
            "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
        }))
        .unwrap();
        assert_eq!(usage.input_tokens, 10);
        assert_eq!(usage.output_tokens, 20);
        assert_eq!(usage.reasoning_tokens, None);
    }

    #[test]
    fn test_usage_gemini_shape() {
        let usage = usage_of(json!({
            "usageMetadata": {
                "promptTokenCount": 50,
                "candidatesTokenCount": 200,
                "thoughtsTokenCount": 300
            }
        }))
        .unwrap();
        assert_eq!(usage.input_tokens, 50);
        assert_eq!(usage.output_tokens, 500);
        assert_eq!(usage.reasoning_tokens, Some(300));
    }

    #[test]
    fn test_usage_absent() {
        assert!(usage_of(json!({"output": []})).is_none());
        assert!(usage_of(json!({"usage": {}})).is_none());
    }

    #[test]
    fn test_builtin_lookup_prefers_longest_prefix() {
        let table = PricingTable::builtin();
        let mini = table.lookup("openai", "gpt-5-mini-2025-08-07").unwrap();
        assert_eq!(mini.model, "gpt-5-mini");
        let base = table.lookup("openai", "gpt-5-2025-08-07").unwrap();
        assert_eq!(base.model, "gpt-5");
        assert!(table.lookup("openai", "davinci").is_none());
    }

    #[test]
    fn test_openrouter_falls_back_to_vendor_price() {
        let table = PricingTable::builtin();
        let pricing = table.lookup("openrouter", "openai/gpt-5:online").unwrap();
        assert_eq!(pricing.provider, "openai");
        assert_eq!(pricing.model, "gpt-5");
    }

    #[test]
    fn test_cost_calculation() {
        let table = PricingTable::builtin();
        let usage = TokenUsage {
            input_tokens: 1_000_000,
            output_tokens: 100_000,
            reasoning_tokens: None,
        };
        let cost = table.cost("google", "gemini-2.5-pro", &usage).unwrap();
        assert!((cost - 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_load_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pricing.json");
        std::fs::write(
            &path,
            r#"[{"provider":"openai","model":"gpt-5","input_price_per_million_usd":2.0,"output_price_per_million_usd":4.0}]"#,
        )
        .unwrap();

        let table = PricingTable::load_index(&path).unwrap();
        assert_eq!(table.len(), 1);
        let usage = TokenUsage {
            input_tokens: 500_000,
            output_tokens: 500_000,
            reasoning_tokens: None,
        };
        assert!((table.cost("openai", "gpt-5", &usage).unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_index_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pricing.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PricingTable::load_index(&path),
            Err(Error::Pricing(_))
        ));
    }
}
