//! Static capability whitelist
//!
//! Seeded from published provider documentation. Bump [`WHITELIST_VERSION`]
//! whenever a row changes; the version is written into every audit record.

/// Whitelist revision
pub const WHITELIST_VERSION: &str = "2025-09.1";

/// One whitelist row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhitelistEntry {
    /// Canonical provider id
    pub provider: &'static str,
    /// Model id or family prefix, lowercase
    pub model: &'static str,
    /// Provider-side web search available
    pub web_search: bool,
    /// Reasoning output available
    pub reasoning: bool,
    /// Explicit per-call grounding tool accepted
    pub per_call_tool: bool,
    /// Hard output ceiling
    pub max_output_tokens: u32,
}

const fn entry(
    provider: &'static str,
    model: &'static str,
    web_search: bool,
    reasoning: bool,
    per_call_tool: bool,
    max_output_tokens: u32,
) -> WhitelistEntry {
    WhitelistEntry {
        provider,
        model,
        web_search,
        reasoning,
        per_call_tool,
        max_output_tokens,
    }
}

/// Known provider/model capabilities
pub const WHITELIST: &[WhitelistEntry] = &[
    // OpenAI Responses
    entry("openai", "gpt-5", true, true, true, 128_000),
    entry("openai", "gpt-5-mini", true, true, true, 128_000),
    entry("openai", "gpt-5-nano", true, true, true, 128_000),
    entry("openai", "o3", true, true, true, 100_000),
    entry("openai", "o4-mini", true, true, true, 100_000),
    entry("openai", "o3-mini", false, true, false, 100_000),
    entry("openai", "o1", false, true, false, 100_000),
    entry("openai", "gpt-4.1", true, false, true, 32_768),
    entry("openai", "gpt-4o", true, false, true, 16_384),
    entry("openai", "gpt-4o-search-preview", true, false, false, 16_384),
    // OpenAI deep research
    entry("openai", "o3-deep-research", true, true, true, 100_000),
    entry("openai", "o4-mini-deep-research", true, true, true, 100_000),
    // Google Gemini
    entry("google", "gemini-2.5-pro", true, true, true, 65_536),
    entry("google", "gemini-2.5-flash", true, true, true, 65_536),
    entry("google", "gemini-2.5-flash-lite", true, true, true, 65_536),
    entry("google", "gemini-2.0-flash", true, false, true, 8_192),
    entry("google", "gemini-1.5-pro", true, false, false, 8_192),
    entry("google", "gemini-1.5-flash", true, false, false, 8_192),
    // OpenRouter
    entry("openrouter", "openai/gpt-5", true, true, true, 128_000),
    entry("openrouter", "openai/gpt-5-mini", true, true, true, 128_000),
    entry("openrouter", "openai/o4-mini", true, true, true, 100_000),
    entry("openrouter", "google/gemini-2.5-pro", true, true, true, 65_536),
    entry("openrouter", "google/gemini-2.5-flash", true, true, true, 65_536),
    entry("openrouter", "anthropic/claude-sonnet-4", true, true, true, 64_000),
    entry("openrouter", "x-ai/grok-4", true, true, true, 32_768),
    entry("openrouter", "deepseek/deepseek-r1", true, true, false, 32_768),
    entry("openrouter", "openai/gpt-4o-mini", true, false, true, 16_384),
];

/// Canonical provider id (`gemini` is accepted for `google`)
#[must_use]
pub fn canonical_provider(provider_id: &str) -> String {
    let lower = provider_id.trim().to_lowercase();
    match lower.as_str() {
        "gemini" | "googleai" | "google-ai" => "google".to_string(),
        _ => lower,
    }
}

/// Lower-case a model id and strip any `:variant` suffix
#[must_use]
pub fn normalize_model(model_id: &str) -> String {
    let lower = model_id.trim().to_lowercase();
    match lower.split_once(':') {
        Some((base, _)) => base.to_string(),
        None => lower,
    }
}

/// Find the whitelist row for a pair
///
/// Matches exactly or by dated-revision prefix (`gpt-5-2025-08-07` matches
/// `gpt-5`); the longest matching prefix wins.
#[must_use]
pub fn lookup(provider_id: &str, model_id: &str) -> Option<&'static WhitelistEntry> {
    let provider = canonical_provider(provider_id);
    let model = normalize_model(model_id);

    WHITELIST
        .iter()
        .filter(|e| e.provider == provider)
        .filter(|e| {
            model == e.model
                || model
                    .strip_prefix(e.model)
                    .is_some_and(|rest| rest.starts_with('-'))
        })
        .max_by_key(|e| e.model.len())
}
