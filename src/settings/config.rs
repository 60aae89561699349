//! Application configuration types
//!
//! Mirrors `config/default.toml`. Every section has serde defaults so a
//! partial override file is enough.

use promptforge_llm::request::{DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_PROMPT};
use promptforge_llm::{ReasoningLevel, TransportConfig};
use promptforge_replay::default_audit_dir;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub grounding: GroundingSettings,
    #[serde(default)]
    pub transport: TransportSettings,
    #[serde(default)]
    pub capability: CapabilitySettings,
    #[serde(default)]
    pub audit: AuditSettings,
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub pricing: PricingSettings,
}

/// Default provider and model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider")]
    pub id: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            id: default_provider(),
            model: default_model(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-5".to_string()
}

/// Search and reasoning knobs copied into every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingSettings {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_search_prompt")]
    pub search_prompt: String,
    #[serde(default)]
    pub reasoning_level: ReasoningLevel,
}

impl Default for GroundingSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            search_prompt: default_search_prompt(),
            reasoning_level: ReasoningLevel::default(),
        }
    }
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

fn default_search_prompt() -> String {
    DEFAULT_SEARCH_PROMPT.to_string()
}

/// Timeout, retry and deadline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// 0 disables the caller deadline
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl TransportSettings {
    /// Transport client settings
    pub fn to_transport_config(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_attempts(self.max_attempts)
            .with_backoff(
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
    }

    /// Caller deadline, if enabled
    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }
}

fn default_timeout_secs() -> u64 {
    600
}
fn default_max_attempts() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    1000
}
fn default_max_backoff_ms() -> u64 {
    30_000
}
fn default_deadline_secs() -> u64 {
    1860
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilitySettings {
    #[serde(default)]
    pub probe_enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Empty means the default data directory
    #[serde(default)]
    pub dir: String,
}

impl AuditSettings {
    /// Resolved audit directory
    pub fn dir(&self) -> PathBuf {
        if self.dir.trim().is_empty() {
            default_audit_dir()
        } else {
            PathBuf::from(self.dir.trim())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_max_concurrent() -> usize {
    4
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Optional JSON pricing index replacing the built-in table
    #[serde(default)]
    pub index: Option<PathBuf>,
}
