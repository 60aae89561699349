//! Transport configuration

use crate::capability::canonical_provider;
use crate::util::mask_api_key;
use std::fmt;
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// OpenAI API base URL
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Gemini API base URL
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// OpenRouter API base URL
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default OpenRouter attribution title
pub const DEFAULT_APP_NAME: &str = "PromptForge";

// ============================================================================
// Endpoints
// ============================================================================

/// How to reach one provider
#[derive(Clone)]
pub struct ProviderEndpoint {
    /// API key
    pub api_key: String,
    /// Base URL without trailing slash
    pub base_url: String,
    /// App name (OpenRouter attribution)
    pub app_name: Option<String>,
    /// Site URL (OpenRouter attribution)
    pub site_url: Option<String>,
}

impl fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("app_name", &self.app_name)
            .field("site_url", &self.site_url)
            .finish()
    }
}

impl ProviderEndpoint {
    /// Create an endpoint
    #[must_use]
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_name: None,
            site_url: None,
        }
    }

    /// Set the app name
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Set the site URL
    #[must_use]
    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = Some(site_url.into());
        self
    }

    /// Join the base URL and an endpoint path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Endpoints for every provider family
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    /// OpenAI
    pub openai: Option<ProviderEndpoint>,
    /// Google Gemini
    pub google: Option<ProviderEndpoint>,
    /// OpenRouter
    pub openrouter: Option<ProviderEndpoint>,
}

impl Endpoints {
    /// Read endpoints from environment variables
    ///
    /// A provider is configured when its API key variable is set and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read endpoints through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let openai = var("OPENAI_API_KEY").map(|key| {
            ProviderEndpoint::new(
                key,
                var("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            )
        });

        let google = var("GOOGLE_API_KEY").or_else(|| var("GEMINI_API_KEY")).map(|key| {
            ProviderEndpoint::new(
                key,
                var("GEMINI_BASE_URL").unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            )
        });

        let openrouter = var("OPENROUTER_API_KEY").map(|key| {
            let mut endpoint = ProviderEndpoint::new(
                key,
                var("OPENROUTER_BASE_URL").unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
            )
            .with_app_name(var("OPENROUTER_APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()));
            if let Some(site_url) = var("OPENROUTER_SITE_URL") {
                endpoint = endpoint.with_site_url(site_url);
            }
            endpoint
        });

        Self {
            openai,
            google,
            openrouter,
        }
    }

    /// Set the OpenAI endpoint
    #[must_use]
    pub fn with_openai(mut self, endpoint: ProviderEndpoint) -> Self {
        self.openai = Some(endpoint);
        self
    }

    /// Set the Gemini endpoint
    #[must_use]
    pub fn with_google(mut self, endpoint: ProviderEndpoint) -> Self {
        self.google = Some(endpoint);
        self
    }

    /// Set the OpenRouter endpoint
    #[must_use]
    pub fn with_openrouter(mut self, endpoint: ProviderEndpoint) -> Self {
        self.openrouter = Some(endpoint);
        self
    }

    /// Endpoint for a provider id
    pub fn get(&self, provider_id: &str) -> Option<&ProviderEndpoint> {
        match canonical_provider(provider_id).as_str() {
            "openai" => self.openai.as_ref(),
            "google" => self.google.as_ref(),
            "openrouter" => self.openrouter.as_ref(),
            _ => None,
        }
    }

    /// Provider ids with an endpoint
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.openai.is_some() {
            names.push("openai");
        }
        if self.google.is_some() {
            names.push("google");
        }
        if self.openrouter.is_some() {
            names.push("openrouter");
        }
        names
    }
}

// ============================================================================
// Retry policy
// ============================================================================

/// Timeout and retry settings
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    /// Per-call timeout
    pub timeout: Duration,
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
    /// Delay growth factor
    pub multiplier: f64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl TransportConfig {
    /// Set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the attempt budget
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the backoff bounds
    #[must_use]
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }

    /// Upper bound on one `send`: every attempt timing out, with the longest
    /// delay between each
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_attempts.max(1);
        self.timeout * attempts + self.max_backoff * (attempts - 1)
    }
}
