//! Orchestrator configuration

use std::time::Duration;

/// Default bound on one transport call, retries included. Covers three
/// 600s attempts with 30s between them.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(1860);

/// Default length of the reasoning excerpt handed back to callers
pub const DEFAULT_REASONING_EXCERPT_CHARS: usize = 600;

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Caller deadline for the transport call; `None` waits for the transport
    pub deadline: Option<Duration>,
    /// Maximum characters of reasoning returned in a `GroundedResult`
    pub reasoning_excerpt_chars: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            deadline: Some(DEFAULT_DEADLINE),
            reasoning_excerpt_chars: DEFAULT_REASONING_EXCERPT_CHARS,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transport deadline
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the reasoning excerpt length
    #[must_use]
    pub fn with_reasoning_excerpt_chars(mut self, chars: usize) -> Self {
        self.reasoning_excerpt_chars = chars;
        self
    }
}
