//! Orchestrator core structure
//!
//! Contains the main `GroundingOrchestrator` struct and its builder methods.

use promptforge_llm::{CapabilityRegistry, PricingTable, Transport};
use promptforge_replay::AuditWriter;
use std::fmt;
use std::sync::Arc;

use super::config::OrchestratorConfig;

/// Runs canonical requests through resolve, translate, send, validate and audit
///
/// The only shared state between concurrent runs is the capability registry.
pub struct GroundingOrchestrator {
    pub(crate) registry: Arc<CapabilityRegistry>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) audit: AuditWriter,
    pub(crate) pricing: PricingTable,
    pub(crate) config: OrchestratorConfig,
}

impl fmt::Debug for GroundingOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroundingOrchestrator")
            .field("registry", &self.registry)
            .field("audit", &self.audit)
            .field("pricing_entries", &self.pricing.len())
            .field("config", &self.config)
            .finish()
    }
}

impl GroundingOrchestrator {
    /// Create a new orchestrator with the built-in pricing table
    #[must_use]
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        transport: Arc<dyn Transport>,
        audit: AuditWriter,
    ) -> Self {
        Self {
            registry,
            transport,
            audit,
            pricing: PricingTable::builtin(),
            config: OrchestratorConfig::default(),
        }
    }

    /// Set the configuration
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the pricing table
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// Capability registry in use
    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}
