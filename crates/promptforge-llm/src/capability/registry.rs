//! Capability registry with single-flight probing

use super::probe::CapabilityProbe;
use super::whitelist::{canonical_provider, lookup, normalize_model};
use super::CapabilityRecord;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

type ProbeKey = (String, String);

/// Resolves capability records for provider/model pairs
///
/// The whitelist always wins. Pairs it does not cover are probed at most once
/// per process: concurrent callers for the same key share one in-flight probe
/// and every caller receives the same record. Cached records are never
/// replaced.
pub struct CapabilityRegistry {
    probe: Option<Arc<dyn CapabilityProbe>>,
    probed: Mutex<HashMap<ProbeKey, Arc<OnceCell<CapabilityRecord>>>>,
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("probe_enabled", &self.probe.is_some())
            .field("cached", &self.cached_len())
            .finish()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    /// Whitelist-only registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: None,
            probed: Mutex::new(HashMap::new()),
        }
    }

    /// Registry that falls back to a live probe
    #[must_use]
    pub fn with_probe(probe: Arc<dyn CapabilityProbe>) -> Self {
        Self {
            probe: Some(probe),
            probed: Mutex::new(HashMap::new()),
        }
    }

    /// Whether a live probe is configured
    pub fn probe_enabled(&self) -> bool {
        self.probe.is_some()
    }

    /// Resolve the capability record for a pair
    #[instrument(skip(self), fields(source))]
    pub async fn resolve(&self, provider_id: &str, model_id: &str) -> Result<CapabilityRecord> {
        if provider_id.trim().is_empty() || model_id.trim().is_empty() {
            return Err(Error::Translation(
                "provider_id and model_id must be non-empty".to_string(),
            ));
        }

        if let Some(entry) = lookup(provider_id, model_id) {
            tracing::Span::current().record("source", "whitelist");
            return Ok(CapabilityRecord::from_whitelist(
                provider_id,
                model_id,
                entry,
            ));
        }

        let Some(probe) = self.probe.as_ref() else {
            tracing::Span::current().record("source", "unknown");
            debug!("pair not whitelisted and probing disabled");
            return Ok(CapabilityRecord::unknown(provider_id, model_id));
        };

        let cell = {
            let mut probed = self.probed.lock().unwrap_or_else(|e| e.into_inner());
            probed
                .entry(Self::key(provider_id, model_id))
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let record = cell
            .get_or_init(|| async {
                info!("probing capability");
                probe.probe(provider_id, model_id).await
            })
            .await;
        tracing::Span::current().record("source", "probed");

        Ok(record.clone())
    }

    /// Cached probe result, if any
    pub fn cached(&self, provider_id: &str, model_id: &str) -> Option<CapabilityRecord> {
        let probed = self.probed.lock().unwrap_or_else(|e| e.into_inner());
        probed
            .get(&Self::key(provider_id, model_id))
            .and_then(|cell| cell.get().cloned())
    }

    fn cached_len(&self) -> usize {
        let probed = self.probed.lock().unwrap_or_else(|e| e.into_inner());
        probed.values().filter(|cell| cell.initialized()).count()
    }

    fn key(provider_id: &str, model_id: &str) -> ProbeKey {
        (canonical_provider(provider_id), normalize_model(model_id))
    }
}
