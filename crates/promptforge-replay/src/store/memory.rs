//! In-memory audit store for tests and dry runs

use super::traits::AuditStore;
use crate::error::{Error, Result};
use crate::record::{ArtifactRefs, AuditBundle, AuditRecord};
use promptforge_llm::Source;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Stored {
    record: AuditRecord,
    raw_body: Vec<u8>,
    raw_headers: Vec<(String, String)>,
    reasoning: Option<String>,
    sources: Option<Vec<Source>>,
}

/// Audit store keeping everything in a map
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: Mutex<HashMap<Uuid, Stored>>,
}

impl MemoryAuditStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, oldest first
    pub fn records(&self) -> Vec<AuditRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<AuditRecord> = records.values().map(|s| s.record.clone()).collect();
        all.sort_by_key(|r| (r.started_at, r.id));
        all
    }

    /// Persisted reasoning artifact
    pub fn reasoning(&self, id: Uuid) -> Option<String> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.get(&id).and_then(|s| s.reasoning.clone())
    }

    /// Persisted sources artifact
    pub fn sources(&self, id: Uuid) -> Option<Vec<Source>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.get(&id).and_then(|s| s.sources.clone())
    }

    /// Persisted reply headers
    pub fn headers(&self, id: Uuid) -> Option<Vec<(String, String)>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.get(&id).map(|s| s.raw_headers.clone())
    }
}

#[async_trait::async_trait]
impl AuditStore for MemoryAuditStore {
    async fn persist(&self, bundle: AuditBundle) -> Result<AuditRecord> {
        let AuditBundle {
            mut record,
            raw_body,
            raw_headers,
            reasoning,
            sources,
        } = bundle;

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records.contains_key(&record.id) {
            return Err(Error::AlreadyExists(record.id.to_string()));
        }

        let base = format!("memory://{}", record.id);
        record.raw_response_ref = format!("{base}/response.raw");
        record.record_ref = format!("{base}/record.json");
        let (reasoning, sources) = match (reasoning, sources) {
            (Some(reasoning), Some(sources)) => {
                record.artifacts = Some(ArtifactRefs {
                    reasoning: format!("{base}/reasoning.md"),
                    sources: format!("{base}/sources.json"),
                    source_count: sources.len(),
                });
                (Some(reasoning), Some(sources))
            }
            _ => (None, None),
        };

        records.insert(
            record.id,
            Stored {
                record: record.clone(),
                raw_body,
                raw_headers,
                reasoning,
                sources,
            },
        );
        Ok(record)
    }

    async fn load(&self, id: Uuid) -> Result<AuditRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .get(&id)
            .map(|s| s.record.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn raw_response(&self, id: Uuid) -> Result<Vec<u8>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .get(&id)
            .map(|s| s.raw_body.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
