//! Trait for audit storage backends

use crate::error::Result;
use crate::record::{AuditBundle, AuditRecord};
use uuid::Uuid;

/// Trait for audit storage backends
///
/// This trait allows different storage implementations (filesystem,
/// in-memory) to be used interchangeably.
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a bundle and return the record with its references filled in
    ///
    /// Fails with `AlreadyExists` rather than replacing a record.
    async fn persist(&self, bundle: AuditBundle) -> Result<AuditRecord>;

    /// Load a record by ID
    async fn load(&self, id: Uuid) -> Result<AuditRecord>;

    /// Raw reply body of a record, byte for byte
    async fn raw_response(&self, id: Uuid) -> Result<Vec<u8>>;

    /// Get the audit store name (for logging)
    fn name(&self) -> &str;
}
