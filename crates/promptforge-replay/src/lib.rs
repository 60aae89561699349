//! PromptForge Replay - Audit Trail
//!
//! This crate provides the audit system for PromptForge:
//! - Record: AuditRecord schema, one per request that reached a provider
//! - Store: append-only persistence (filesystem, in-memory)
//! - Writer: turns a request summary, raw reply and verdict into a record

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use record::{ArtifactRefs, AuditBundle, AuditRecord};
pub use store::{
    default_audit_dir, default_data_dir, AuditEntry, AuditStore, AuditWriter, FileAuditStore,
    MemoryAuditStore,
};
