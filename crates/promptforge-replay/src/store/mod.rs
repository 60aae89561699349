//! Store - append-only audit persistence
//!
//! Every request that reached a provider leaves exactly one record, whatever
//! the verdict. Records are never overwritten: each gets its own UUID-named
//! slot and creating an existing slot fails.

mod file_store;
mod helpers;
mod memory;
mod traits;
mod writer;


pub use file_store::FileAuditStore;
pub use helpers::{default_audit_dir, default_data_dir, record_dir_name};
pub use memory::MemoryAuditStore;
pub use traits::AuditStore;
pub use writer::{AuditEntry, AuditWriter};
