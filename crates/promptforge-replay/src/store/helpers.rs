//! Helper functions for store module

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use uuid::Uuid;

/// Get the default data directory for PromptForge
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".promptforge"))
        .unwrap_or_else(|| PathBuf::from(".promptforge"))
}

/// Get the default audit directory
pub fn default_audit_dir() -> PathBuf {
    default_data_dir().join("audit")
}

/// Directory name for one record: `<YYYYMMDDTHHMMSSZ>-<uuid>`
pub fn record_dir_name(started_at: DateTime<Utc>, id: Uuid) -> String {
    format!("{}-{}", started_at.format("%Y%m%dT%H%M%SZ"), id)
}
