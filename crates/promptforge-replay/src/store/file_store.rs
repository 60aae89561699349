//! Filesystem audit store
//!
//! Layout per record:
//!
//! ```text
//! <root>/<YYYYMMDDTHHMMSSZ>-<uuid>/
//!     record.json
//!     response.raw
//!     response.headers.json
//!     reasoning.md       (accepted only)
//!     sources.json       (accepted only)
//! ```

use super::helpers::record_dir_name;
use super::traits::AuditStore;
use crate::error::{Error, Result};
use crate::record::{ArtifactRefs, AuditBundle, AuditRecord};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use uuid::Uuid;

const RECORD_FILE: &str = "record.json";
const RAW_FILE: &str = "response.raw";
const HEADERS_FILE: &str = "response.headers.json";
const REASONING_FILE: &str = "reasoning.md";
const SOURCES_FILE: &str = "sources.json";

/// Audit store writing one directory per record
#[derive(Debug, Clone)]
pub struct FileAuditStore {
    root: PathBuf,
}

impl FileAuditStore {
    /// Store rooted at a directory (created on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_new(path: &Path, contents: &[u8]) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| io_error(path, e))?;
        file.write_all(contents)
            .await
            .map_err(|e| io_error(path, e))?;
        file.flush().await.map_err(|e| io_error(path, e))
    }

    /// Directory holding a record
    async fn find_dir(&self, id: Uuid) -> Result<PathBuf> {
        let suffix = format!("-{id}");
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.root, e))?
        {
            if entry.file_name().to_string_lossy().ends_with(&suffix) {
                return Ok(entry.path());
            }
        }
        Err(Error::NotFound(id.to_string()))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::AlreadyExists => Error::AlreadyExists(path.display().to_string()),
        ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(format!("{}: {e}", path.display())),
    }
}

#[async_trait::async_trait]
impl AuditStore for FileAuditStore {
    #[instrument(skip(self, bundle), fields(audit_id = %bundle.record.id))]
    async fn persist(&self, bundle: AuditBundle) -> Result<AuditRecord> {
        let AuditBundle {
            mut record,
            raw_body,
            raw_headers,
            reasoning,
            sources,
        } = bundle;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;
        let dir = self.root.join(record_dir_name(record.started_at, record.id));
        tokio::fs::create_dir(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;

        let raw_path = dir.join(RAW_FILE);
        Self::write_new(&raw_path, &raw_body).await?;
        Self::write_new(
            &dir.join(HEADERS_FILE),
            &serde_json::to_vec_pretty(&raw_headers)?,
        )
        .await?;
        record.raw_response_ref = raw_path.display().to_string();

        if let (Some(reasoning), Some(sources)) = (reasoning, sources) {
            let reasoning_path = dir.join(REASONING_FILE);
            let sources_path = dir.join(SOURCES_FILE);
            Self::write_new(&reasoning_path, reasoning.as_bytes()).await?;
            Self::write_new(&sources_path, &serde_json::to_vec_pretty(&sources)?).await?;
            record.artifacts = Some(ArtifactRefs {
                reasoning: reasoning_path.display().to_string(),
                sources: sources_path.display().to_string(),
                source_count: sources.len(),
            });
        }

        let record_path = dir.join(RECORD_FILE);
        record.record_ref = record_path.display().to_string();
        Self::write_new(&record_path, &serde_json::to_vec_pretty(&record)?).await?;

        debug!(path = %record_path.display(), "audit record written");
        Ok(record)
    }

    async fn load(&self, id: Uuid) -> Result<AuditRecord> {
        let path = self.find_dir(id).await?.join(RECORD_FILE);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn raw_response(&self, id: Uuid) -> Result<Vec<u8>> {
        let path = self.find_dir(id).await?.join(RAW_FILE);
        tokio::fs::read(&path)
            .await
            .map_err(|e| io_error(&path, e))
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}
