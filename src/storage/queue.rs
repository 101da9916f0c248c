//! Pending-queue persistence
//!
//! URLs that were discovered but not crawled when a run ended are written as a
//! JSON array of normalized URL strings so the next run can resume from them.

use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::write_atomic;
use crate::url::normalize_url;
use std::path::{Path, PathBuf};
use url::Url;

/// The on-disk pending queue
pub struct PendingQueue {
    path: PathBuf,
}

impl PendingQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the queue; a missing file is an empty queue
    ///
    /// Entries that no longer parse as crawlable URLs are skipped.
    pub fn load(&self) -> StorageResult<Vec<Url>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::Load {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };

        let entries: Vec<String> = serde_json::from_str(&data).map_err(|e| StorageError::Load {
            path: self.path.clone(),
            message: format!("corrupt pending queue: {}", e),
        })?;

        Ok(entries
            .iter()
            .filter_map(|entry| match normalize_url(entry) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!("Dropping queued entry {}: {}", entry, e);
                    None
                }
            })
            .collect())
    }

    /// Replaces the queue with `urls`, in order
    pub fn save(&self, urls: &[Url]) -> StorageResult<()> {
        let entries: Vec<&str> = urls.iter().map(Url::as_str).collect();
        let json = serde_json::to_string_pretty(&entries)?;
        write_atomic(&self.path, json.as_bytes())?;
        tracing::info!(
            "Saved {} pending URLs to {}",
            urls.len(),
            self.path.display()
        );
        Ok(())
    }
}
