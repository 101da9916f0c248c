//! JSON file corpus backend
//!
//! The corpus is a pretty-printed JSON array of chunk records. It is read once,
//! cached, and replaced atomically on every save.

use crate::chunker::Chunk;
use crate::storage::traits::{CorpusStore, StorageError, StorageResult};
use crate::storage::write_atomic;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Corpus stored as a single JSON file
pub struct JsonCorpusStore {
    path: PathBuf,
    cache: Mutex<Option<Arc<Vec<Chunk>>>>,
}

impl JsonCorpusStore {
    /// Creates a store backed by the file at `path` (which need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> StorageResult<Vec<Chunk>> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::Missing {
                path: self.path.clone(),
            },
            _ => StorageError::Load {
                path: self.path.clone(),
                message: e.to_string(),
            },
        })?;

        serde_json::from_str(&data).map_err(|e| StorageError::Load {
            path: self.path.clone(),
            message: format!("corrupt corpus: {}", e),
        })
    }
}

impl CorpusStore for JsonCorpusStore {
    fn try_load(&self) -> StorageResult<Arc<Vec<Chunk>>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(chunks) = cache.as_ref() {
            return Ok(Arc::clone(chunks));
        }

        let chunks = Arc::new(self.read_file()?);
        tracing::info!(
            "Loaded {} chunks from {}",
            chunks.len(),
            self.path.display()
        );
        *cache = Some(Arc::clone(&chunks));
        Ok(chunks)
    }

    fn save(&self, chunks: &[Chunk]) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(chunks)?;
        write_atomic(&self.path, json.as_bytes())?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *cache = Some(Arc::new(chunks.to_vec()));

        tracing::info!("Saved {} chunks to {}", chunks.len(), self.path.display());
        Ok(())
    }

    fn set_aside(&self) -> StorageResult<Option<PathBuf>> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "corpus".to_string());
        let backup = self.path.with_file_name(format!(
            "{}.corrupt-{}",
            file_name,
            Utc::now().format("%Y%m%dT%H%M%S%.3f")
        ));

        match std::fs::rename(&self.path, &backup) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Write {
                    path: backup,
                    source,
                })
            }
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *cache = None;

        tracing::warn!(
            "Moved unreadable corpus {} to {}",
            self.path.display(),
            backup.display()
        );
        Ok(Some(backup))
    }
}
