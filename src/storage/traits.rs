//! Storage traits and error types
//!
//! This module defines the trait interface for corpus backends and
//! associated error types.

use crate::chunker::Chunk;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No corpus at {path}")]
    Missing { path: PathBuf },

    #[error("Failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for corpus backend implementations
///
/// A corpus is an ordered sequence of chunks that only ever grows. Readers
/// (the retriever) and the writer (the crawler) share it through this trait.
pub trait CorpusStore: Send + Sync {
    /// Reads the corpus, reporting a missing or corrupt file as an error
    fn try_load(&self) -> StorageResult<Arc<Vec<Chunk>>>;

    /// Writes the full corpus, replacing what was stored before
    fn save(&self, chunks: &[Chunk]) -> StorageResult<()>;

    /// Moves an unreadable corpus out of the way so the next `save` cannot
    /// overwrite it, returning where it went (`None` if nothing was moved)
    fn set_aside(&self) -> StorageResult<Option<PathBuf>> {
        Ok(None)
    }

    /// Reads the corpus, degrading to an empty one when it cannot be read
    fn load(&self) -> Arc<Vec<Chunk>> {
        match self.try_load() {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!("Treating corpus as empty: {}", e);
                Arc::new(Vec::new())
            }
        }
    }
}
