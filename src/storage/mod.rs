//! Storage module for persisting crawl output
//!
//! This module handles everything that outlives a run:
//! - The chunk corpus (JSON file, loaded once and cached)
//! - Merging newly produced chunks into the existing corpus
//! - The pending queue used to resume an unfinished crawl

mod json;
mod queue;
mod traits;

pub use json::JsonCorpusStore;
pub use queue::PendingQueue;
pub use traits::{CorpusStore, StorageError, StorageResult};

use crate::chunker::Chunk;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// Result of merging new chunks into an existing corpus
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Existing chunks in their stored order, followed by the accepted new ones
    pub chunks: Vec<Chunk>,

    /// Number of new chunks dropped because their `(url, section)` was already present
    pub duplicates_skipped: usize,
}

/// Appends `new_chunks` after `existing`, preserving the order of both
///
/// A new chunk whose `(url, section)` identity is already stored is skipped.
/// The pieces of one oversized section share an identity and arrive in the
/// same batch, so they are all kept.
pub fn merge(existing: &[Chunk], new_chunks: Vec<Chunk>) -> MergeOutcome {
    let stored: HashSet<(&str, Option<&str>)> = existing.iter().map(Chunk::identity).collect();

    let mut chunks = existing.to_vec();
    let mut duplicates_skipped = 0;

    for chunk in new_chunks {
        if stored.contains(&chunk.identity()) {
            tracing::warn!(
                "Skipping duplicate chunk for {} (section: {})",
                chunk.url,
                chunk.section.as_deref().unwrap_or("-")
            );
            duplicates_skipped += 1;
            continue;
        }
        chunks.push(chunk);
    }

    MergeOutcome {
        chunks,
        duplicates_skipped,
    }
}

/// Writes `bytes` to a sibling temp file, then renames it over `path`
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    let result = std::fs::File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| std::fs::rename(&tmp_path, path));

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(url: &str, section: Option<&str>, content: &str) -> Chunk {
        Chunk {
            content: content.to_string(),
            url: url.to_string(),
            title: "T".to_string(),
            section: section.map(str::to_string),
        }
    }

    #[test]
    fn test_merge_appends_in_order() {
        let existing = vec![chunk("https://x/a", None, "a"), chunk("https://x/b", None, "b")];
        let new = vec![chunk("https://x/c", Some("S"), "c"), chunk("https://x/d", None, "d")];

        let outcome = merge(&existing, new);
        let contents: Vec<&str> = outcome.chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c", "d"]);
        assert_eq!(outcome.duplicates_skipped, 0);
    }

    #[test]
    fn test_merge_tolerates_duplicate_identity() {
        let existing = vec![chunk("https://x/a", Some("Setup"), "old")];
        let new = vec![
            chunk("https://x/a", Some("Setup"), "new"),
            chunk("https://x/a", Some("Usage"), "usage"),
        ];

        let outcome = merge(&existing, new);
        assert_eq!(outcome.duplicates_skipped, 1);
        assert_eq!(outcome.chunks.len(), 2);
        assert_eq!(outcome.chunks[0].content, "old");
        assert_eq!(outcome.chunks[1].section.as_deref(), Some("Usage"));
    }

    #[test]
    fn test_merge_keeps_split_pieces_from_same_run() {
        let new = vec![
            chunk("https://x/a", Some("Long"), "part one"),
            chunk("https://x/a", Some("Long"), "part two"),
        ];

        let outcome = merge(&[], new);
        assert_eq!(outcome.chunks.len(), 2);
        assert_eq!(outcome.duplicates_skipped, 0);
    }

    #[test]
    fn test_merge_into_empty() {
        let outcome = merge(&[], vec![]);
        assert!(outcome.chunks.is_empty());
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("file.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
