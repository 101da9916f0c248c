//! Lexical retrieval over the stored corpus
//!
//! The corpus is read on the first query and shared by every later one. A
//! corpus that cannot be read behaves as an empty one.

mod scorer;

pub use scorer::{rank, QueryMatcher, ScoredChunk};

use crate::chunker::Chunk;
use crate::storage::{CorpusStore, JsonCorpusStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Ranks corpus chunks against free-text queries
pub struct Retriever {
    store: Arc<dyn CorpusStore>,
    corpus: OnceCell<Arc<Vec<Chunk>>>,
}

impl Retriever {
    pub fn new(store: Arc<dyn CorpusStore>) -> Self {
        Self {
            store,
            corpus: OnceCell::new(),
        }
    }

    /// A retriever over the JSON corpus at `path`
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonCorpusStore::new(path)))
    }

    /// The loaded corpus
    ///
    /// Concurrent first callers share a single load.
    pub async fn corpus(&self) -> Arc<Vec<Chunk>> {
        let corpus = self
            .corpus
            .get_or_init(|| async {
                let store = Arc::clone(&self.store);
                match tokio::task::spawn_blocking(move || store.load()).await {
                    Ok(chunks) => chunks,
                    Err(e) => {
                        tracing::warn!("Corpus load task failed: {}", e);
                        Arc::new(Vec::new())
                    }
                }
            })
            .await;
        Arc::clone(corpus)
    }

    /// Returns at most `k` chunks with a positive score, best first
    pub async fn search(&self, query: &str, k: usize) -> Vec<ScoredChunk> {
        if k == 0 || query.trim().is_empty() {
            return Vec::new();
        }

        let corpus = self.corpus().await;
        let results = rank(&corpus, query, k);
        tracing::debug!(
            "Query {:?} matched {} of {} chunks",
            query,
            results.len(),
            corpus.len()
        );
        results
    }
}
