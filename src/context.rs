//! Context block formatting for the chat layer
//!
//! Retrieved chunks are rendered as numbered source blocks that a prompt
//! builder can paste verbatim.

use crate::retrieval::{Retriever, ScoredChunk};

/// Number of chunks retrieved per chat turn
pub const DEFAULT_K: usize = 4;

/// Returned when no chunk matched the query
pub const NO_CONTEXT: &str =
    "No relevant documentation found. Please provide general guidance based on your knowledge.";

/// Renders results as `[Source i: title - section]` blocks separated by `---`
pub fn format_context(results: &[ScoredChunk]) -> String {
    if results.is_empty() {
        return NO_CONTEXT.to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let chunk = &result.chunk;
            let title = if chunk.title.is_empty() {
                "Documentation"
            } else {
                chunk.title.as_str()
            };
            let section = chunk
                .section
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| format!(" - {}", s))
                .unwrap_or_default();

            format!(
                "[Source {}: {}{}]\n{}\nURL: {}\n",
                i + 1,
                title,
                section,
                chunk.content,
                chunk.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n\n")
}

/// Searches with [`DEFAULT_K`] and formats the result
pub async fn retrieve_context(retriever: &Retriever, query: &str) -> String {
    format_context(&retriever.search(query, DEFAULT_K).await)
}
