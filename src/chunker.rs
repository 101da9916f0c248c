//! Page chunking
//!
//! Turns an extracted page into retrieval-sized chunks. Each section becomes
//! one chunk when it fits; oversized sections, and pages without sections,
//! are split at word boundaries.

use crate::crawler::ExtractedPage;
use serde::{Deserialize, Serialize};

/// One retrieval unit of page text with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChunkRecord", into = "ChunkRecord")]
pub struct Chunk {
    pub content: String,
    pub url: String,
    pub title: String,
    pub section: Option<String>,
}

impl Chunk {
    /// The `(url, section)` pair that identifies a chunk across runs
    pub fn identity(&self) -> (&str, Option<&str>) {
        (self.url.as_str(), self.section.as_deref())
    }
}

/// Corpus wire shape: provenance nested under `metadata`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkRecord {
    content: String,
    metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkMetadata {
    url: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    section: Option<String>,
}

impl From<ChunkRecord> for Chunk {
    fn from(record: ChunkRecord) -> Self {
        Self {
            content: record.content,
            url: record.metadata.url,
            title: record.metadata.title,
            section: record.metadata.section,
        }
    }
}

impl From<Chunk> for ChunkRecord {
    fn from(chunk: Chunk) -> Self {
        Self {
            content: chunk.content,
            metadata: ChunkMetadata {
                url: chunk.url,
                title: chunk.title,
                section: chunk.section,
            },
        }
    }
}

/// Splits pages into chunks no longer than `max_chunk_size` characters
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_chunk_size: usize,
}

impl Chunker {
    pub fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    /// Chunks one page
    ///
    /// Sections are emitted as `"{heading}\n\n{body}"`. A page whose sections
    /// yield nothing falls back to its whole main text with no section set.
    pub fn chunk(&self, page: &ExtractedPage) -> Vec<Chunk> {
        let make = |content: String, section: Option<&str>| Chunk {
            content,
            url: page.url.clone(),
            title: page.title.clone(),
            section: section.map(str::to_string),
        };

        let mut chunks = Vec::new();

        for section in &page.sections {
            if section.content.trim().is_empty() {
                continue;
            }

            let text = format!("{}\n\n{}", section.heading, section.content);
            if text.chars().count() <= self.max_chunk_size {
                chunks.push(make(text, Some(&section.heading)));
            } else {
                chunks.extend(
                    self.split_words(&text)
                        .into_iter()
                        .map(|piece| make(piece, Some(&section.heading))),
                );
            }
        }

        if chunks.is_empty() {
            chunks.extend(
                self.split_words(&page.content)
                    .into_iter()
                    .map(|piece| make(piece, None)),
            );
        }

        chunks
    }

    /// Accumulates space-separated words, flushing before the limit is crossed
    ///
    /// Only spaces are split on, so the blank line after a section heading
    /// stays inside the first word and counts toward its piece. A single word
    /// longer than the limit becomes a chunk of its own.
    fn split_words(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut buffer = String::new();
        let mut buffer_len = 0;

        for word in text.split(' ').filter(|word| !word.is_empty()) {
            let word_len = word.chars().count();

            if buffer_len > 0 && buffer_len + 1 + word_len > self.max_chunk_size {
                pieces.push(std::mem::take(&mut buffer));
                buffer_len = 0;
            }

            if buffer_len > 0 {
                buffer.push(' ');
                buffer_len += 1;
            }
            buffer.push_str(word);
            buffer_len += word_len;
        }

        if !buffer.is_empty() {
            pieces.push(buffer);
        }

        pieces
    }
}
