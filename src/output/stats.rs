//! Statistics generation from the corpus file
//!
//! This module provides functionality for summarizing a stored corpus and
//! the pending queue for `--stats`.

use crate::chunker::Chunk;
use std::collections::{BTreeMap, HashSet};

/// Corpus statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusStatistics {
    /// Total number of chunks stored
    pub total_chunks: usize,

    /// Number of distinct page URLs
    pub unique_pages: usize,

    /// Chunks carrying a section heading
    pub sectioned_chunks: usize,

    /// Chunks produced from whole-page fallback
    pub unsectioned_chunks: usize,

    /// Chunk count per host, sorted by host
    pub chunks_by_host: BTreeMap<String, usize>,

    /// Mean chunk length in characters
    pub average_chunk_chars: f64,

    /// URLs waiting in the pending queue
    pub pending_urls: usize,
}

/// Computes statistics over `chunks`
pub fn compute_statistics(chunks: &[Chunk], pending_urls: usize) -> CorpusStatistics {
    let mut pages = HashSet::new();
    let mut chunks_by_host = BTreeMap::new();
    let mut sectioned_chunks = 0;
    let mut total_chars = 0;

    for chunk in chunks {
        pages.insert(chunk.url.as_str());
        if chunk.section.is_some() {
            sectioned_chunks += 1;
        }
        total_chars += chunk.content.chars().count();

        let host = url::Url::parse(&chunk.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "(unknown)".to_string());
        *chunks_by_host.entry(host).or_insert(0) += 1;
    }

    let average_chunk_chars = if chunks.is_empty() {
        0.0
    } else {
        total_chars as f64 / chunks.len() as f64
    };

    CorpusStatistics {
        total_chunks: chunks.len(),
        unique_pages: pages.len(),
        sectioned_chunks,
        unsectioned_chunks: chunks.len() - sectioned_chunks,
        chunks_by_host,
        average_chunk_chars,
        pending_urls,
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics ===\n");

    println!("Overview:");
    println!("  Total chunks: {}", stats.total_chunks);
    println!("  Unique pages: {}", stats.unique_pages);
    println!("  Sectioned chunks: {}", stats.sectioned_chunks);
    println!("  Whole-page chunks: {}", stats.unsectioned_chunks);
    println!("  Average chunk length: {:.0} chars", stats.average_chunk_chars);
    println!();

    if !stats.chunks_by_host.is_empty() {
        println!("Chunks by Host:");
        let mut host_counts: Vec<_> = stats.chunks_by_host.iter().collect();
        host_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (host, count) in host_counts {
            let percentage = (*count as f64 / stats.total_chunks as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", host, count, percentage);
        }
        println!();
    }

    println!("Pending queue: {} URLs", stats.pending_urls);
}
