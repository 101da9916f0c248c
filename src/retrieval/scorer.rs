//! Lexical relevance scoring
//!
//! A chunk's score is the sum of its field scores, weighted
//! `content + 2 × title + 1.5 × section`. Each field scores 100 for containing
//! the whole query (case-insensitive) plus 10 per whole-word term occurrence.

use crate::chunker::Chunk;
use regex::Regex;
use std::cmp::Ordering;

const PHRASE_BONUS: f64 = 100.0;
const TERM_WEIGHT: f64 = 10.0;
const TITLE_WEIGHT: f64 = 2.0;
const SECTION_WEIGHT: f64 = 1.5;

/// A chunk with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f64,
}

/// A query compiled once and applied to every chunk
#[derive(Debug)]
pub struct QueryMatcher {
    phrase: String,
    terms: Vec<Regex>,
}

impl QueryMatcher {
    /// Compiles `query`; returns `None` when it has no terms
    pub fn new(query: &str) -> Option<Self> {
        let phrase = query.trim().to_lowercase();
        if phrase.is_empty() {
            return None;
        }

        let terms = phrase
            .split_whitespace()
            .filter_map(|term| match Regex::new(&term_pattern(term)) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Skipping query term {:?}: {}", term, e);
                    None
                }
            })
            .collect();

        Some(Self { phrase, terms })
    }

    /// Scores one piece of text
    pub fn score_text(&self, text: &str) -> f64 {
        let mut score = 0.0;

        if text.to_lowercase().contains(&self.phrase) {
            score += PHRASE_BONUS;
        }

        for term in &self.terms {
            score += TERM_WEIGHT * term.find_iter(text).count() as f64;
        }

        score
    }

    /// Scores a chunk across its content, title and section
    pub fn score(&self, chunk: &Chunk) -> f64 {
        let content = self.score_text(&chunk.content);
        let title = self.score_text(&chunk.title) * TITLE_WEIGHT;
        let section = chunk
            .section
            .as_deref()
            .map_or(0.0, |s| self.score_text(s) * SECTION_WEIGHT);

        content + title + section
    }
}

/// Case-insensitive whole-word pattern for one term
///
/// `\b` is only placed next to word characters, so terms such as `c++` or
/// `.env` still match.
fn term_pattern(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let starts_word = term.chars().next().is_some_and(is_word);
    let ends_word = term.chars().last().is_some_and(is_word);

    format!(
        "(?i){}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(term),
        if ends_word { r"\b" } else { "" }
    )
}

/// Scores every chunk and returns the top `k` with a positive score
///
/// Ties keep corpus order.
pub fn rank(chunks: &[Chunk], query: &str, k: usize) -> Vec<ScoredChunk> {
    if k == 0 || chunks.is_empty() {
        return Vec::new();
    }
    let Some(matcher) = QueryMatcher::new(query) else {
        return Vec::new();
    };

    let mut scored: Vec<(usize, f64)> = chunks
        .iter()
        .enumerate()
        .map(|(idx, chunk)| (idx, matcher.score(chunk)))
        .filter(|(_, score)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(k)
        .map(|(idx, score)| ScoredChunk {
            chunk: chunks[idx].clone(),
            score,
        })
        .collect()
}
