//! URL frontier
//!
//! This module owns every crawl-state set for one run:
//! - `visited`: URLs claimed for fetching this run
//! - `discovered`: URLs ever enqueued, in discovery order
//! - `already_crawled`: URLs present in the corpus before the run started
//!
//! Only the coordinator mutates the frontier, so none of it is shared.

use crate::url::SiteScope;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Crawl state plus the global page budget
pub struct Frontier {
    scope: SiteScope,
    budget: usize,
    visited: HashSet<String>,
    discovered: HashSet<String>,
    already_crawled: HashSet<String>,
    pending: VecDeque<Url>,
}

impl Frontier {
    /// Creates a frontier for `scope` that will claim at most `budget` URLs
    ///
    /// `already_crawled` holds normalized URL strings that are never visited again.
    pub fn new(
        scope: SiteScope,
        budget: usize,
        already_crawled: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            scope,
            budget,
            visited: HashSet::new(),
            discovered: HashSet::new(),
            already_crawled: already_crawled.into_iter().collect(),
            pending: VecDeque::new(),
        }
    }

    /// Returns true if `url` is in scope and has not been visited in any run
    pub fn should_visit(&self, url: &Url) -> bool {
        let key = url.as_str();
        self.scope.admits(url) && !self.visited.contains(key) && !self.already_crawled.contains(key)
    }

    /// Records `url` as visited this run
    pub fn mark_visited(&mut self, url: &Url) {
        self.visited.insert(url.to_string());
    }

    /// Enqueues eligible URLs that were not discovered before, in order
    ///
    /// Returns how many were added. Discovery continues after the budget is
    /// spent so the remainder can be persisted.
    pub fn enqueue_discovered(&mut self, urls: impl IntoIterator<Item = Url>) -> usize {
        let mut added = 0;
        for url in urls {
            if !self.should_visit(&url) {
                continue;
            }
            if self.discovered.insert(url.to_string()) {
                self.pending.push_back(url);
                added += 1;
            }
        }
        added
    }

    /// Claims up to `n` pending URLs, marking each visited
    ///
    /// Never claims past the page budget.
    pub fn next_batch(&mut self, n: usize) -> Vec<Url> {
        let mut batch = Vec::new();

        while batch.len() < n && !self.budget_exhausted() {
            let Some(url) = self.pending.pop_front() else {
                break;
            };
            if !self.should_visit(&url) {
                continue;
            }
            self.mark_visited(&url);
            batch.push(url);
        }

        batch
    }

    /// URLs discovered but neither previously crawled nor visited, in discovery order
    pub fn remaining_queue(&self) -> Vec<Url> {
        self.pending
            .iter()
            .filter(|url| {
                !self.visited.contains(url.as_str()) && !self.already_crawled.contains(url.as_str())
            })
            .cloned()
            .collect()
    }

    /// Returns true once the run has claimed `budget` URLs
    pub fn budget_exhausted(&self) -> bool {
        self.visited.len() >= self.budget
    }

    /// Returns true if there is no claimable work left
    pub fn is_drained(&self) -> bool {
        self.budget_exhausted() || self.pending.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn already_crawled_count(&self) -> usize {
        self.already_crawled.len()
    }
}
