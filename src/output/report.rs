//! Run report types
//!
//! A `CrawlReport` is produced by every completed crawl and summarizes what
//! the run visited, kept, skipped and left pending.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A URL that failed during the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlError {
    /// The URL that failed
    pub url: String,

    /// Error message
    pub message: String,
}

/// Summary statistics for one crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// URLs claimed this run, including failed and robots-denied ones
    pub pages_visited: usize,

    /// Pages whose content passed the minimum-length check
    pub pages_accepted: usize,

    /// Pages fetched but rejected as too short
    pub pages_rejected: usize,

    /// Chunks appended to the corpus
    pub chunks_added: usize,

    /// Chunks dropped because their `(url, section)` was already stored
    pub duplicates_skipped: usize,

    /// URLs written to the pending queue
    pub pending_remaining: usize,

    pub errors: Vec<CrawlError>,
}

impl CrawlReport {
    /// An empty report starting now
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            pages_visited: 0,
            pages_accepted: 0,
            pages_rejected: 0,
            chunks_added: 0,
            duplicates_skipped: 0,
            pending_remaining: 0,
            errors: Vec::new(),
        }
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Pages fetched successfully (accepted or rejected)
    pub fn pages_fetched(&self) -> usize {
        self.pages_accepted + self.pages_rejected
    }

    pub fn record_error(&mut self, url: impl Into<String>, message: impl Into<String>) {
        self.errors.push(CrawlError {
            url: url.into(),
            message: message.into(),
        });
    }
}

/// Prints a run report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Run:");
    println!("  Started:  {}", report.started_at.to_rfc3339());
    println!("  Finished: {}", report.finished_at.to_rfc3339());
    println!("  Duration: {}s", report.duration_seconds());
    println!();

    println!("Pages:");
    println!("  Visited:  {}", report.pages_visited);
    println!("  Accepted: {}", report.pages_accepted);
    println!("  Rejected: {} (too little content)", report.pages_rejected);
    println!("  Failed:   {}", report.errors.len());
    println!();

    println!("Corpus:");
    println!("  Chunks added:       {}", report.chunks_added);
    println!("  Duplicates skipped: {}", report.duplicates_skipped);
    println!("  Pending URLs saved: {}", report.pending_remaining);

    if !report.errors.is_empty() {
        println!("\nErrors ({}):", report.errors.len());
        for error in &report.errors {
            println!("  - {}: {}", error.url, error.message);
        }
    }
}
