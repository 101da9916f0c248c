//! Output module for crawl reports and corpus statistics
//!
//! This module handles:
//! - The per-run crawl report and its console rendering
//! - Corpus statistics for `--stats`

mod report;
pub mod stats;

pub use report::{print_report, CrawlError, CrawlReport};
pub use stats::{compute_statistics, print_statistics, CorpusStatistics};
