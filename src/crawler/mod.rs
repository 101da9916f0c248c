//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Rendering pages behind the `Renderer` seam
//! - Content extraction and link discovery
//! - The frontier that owns visited and pending URLs
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
#[cfg(feature = "browser")]
pub use fetcher::BrowserRenderer;
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpRenderer, RenderedPage, Renderer};
pub use frontier::Frontier;
pub use parser::{
    collapse_whitespace, ExtractedPage, Extraction, Extractor, ParsedDocument, Section,
};

pub use crate::output::{CrawlError, CrawlReport};

use crate::config::Config;
use crate::DocsiftError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the corpus so its URLs are never re-crawled
/// 2. Seed the frontier from the pending queue or the configured seeds
/// 3. Fetch, extract and chunk pages until the frontier or the budget runs out
/// 4. Merge new chunks into the corpus and persist the pending queue
pub async fn crawl(config: Config, fresh: bool) -> Result<CrawlReport, DocsiftError> {
    run_crawl(config, fresh).await
}
