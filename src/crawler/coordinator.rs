//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier from the pending queue, the corpus and the config
//! - Dispatching bounded concurrent fetches
//! - Folding extraction results back into the frontier and the chunk batch
//! - Merging into the corpus and persisting unfinished work

use crate::chunker::{Chunk, Chunker};
use crate::config::{Config, RendererKind};
use crate::crawler::fetcher::{build_http_client, FetchError, Fetcher, HttpRenderer, Renderer};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{Extraction, Extractor, ParsedDocument};
use crate::output::CrawlReport;
use crate::robots::RobotsCache;
use crate::storage::{merge, CorpusStore, JsonCorpusStore, PendingQueue, StorageError, StorageResult};
use crate::url::{normalize_url, SiteScope};
use crate::DocsiftError;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

type FetchOutcome = (Url, Result<ParsedDocument, FetchError>);

/// Main crawler coordinator structure
///
/// The coordinator is the only owner of the frontier. Fetch tasks receive a
/// claimed URL and hand back its outcome; they never touch crawl state.
pub struct Coordinator<R: Renderer> {
    config: Arc<Config>,
    store: Arc<dyn CorpusStore>,
    queue: PendingQueue,
    fetcher: Arc<Fetcher<R>>,
    chunker: Chunker,
    frontier: Frontier,
    robots: Option<RobotsCache>,
    existing: Arc<Vec<Chunk>>,
}

impl<R: Renderer> Coordinator<R> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `store` - Corpus backend; its URLs are never re-crawled
    /// * `queue` - Pending queue from the previous run
    /// * `renderer` - Rendering backend used by every fetch
    /// * `fresh` - Ignore the pending queue and start from the configured seeds
    pub async fn new(
        config: Config,
        store: Arc<dyn CorpusStore>,
        queue: PendingQueue,
        renderer: R,
        fresh: bool,
    ) -> Result<Self, DocsiftError> {
        let timeout = Duration::from_millis(config.crawler.fetch_timeout_ms);
        let extractor = Extractor::new(config.crawler.min_content_length)?;
        let fetcher = Fetcher::new(renderer, extractor, timeout);
        let chunker = Chunker::new(config.chunker.max_chunk_size);

        let existing = load_existing(Arc::clone(&store)).await?;
        let already_crawled = existing.iter().map(|chunk| {
            normalize_url(&chunk.url)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| chunk.url.clone())
        });

        let scope = SiteScope::from_sites(&config.sites)?;
        let mut frontier = Frontier::new(scope, config.crawler.max_pages, already_crawled);
        tracing::info!(
            "{} URLs already in the corpus will be skipped",
            frontier.already_crawled_count()
        );

        let resumed = if fresh {
            tracing::info!("Fresh crawl requested, ignoring pending queue");
            0
        } else {
            let pending = queue.load().unwrap_or_else(|e| {
                tracing::warn!("Ignoring pending queue: {}", e);
                Vec::new()
            });
            frontier.enqueue_discovered(pending)
        };

        if resumed > 0 {
            tracing::info!("Resuming from {} pending URLs", resumed);
        } else {
            let mut seeds = Vec::new();
            for seed in config.seed_urls() {
                seeds.push(normalize_url(seed)?);
            }
            let seeded = frontier.enqueue_discovered(seeds);
            tracing::info!("Seeded frontier with {} URLs", seeded);
        }

        let robots = if config.crawler.respect_robots {
            let client = build_http_client(&config.user_agent, timeout)?;
            Some(RobotsCache::new(
                client,
                config.user_agent.crawler_name.clone(),
            ))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            store,
            queue,
            fetcher: Arc::new(fetcher),
            chunker,
            frontier,
            robots,
            existing,
        })
    }

    /// Runs the main crawl loop
    ///
    /// 1. Claims URLs from the frontier while fetch slots are free
    /// 2. Checks robots.txt and dispatches fetches
    /// 3. Folds each finished fetch back: links, chunks, errors
    /// 4. Merges and saves the corpus, then saves the pending queue
    pub async fn run(&mut self) -> Result<CrawlReport, DocsiftError> {
        let limit = self.config.crawler.max_concurrent_pages.max(1);
        tracing::info!(
            "Starting crawl: budget {} pages, {} concurrent",
            self.config.crawler.max_pages,
            limit
        );

        let mut report = CrawlReport::begin();
        let mut in_flight: JoinSet<FetchOutcome> = JoinSet::new();
        let mut new_chunks = Vec::new();
        let mut completed = 0usize;
        let start_time = Instant::now();

        loop {
            while in_flight.len() < limit {
                let batch = self.frontier.next_batch(limit - in_flight.len());
                if batch.is_empty() {
                    break;
                }

                for url in batch {
                    report.pages_visited += 1;

                    if !self.robots_allows(&url).await {
                        let err = FetchError::RobotsDenied {
                            url: url.to_string(),
                        };
                        tracing::info!("{}", err);
                        report.record_error(url.as_str(), err.to_string());
                        continue;
                    }

                    tracing::debug!("Dispatching {}", url);
                    let fetcher = Arc::clone(&self.fetcher);
                    in_flight.spawn(async move {
                        let result = fetcher.fetch(&url).await;
                        (url, result)
                    });
                }
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            match joined {
                Ok((url, result)) => self.fold(url, result, &mut report, &mut new_chunks),
                Err(e) => {
                    tracing::error!("Fetch task failed: {}", e);
                    report.record_error("(unknown)", format!("fetch task failed: {}", e));
                }
            }

            completed += 1;
            if completed % 10 == 0 {
                let rate = completed as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages fetched, {} queued, {} in flight, {:.2} pages/sec",
                    completed,
                    self.frontier.pending_count(),
                    in_flight.len(),
                    rate
                );
            }
        }

        if self.frontier.budget_exhausted() {
            tracing::info!("Page budget of {} reached", self.config.crawler.max_pages);
        } else {
            tracing::info!("Frontier is empty, crawl complete");
        }

        let outcome = merge(&self.existing, new_chunks);
        report.chunks_added = outcome.chunks.len() - self.existing.len();
        report.duplicates_skipped = outcome.duplicates_skipped;
        self.store.save(&outcome.chunks)?;
        self.existing = Arc::new(outcome.chunks);

        let remaining = self.frontier.remaining_queue();
        self.queue.save(&remaining)?;
        report.pending_remaining = remaining.len();
        report.finished_at = Utc::now();

        tracing::info!(
            "Crawl completed: {} pages visited, {} chunks added in {:?}",
            report.pages_visited,
            report.chunks_added,
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Read access to the frontier, mainly for inspection after a run
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    fn fold(
        &mut self,
        url: Url,
        result: Result<ParsedDocument, FetchError>,
        report: &mut CrawlReport,
        new_chunks: &mut Vec<Chunk>,
    ) {
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("{}", e);
                report.record_error(url.as_str(), e.to_string());
                return;
            }
        };

        let added = self.frontier.enqueue_discovered(parsed.links);

        match parsed.extraction {
            Extraction::Accepted(page) => {
                let chunks = self.chunker.chunk(&page);
                tracing::debug!(
                    "Extracted {}: {} sections, {} chunks, {} new links",
                    url,
                    page.sections.len(),
                    chunks.len(),
                    added
                );
                report.pages_accepted += 1;
                new_chunks.extend(chunks);
            }
            Extraction::Rejected { content_len } => {
                tracing::debug!(
                    "Skipping {}: only {} chars of content, {} new links",
                    url,
                    content_len,
                    added
                );
                report.pages_rejected += 1;
            }
        }
    }

    async fn robots_allows(&mut self, url: &Url) -> bool {
        match self.robots.as_mut() {
            Some(robots) => robots.is_allowed(url).await,
            None => true,
        }
    }
}

/// Reads the prior corpus on a blocking thread
///
/// A missing corpus is empty. An unreadable one is set aside first, so the
/// end-of-run save cannot replace chunks that are only temporarily unreadable.
async fn load_existing(store: Arc<dyn CorpusStore>) -> Result<Arc<Vec<Chunk>>, DocsiftError> {
    let loaded = tokio::task::spawn_blocking(move || -> StorageResult<Arc<Vec<Chunk>>> {
        match store.try_load() {
            Ok(chunks) => Ok(chunks),
            Err(StorageError::Missing { path }) => {
                tracing::info!("No corpus at {} yet, starting empty", path.display());
                Ok(Arc::new(Vec::new()))
            }
            Err(e) => {
                tracing::warn!("Treating corpus as empty: {}", e);
                store.set_aside()?;
                Ok(Arc::new(Vec::new()))
            }
        }
    })
    .await
    .map_err(std::io::Error::from)?;

    Ok(loaded?)
}

/// Runs the main crawl operation
///
/// Builds the corpus store, the pending queue and the configured renderer,
/// then runs a coordinator over them.
///
/// # Example
///
/// ```no_run
/// use docsift::config::load_config;
/// use docsift::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("docsift.toml"))?;
/// let report = run_crawl(config, false).await?;
/// println!("{} chunks added", report.chunks_added);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlReport, DocsiftError> {
    let store: Arc<dyn CorpusStore> = Arc::new(JsonCorpusStore::new(&config.output.corpus_path));
    let queue = PendingQueue::new(&config.output.queue_path);
    let timeout = Duration::from_millis(config.crawler.fetch_timeout_ms);

    match config.crawler.renderer {
        RendererKind::Http => {
            let client = build_http_client(&config.user_agent, timeout)?;
            let renderer = HttpRenderer::new(client);
            Coordinator::new(config, store, queue, renderer, fresh)
                .await?
                .run()
                .await
        }
        RendererKind::Browser => run_with_browser(config, store, queue, fresh).await,
    }
}

#[cfg(feature = "browser")]
async fn run_with_browser(
    config: Config,
    store: Arc<dyn CorpusStore>,
    queue: PendingQueue,
    fresh: bool,
) -> Result<CrawlReport, DocsiftError> {
    use crate::crawler::fetcher::BrowserRenderer;

    let settle_delay = Duration::from_millis(config.crawler.settle_delay_ms);
    let renderer = BrowserRenderer::launch(&config.user_agent.header_value(), settle_delay).await?;
    Coordinator::new(config, store, queue, renderer, fresh)
        .await?
        .run()
        .await
}

#[cfg(not(feature = "browser"))]
async fn run_with_browser(
    _config: Config,
    _store: Arc<dyn CorpusStore>,
    _queue: PendingQueue,
    _fresh: bool,
) -> Result<CrawlReport, DocsiftError> {
    Err(crate::ConfigError::Validation(
        "renderer = \"browser\" requires building with the `browser` feature".to_string(),
    )
    .into())
}
