use serde::Deserialize;

/// Main configuration structure for Docsift
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub chunker: ChunkerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteEntry>,
}

impl Config {
    /// Seed URLs of every site, in configuration order
    pub fn seed_urls(&self) -> impl Iterator<Item = &str> {
        self.sites.iter().flat_map(SiteEntry::seed_urls)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Global page budget for one run, shared by every site
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum number of fetches in flight
    #[serde(rename = "max-concurrent-pages", default = "default_concurrency")]
    pub max_concurrent_pages: usize,

    /// Per-URL fetch timeout (milliseconds)
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,

    /// Delay after navigation before markup is captured (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Collapsed main-content length a page must exceed to be kept
    #[serde(rename = "min-content-length", default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Which rendering backend loads pages
    #[serde(default)]
    pub renderer: RendererKind,

    /// Whether robots.txt is consulted before fetching
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,
}

/// Rendering backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Plain HTTP GET of the served markup
    #[default]
    Http,
    /// Headless Chromium with script execution
    Browser,
}

/// Chunking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum chunk length in characters
    #[serde(rename = "max-chunk-size", default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON corpus file
    #[serde(rename = "corpus-path")]
    pub corpus_path: String,

    /// Path to the pending-queue file
    #[serde(rename = "queue-path")]
    pub queue_path: String,
}

/// One documentation site to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// URL prefix every crawled page must start with
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Seed URLs; the base URL is used when empty
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Path patterns a page must match (`*` matches any run of characters)
    #[serde(rename = "include-paths", default = "default_include_paths")]
    pub include_paths: Vec<String>,
}

impl SiteEntry {
    /// Seed URLs for this site, falling back to the base URL
    pub fn seed_urls(&self) -> impl Iterator<Item = &str> {
        let fallback = self.seeds.is_empty().then_some(self.base_url.as_str());
        self.seeds.iter().map(String::as_str).chain(fallback)
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_fetch_timeout() -> u64 {
    30_000
}

fn default_settle_delay() -> u64 {
    2_000
}

fn default_min_content_length() -> usize {
    100
}

fn default_max_chunk_size() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

fn default_include_paths() -> Vec<String> {
    vec!["/".to_string()]
}
