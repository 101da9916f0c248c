//! Docsift: a documentation corpus builder
//!
//! This crate crawls documentation sites, extracts heading-delimited sections,
//! splits them into retrieval-sized chunks, persists them as a JSON corpus and
//! ranks them against free-text queries with a lexical scorer.

pub mod chunker;
pub mod config;
pub mod context;
pub mod crawler;
pub mod output;
pub mod retrieval;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Docsift operations
#[derive(Debug, Error)]
pub enum DocsiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid path pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Docsift operations
pub type Result<T> = std::result::Result<T, DocsiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use chunker::{Chunk, Chunker};
pub use config::Config;
pub use retrieval::{Retriever, ScoredChunk};
pub use storage::{CorpusStore, JsonCorpusStore};
pub use url::{normalize_url, resolve_href};
