//! URL handling module for Docsift
//!
//! This module provides URL normalization, href resolution, include-path
//! matching and the site scope that decides which URLs belong to the corpus.

mod matcher;
mod normalize;

use crate::config::SiteEntry;
use crate::UrlResult;
use url::Url;

// Re-export main functions
pub use matcher::matches_path_pattern;
pub use normalize::{normalize_url, resolve_href};

/// One site's crawl boundary: a normalized base prefix plus include patterns
#[derive(Debug, Clone)]
struct SiteRule {
    base: String,
    include_paths: Vec<String>,
}

impl SiteRule {
    fn admits(&self, url: &Url) -> bool {
        has_base_prefix(url.as_str(), &self.base)
            && self
                .include_paths
                .iter()
                .any(|pattern| matches_path_pattern(pattern, url.path()))
    }
}

/// The allow-list of sites a crawl may visit
///
/// A URL is in scope when its normalized form starts with one site's base URL
/// and its path matches at least one of that site's include patterns.
#[derive(Debug, Clone, Default)]
pub struct SiteScope {
    rules: Vec<SiteRule>,
}

impl SiteScope {
    /// Builds the scope from configured sites, normalizing every base URL
    pub fn from_sites(sites: &[SiteEntry]) -> UrlResult<Self> {
        let rules = sites
            .iter()
            .map(|site| {
                Ok(SiteRule {
                    base: normalize_url(&site.base_url)?.to_string(),
                    include_paths: site.include_paths.clone(),
                })
            })
            .collect::<UrlResult<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Returns true if the (already normalized) URL is inside any site
    pub fn admits(&self, url: &Url) -> bool {
        self.rules.iter().any(|rule| rule.admits(url))
    }

    /// Number of configured sites
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no site is configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Prefix test that does not let "/docs" claim "/docs-archive"
fn has_base_prefix(candidate: &str, base: &str) -> bool {
    match candidate.strip_prefix(base) {
        Some(rest) => {
            base.ends_with('/') || rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')
        }
        None => false,
    }
}
