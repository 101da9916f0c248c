//! Per-origin robots.txt cache
//!
//! Each origin's robots.txt is fetched at most once per run.

use crate::robots::{fetch_robots, ParsedRobots};
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Robots policies keyed by origin (`scheme://host:port`)
pub struct RobotsCache {
    client: Client,
    agent_token: String,
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    /// `agent_token` is the product token matched against `User-agent` groups
    pub fn new(client: Client, agent_token: impl Into<String>) -> Self {
        Self {
            client,
            agent_token: agent_token.into(),
            entries: HashMap::new(),
        }
    }

    /// Checks `url` against its origin's robots.txt, fetching it on first use
    pub async fn is_allowed(&mut self, url: &Url) -> bool {
        let origin = url.origin().ascii_serialization();

        if !self.entries.contains_key(&origin) {
            tracing::debug!("Fetching robots.txt for {}", origin);
            let robots = fetch_robots(&self.client, url).await;
            self.entries.insert(origin.clone(), robots);
        }

        self.entries
            .get(&origin)
            .map_or(true, |robots| robots.is_allowed(url.as_str(), &self.agent_token))
    }

    /// Inserts a policy without fetching
    pub fn insert(&mut self, origin: impl Into<String>, robots: ParsedRobots) {
        self.entries.insert(origin.into(), robots);
    }

    /// Number of origins seen so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
