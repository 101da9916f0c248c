//! Page fetching
//!
//! This module loads a page and hands its final markup to the extractor:
//! - `Renderer` is the seam between the crawl loop and a rendering engine
//! - `HttpRenderer` fetches served markup with reqwest
//! - `BrowserRenderer` (feature `browser`) renders through headless Chromium
//! - `Fetcher` applies the per-URL timeout and runs extraction

use crate::config::UserAgentConfig;
use crate::crawler::parser::{Extraction, Extractor, ParsedDocument};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-URL failures; none of them abort a crawl
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timed out after {timeout_ms}ms fetching {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Malformed URL {url}: {message}")]
    MalformedUrl { url: String, message: String },

    #[error("URL disallowed by robots.txt: {url}")]
    RobotsDenied { url: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Extractor setup failed: {0}")]
    Extraction(String),
}

impl FetchError {
    /// The URL this error is about, if it concerns a single page
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Timeout { url, .. }
            | Self::Navigation { url, .. }
            | Self::MalformedUrl { url, .. }
            | Self::RobotsDenied { url } => Some(url),
            Self::Browser(_) | Self::Extraction(_) => None,
        }
    }
}

/// Final markup of a page and the address it was served from
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Location after redirects, exactly as served (not normalized)
    pub final_url: Url,
    pub html: String,
}

/// Produces the final markup of a page
///
/// Implementations are shared by every in-flight fetch.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, url: &Url) -> impl Future<Output = Result<RenderedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is formatted as `CrawlerName/Version (+ContactURL; ContactEmail)`.
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renders pages by fetching their served HTML
///
/// Scripts are not executed, so this suits statically generated docs.
#[derive(Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Renderer for HttpRenderer {
    async fn render(&self, url: &Url) -> Result<RenderedPage, FetchError> {
        let navigation = |message: String| FetchError::Navigation {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(navigation("HTTP 429 (rate limited)".to_string()));
        }
        if !status.is_success() {
            return Err(navigation(format!("HTTP {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(navigation(format!("Expected HTML, got {}", content_type)));
        }

        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;

        Ok(RenderedPage { final_url, html })
    }
}

fn classify_reqwest_error(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_builder() {
        FetchError::MalformedUrl {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else if e.is_timeout() {
        FetchError::Navigation {
            url: url.to_string(),
            message: "request timeout".to_string(),
        }
    } else if e.is_connect() {
        FetchError::Navigation {
            url: url.to_string(),
            message: format!("connection failed: {}", e),
        }
    } else {
        FetchError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

#[cfg(feature = "browser")]
pub use browser::BrowserRenderer;

#[cfg(feature = "browser")]
mod browser {
    use super::{FetchError, RenderedPage, Renderer};
    use chromiumoxide::{Browser, BrowserConfig};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use url::Url;

    /// Renders pages in one shared headless Chromium
    ///
    /// Each URL gets its own page (tab), closed as soon as its markup is read.
    pub struct BrowserRenderer {
        browser: Browser,
        handler: JoinHandle<()>,
        settle_delay: Duration,
    }

    impl BrowserRenderer {
        /// Launches Chromium and starts its event loop
        pub async fn launch(user_agent: &str, settle_delay: Duration) -> Result<Self, FetchError> {
            let config = BrowserConfig::builder()
                .arg(format!("--user-agent={}", user_agent))
                .build()
                .map_err(FetchError::Browser)?;

            let (browser, mut events) = Browser::launch(config)
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;

            let handler = tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    if let Err(e) = event {
                        tracing::debug!("Browser event error: {}", e);
                    }
                }
            });

            tracing::info!("Launched headless browser");
            Ok(Self {
                browser,
                handler,
                settle_delay,
            })
        }
    }

    impl Renderer for BrowserRenderer {
        async fn render(&self, url: &Url) -> Result<RenderedPage, FetchError> {
            let page = self
                .browser
                .new_page(url.as_str())
                .await
                .map_err(|e| FetchError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

            let captured = async {
                page.wait_for_navigation().await?;
                tokio::time::sleep(self.settle_delay).await;
                let location = page.url().await?;
                let html = page.content().await?;
                Ok::<_, chromiumoxide::error::CdpError>((location, html))
            }
            .await;

            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close page for {}: {}", url, e);
            }

            let (location, html) = captured.map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

            let final_url = location
                .and_then(|location| Url::parse(&location).ok())
                .unwrap_or_else(|| url.clone());
            Ok(RenderedPage { final_url, html })
        }
    }

    impl Drop for BrowserRenderer {
        fn drop(&mut self) {
            self.handler.abort();
        }
    }
}

/// Loads one URL with a deadline and extracts its content
pub struct Fetcher<R> {
    renderer: R,
    extractor: Extractor,
    timeout: Duration,
}

impl<R: Renderer> Fetcher<R> {
    pub fn new(renderer: R, extractor: Extractor, timeout: Duration) -> Self {
        Self {
            renderer,
            extractor,
            timeout,
        }
    }

    /// Renders `url` within the timeout, then extracts it
    ///
    /// Links resolve against the served location; the extracted page keeps
    /// the claimed `url` so the corpus and the frontier agree on identity.
    pub async fn fetch(&self, url: &Url) -> Result<ParsedDocument, FetchError> {
        let rendered = tokio::time::timeout(self.timeout, self.renderer.render(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        if rendered.final_url != *url {
            tracing::debug!("{} was served from {}", url, rendered.final_url);
        }

        let mut parsed = self.extractor.extract(&rendered.html, &rendered.final_url);
        if let Extraction::Accepted(page) = &mut parsed.extraction {
            page.url = url.to_string();
        }
        Ok(parsed)
    }
}
