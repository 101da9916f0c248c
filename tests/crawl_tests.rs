//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end with the HTTP renderer.

use docsift::config::{
    ChunkerConfig, Config, CrawlerConfig, OutputConfig, RendererKind, SiteEntry, UserAgentConfig,
};
use docsift::crawler::run_crawl;
use docsift::storage::{CorpusStore, JsonCorpusStore, PendingQueue};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for one site rooted at `base_url`
fn create_test_config(base_url: &str, dir: &TempDir, max_pages: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_pages,
            max_concurrent_pages: 3,
            fetch_timeout_ms: 5_000,
            settle_delay_ms: 0,
            min_content_length: 40,
            renderer: RendererKind::Http,
            respect_robots: true,
        },
        chunker: ChunkerConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            corpus_path: dir.path().join("documents.json").display().to_string(),
            queue_path: dir.path().join("pending_queue.json").display().to_string(),
        },
        sites: vec![SiteEntry {
            base_url: base_url.to_string(),
            seeds: vec![format!("{}/", base_url)],
            include_paths: vec!["/".to_string()],
        }],
    }
}

/// A documentation page with boilerplate, one section and the given links
fn doc_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{}">{}</a></li>"#, href, href))
        .collect();
    format!(
        r#"<html><head><title>{title} | Docs</title></head><body>
        <nav><ul>{anchors}</ul></nav>
        <main>
          <h1>{title}</h1>
          <h2>Getting Started</h2>
          <p>This page documents {title} and walks through the first steps in detail.</p>
        </main>
        <footer>Copyright Example Corp</footer>
        </body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", doc_page("Home", &["/guide", "/guide/forms"])).await;
    mount_page(&mock_server, "/guide", doc_page("Guide", &["/", "/guide/forms#fields"])).await;
    mount_page(&mock_server, "/guide/forms", doc_page("Forms", &["../guide"])).await;

    let config = create_test_config(&base_url, &dir, 50);
    let corpus_path = config.output.corpus_path.clone();
    let queue_path = config.output.queue_path.clone();

    let report = run_crawl(config, false).await.expect("Crawl failed");

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.pages_accepted, 3);
    assert_eq!(report.chunks_added, 3);
    assert_eq!(report.pending_remaining, 0);
    assert!(report.errors.is_empty(), "Unexpected errors: {:?}", report.errors);

    let corpus = JsonCorpusStore::new(&corpus_path)
        .try_load()
        .expect("Failed to read corpus");
    assert_eq!(corpus.len(), 3);

    let forms = corpus
        .iter()
        .find(|c| c.title == "Forms")
        .expect("Forms page missing from corpus");
    assert_eq!(forms.url, format!("{}/guide/forms", base_url));
    assert_eq!(forms.section.as_deref(), Some("Getting Started"));
    assert!(forms.content.starts_with("Getting Started\n\n"));
    assert!(!forms.content.contains("Copyright"));

    let pending = PendingQueue::new(&queue_path).load().expect("Failed to read queue");
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_robots_disallowed_pages_are_not_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_robots(&mock_server, "User-agent: *\nDisallow: /private").await;
    mount_page(&mock_server, "/", doc_page("Home", &["/private/keys", "/public"])).await;
    mount_page(&mock_server, "/public", doc_page("Public", &[])).await;

    Mock::given(method("GET"))
        .and(path("/private/keys"))
        .respond_with(html(doc_page("Secret", &[])))
        .expect(0) // Should never be called
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &dir, 50);
    let report = run_crawl(config, false).await.expect("Crawl failed");

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.pages_accepted, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].url, format!("{}/private/keys", base_url));
    assert!(report.errors[0].message.contains("robots.txt"));

    // Wiremock will automatically verify expect(0) when the mock server drops
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", doc_page("Home", &["/broken", "/gone", "/ok"])).await;
    mount_page(&mock_server, "/ok", doc_page("Ok", &[])).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    // "/gone" is unmatched and answers 404

    let config = create_test_config(&base_url, &dir, 50);
    let report = run_crawl(config, false).await.expect("Crawl failed");

    assert_eq!(report.pages_visited, 4);
    assert_eq!(report.pages_accepted, 2);
    assert_eq!(report.errors.len(), 2);

    let mut failed: Vec<&str> = report.errors.iter().map(|e| e.url.as_str()).collect();
    failed.sort();
    assert_eq!(
        failed,
        vec![format!("{}/broken", base_url), format!("{}/gone", base_url)]
    );
}

#[tokio::test]
async fn test_thin_pages_are_rejected_but_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_robots(&mock_server, "").await;
    mount_page(
        &mock_server,
        "/",
        r#"<html><body><main><p>Loading...</p><a href="/real">Docs</a></main></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(&mock_server, "/real", doc_page("Real", &[])).await;

    let config = create_test_config(&base_url, &dir, 50);
    let report = run_crawl(config, false).await.expect("Crawl failed");

    assert_eq!(report.pages_rejected, 1);
    assert_eq!(report.pages_accepted, 1);
    assert_eq!(report.chunks_added, 1);
}

#[tokio::test]
async fn test_budget_then_resume_never_refetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(doc_page("Home", &["/a", "/b"])))
        .expect(1) // Only the first run may fetch the seed
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/a", doc_page("Alpha", &["/", "/b"])).await;
    mount_page(&mock_server, "/b", doc_page("Beta", &["/a"])).await;

    // First run: budget of one page leaves the discovered links pending
    let config = create_test_config(&base_url, &dir, 1);
    let queue_path = config.output.queue_path.clone();
    let corpus_path = config.output.corpus_path.clone();

    let first = run_crawl(config.clone(), false).await.expect("First crawl failed");
    assert_eq!(first.pages_visited, 1);
    assert_eq!(first.pending_remaining, 2);

    let pending: Vec<String> = PendingQueue::new(&queue_path)
        .load()
        .expect("Failed to read queue")
        .iter()
        .map(|u| u.to_string())
        .collect();
    assert_eq!(
        pending,
        vec![format!("{}/a", base_url), format!("{}/b", base_url)]
    );

    // Second run resumes from the queue
    let mut resumed_config = config.clone();
    resumed_config.crawler.max_pages = 10;
    let second = run_crawl(resumed_config.clone(), false)
        .await
        .expect("Second crawl failed");
    assert_eq!(second.pages_visited, 2);
    assert_eq!(second.chunks_added, 2);
    assert_eq!(second.pending_remaining, 0);

    // Third run: queue is empty and the seed is already crawled
    let third = run_crawl(resumed_config, false)
        .await
        .expect("Third crawl failed");
    assert_eq!(third.pages_visited, 0);
    assert_eq!(third.chunks_added, 0);

    let corpus = JsonCorpusStore::new(&corpus_path)
        .try_load()
        .expect("Failed to read corpus");
    let titles: Vec<&str> = corpus.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles.len(), 3);
    assert_eq!(titles[0], "Home");
}

#[tokio::test]
async fn test_out_of_scope_links_are_ignored() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/docs",
        doc_page(
            "Docs",
            &["/docs/setup", "/blog/launch", "mailto:team@example.com", "https://elsewhere.example.org/docs"],
        ),
    )
    .await;
    mount_page(&mock_server, "/docs/setup", doc_page("Setup", &[])).await;
    Mock::given(method("GET"))
        .and(path("/blog/launch"))
        .respond_with(html(doc_page("Blog", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, &dir, 50);
    config.sites[0].seeds = vec![format!("{}/docs", base_url)];
    config.sites[0].include_paths = vec!["/docs".to_string()];

    let report = run_crawl(config, false).await.expect("Crawl failed");
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.pending_remaining, 0);
}

#[tokio::test]
async fn test_relative_links_resolve_against_directory_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    let location = format!("{}/guide/", base_url);
    Mock::given(method("GET"))
        .and(path("/guide"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", location.as_str()))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/guide/", doc_page("Guide", &["install"])).await;
    mount_page(&mock_server, "/guide/install", doc_page("Install", &[])).await;
    Mock::given(method("GET"))
        .and(path("/install"))
        .respond_with(html(doc_page("Wrong", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, &dir, 50);
    config.sites[0].seeds = vec![location.clone()];
    let corpus_path = config.output.corpus_path.clone();

    let report = run_crawl(config, false).await.expect("Crawl failed");
    assert_eq!(report.pages_visited, 2);
    assert!(report.errors.is_empty(), "Unexpected errors: {:?}", report.errors);

    let corpus = JsonCorpusStore::new(&corpus_path)
        .try_load()
        .expect("Failed to read corpus");
    let mut pages: Vec<(String, String)> = corpus
        .iter()
        .map(|c| (c.title.clone(), c.url.clone()))
        .collect();
    pages.sort();
    assert_eq!(
        pages,
        vec![
            ("Guide".to_string(), format!("{}/guide", base_url)),
            ("Install".to_string(), format!("{}/guide/install", base_url)),
        ]
    );
}

#[tokio::test]
async fn test_damaged_corpus_survives_a_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", doc_page("Home", &[])).await;

    let config = create_test_config(&base_url, &dir, 50);
    let damaged = r#"[{"content":"Kept","metadata":{"url":"https://docs.example.com/a","title":"A"}},{"content":"Also kept","metadata":{"url":"https://docs.example.com/b","title":"B"}},{"content":"#;
    std::fs::write(&config.output.corpus_path, damaged).expect("Failed to write corpus");

    run_crawl(config, false).await.expect("Crawl failed");

    let backup = std::fs::read_dir(dir.path())
        .expect("Failed to list temp dir")
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("documents.json.corrupt-")
        })
        .expect("Damaged corpus was not kept");
    assert_eq!(
        std::fs::read_to_string(backup.path()).expect("Failed to read backup"),
        damaged
    );
}
