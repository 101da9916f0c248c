//! Docsift main entry point
//!
//! This is the command-line interface for the Docsift documentation crawler.

use anyhow::Context;
use clap::Parser;
use docsift::config::{load_config_with_hash, Config};
use docsift::context::{format_context, DEFAULT_K};
use docsift::crawler::crawl;
use docsift::output::{compute_statistics, print_report, print_statistics};
use docsift::storage::{CorpusStore, JsonCorpusStore, PendingQueue};
use docsift::Retriever;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Docsift: a resumable documentation crawler and lexical retriever
///
/// Docsift crawls configured documentation sites, splits pages into
/// heading-delimited chunks, stores them as a JSON corpus and answers
/// keyword queries against it.
#[derive(Parser, Debug)]
#[command(name = "docsift")]
#[command(version)]
#[command(about = "A resumable documentation crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore the pending queue and start from the configured seeds
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "search"])]
    dry_run: bool,

    /// Show corpus statistics and exit
    #[arg(long, conflicts_with_all = ["dry_run", "search"])]
    stats: bool,

    /// Search the corpus and print the formatted context block
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["dry_run", "stats"])]
    search: Option<String>,

    /// Number of chunks to return with --search
    #[arg(short = 'k', long, default_value_t = DEFAULT_K)]
    top_k: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = cli.search.as_deref() {
        handle_search(&config, query, cli.top_k).await;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docsift=info,warn"),
            1 => EnvFilter::new("docsift=debug,info"),
            2 => EnvFilter::new("docsift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated config and seed plan
fn handle_dry_run(config: &Config) {
    println!("=== Docsift Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages
    );
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout_ms);
    println!("  Settle delay: {}ms", config.crawler.settle_delay_ms);
    println!(
        "  Min content length: {} chars",
        config.crawler.min_content_length
    );
    println!("  Renderer: {:?}", config.crawler.renderer);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    println!("  Max chunk size: {} chars", config.chunker.max_chunk_size);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Corpus: {}", config.output.corpus_path);
    println!("  Pending queue: {}", config.output.queue_path);

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        println!(
            "  - {} (include: {})",
            site.base_url,
            site.include_paths.join(", ")
        );
        for seed in site.seed_urls() {
            println!("    * {}", seed);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.seed_urls().count()
    );
}

/// Handles the --stats mode: shows statistics about the stored corpus
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Corpus: {}\n", config.output.corpus_path);

    let store = JsonCorpusStore::new(&config.output.corpus_path);
    let chunks = store
        .try_load()
        .with_context(|| format!("Cannot read corpus {}", config.output.corpus_path))?;

    let pending = PendingQueue::new(&config.output.queue_path)
        .load()
        .map(|urls| urls.len())
        .unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            0
        });

    print_statistics(&compute_statistics(&chunks, pending));
    Ok(())
}

/// Handles the --search mode: prints the context block for a query
async fn handle_search(config: &Config, query: &str, k: usize) {
    let retriever = Retriever::from_path(&config.output.corpus_path);
    let results = retriever.search(query, k).await;

    for (i, result) in results.iter().enumerate() {
        tracing::info!("#{} score {:.1}: {}", i + 1, result.score, result.chunk.url);
    }
    println!("{}", format_context(&results));
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring pending queue)");
    } else {
        tracing::info!("Starting crawl (will resume from pending queue if present)");
    }

    tracing::info!(
        "Sites: {}, seed URLs: {}",
        config.sites.len(),
        config.seed_urls().count()
    );

    // Run the crawler
    match crawl(config, fresh).await {
        Ok(report) => {
            tracing::info!("Crawl completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
