//! Hubcrawl main entry point
//!
//! This is the command-line interface for the Hubcrawl article harvester.

use clap::Parser;
use hubcrawl::config::{load_config_with_hash, Config};
use hubcrawl::crawler::{CrawlReport, Crawler, HttpFetcher};
use hubcrawl::storage::{open_storage, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

type AppCrawler = Crawler<HttpFetcher, SqliteStorage>;

/// Hubcrawl: a selector-driven article harvester
///
/// Hubcrawl fetches each configured hub's index page, follows its article
/// links, extracts fields with the hub's CSS selectors, and stores every
/// article URL once.
#[derive(Parser, Debug)]
#[command(name = "hubcrawl")]
#[command(version)]
#[command(about = "A selector-driven article harvester", long_about = None)]
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

    /// Crawl only the hub with this ID
    #[arg(long, value_name = "ID")]
    hub: Option<i64>,

    /// Keep running and crawl each hub whenever its fetch interval has elapsed
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    watch: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "watch"])]
    dry_run: bool,

    /// Show per-hub article counts from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "watch"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let synced = storage.sync_hubs(&config.hubs)?;
    tracing::debug!("Loaded {} hubs into {}", synced, config.output.database_path);

    if cli.stats {
        return handle_stats(&storage);
    }

    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)?;
    let crawler = Arc::new(
        Crawler::new(fetcher, Arc::new(Mutex::new(storage)))
            .with_max_concurrent_fetches(config.crawler.max_concurrent_fetches),
    );

    if cli.watch {
        handle_watch(crawler, cli.hub, config.scheduler.tick_seconds).await
    } else {
        handle_crawl(&crawler, cli.hub).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hubcrawl=info,warn"),
            1 => EnvFilter::new("hubcrawl=debug,info"),
            2 => EnvFilter::new("hubcrawl=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Hubcrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Watch tick: {}s", config.scheduler.tick_seconds);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nHubs ({}):", config.hubs.len());
    for hub in &config.hubs {
        println!(
            "  - [{}] {} every {} min: {}",
            hub.id, hub.name, hub.fetch_interval, hub.url
        );
        match &hub.selectors {
            Some(selectors) => {
                let fields = [
                    ("article-link", &selectors.article_link),
                    ("title", &selectors.title),
                    ("author", &selectors.author),
                    ("author-url", &selectors.author_url),
                    ("publication-date", &selectors.publication_date),
                    ("content", &selectors.content),
                ];
                for (name, value) in fields {
                    println!("    * {}: {}", name, value.as_deref().unwrap_or("-"));
                }
            }
            None => println!("    ! no selectors, crawl will be skipped"),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows article counts per hub
fn handle_stats(storage: &SqliteStorage) -> Result<(), Box<dyn std::error::Error>> {
    let hubs = storage.list_hubs()?;
    let mut total = 0;

    println!("=== Hubcrawl Statistics ===\n");
    for hub in &hubs {
        let count = storage.count_articles(hub.id)?;
        total += count;
        let last = hub
            .last_fetched_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  [{}] {:<30} {:>6} articles  (last crawled: {})",
            hub.id, hub.name, count, last
        );
    }
    println!("\nTotal: {} articles across {} hubs", total, hubs.len());

    Ok(())
}

/// Handles a one-shot crawl of one hub or all hubs
async fn handle_crawl(
    crawler: &Arc<AppCrawler>,
    hub_id: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reports = match hub_id {
        Some(id) => vec![crawler.crawl_hub(id).await?],
        None => crawler.crawl_all().await?,
    };

    for report in &reports {
        record_fetched(crawler, report);
        print_report(report);
    }

    Ok(())
}

/// Handles the --watch mode: crawls due hubs on every tick until interrupted
async fn handle_watch(
    crawler: Arc<AppCrawler>,
    only_hub: Option<i64>,
    tick_seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(Duration::from_secs(tick_seconds));
    tracing::info!("Watching hubs, checking every {}s (Ctrl-C to stop)", tick_seconds);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
                return Ok(());
            }
        }

        let now = chrono::Utc::now();
        let due: Vec<_> = {
            let storage = crawler
                .storage()
                .lock()
                .map_err(|_| "storage lock poisoned")?;
            storage
                .list_hubs()?
                .into_iter()
                .filter(|hub| only_hub.map_or(true, |id| id == hub.id))
                .filter(|hub| hub.is_due(now))
                .collect()
        };

        if due.is_empty() {
            tracing::debug!("No hubs due");
            continue;
        }

        let mut tasks = tokio::task::JoinSet::new();
        for hub in due {
            let crawler = Arc::clone(&crawler);
            tasks.spawn(async move { crawler.crawl(&hub).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => {
                    record_fetched(&crawler, &report);
                    print_report(&report);
                }
                Err(e) => tracing::error!("Hub crawl task failed: {}", e),
            }
        }
    }
}

/// Stamps the hub's last crawl time so watch mode waits a full interval
fn record_fetched(crawler: &AppCrawler, report: &CrawlReport) {
    let Ok(mut storage) = crawler.storage().lock() else {
        tracing::error!("Storage lock poisoned, cannot record crawl time");
        return;
    };
    if let Err(e) = storage.mark_fetched(report.hub_id, chrono::Utc::now()) {
        tracing::warn!("Failed to record crawl time for hub {}: {}", report.hub_id, e);
    }
}

fn print_report(report: &CrawlReport) {
    println!("{}", report);
    for entry in &report.errors {
        println!("  {}", entry);
    }
}
