//! Crawler coordinator - hub crawl orchestration
//!
//! This module drives one hub crawl from start to finish:
//! - Taking the hub's lock and reading its selector set
//! - Fetching the index page and discovering article links
//! - Fetching and extracting articles under a per-crawl admission limit
//! - Handing the joined batch to the dedup and persistence gateway
//!
//! Nothing here keeps state between crawls beyond the per-hub lock registry.

use crate::config::DEFAULT_MAX_CONCURRENT_FETCHES;
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::links::discover_links;
use crate::crawler::locks::HubLocks;
use crate::crawler::report::{CrawlReport, ErrorKind};
use crate::model::{ExtractedRecord, HubConfig, SelectorSet};
use crate::storage::{store_new, Storage, StorageError, StoreOutcome};
use crate::HubcrawlError;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What became of one article URL
#[derive(Debug)]
enum ArticleOutcome {
    Extracted(ExtractedRecord),
    Failed(String),
}

/// Main crawler structure
///
/// Cheap to share behind an `Arc`; crawls of different hubs run fully in
/// parallel while crawls of the same hub are serialized.
pub struct Crawler<F, S> {
    fetcher: Arc<F>,
    storage: Arc<Mutex<S>>,
    max_concurrent_fetches: usize,
    locks: HubLocks,
}

impl<F, S> Crawler<F, S>
where
    F: Fetcher,
    S: Storage + Send + 'static,
{
    /// Creates a crawler with the default admission limit of 5 article fetches
    pub fn new(fetcher: F, storage: Arc<Mutex<S>>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            storage,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            locks: HubLocks::new(),
        }
    }

    /// Sets the number of article fetches a single crawl may have in flight
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }

    /// The store this crawler reads hubs from and writes articles to
    pub fn storage(&self) -> &Arc<Mutex<S>> {
        &self.storage
    }

    /// Crawls a hub by ID
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl ran; problems are listed in the report
    /// * `Err(HubcrawlError::HubNotFound)` - No hub has this ID
    /// * `Err(HubcrawlError::Storage)` - The hub table could not be read
    pub async fn crawl_hub(&self, hub_id: i64) -> Result<CrawlReport, HubcrawlError> {
        let hub = {
            let storage = self.lock_storage()?;
            storage.get_hub(hub_id)?
        };

        match hub {
            Some(hub) => Ok(self.crawl(&hub).await),
            None => Err(HubcrawlError::HubNotFound(hub_id)),
        }
    }

    /// Crawls one hub
    ///
    /// This method:
    /// 1. Waits for the hub's lock
    /// 2. Reads the selector set; without one the crawl stops before any request
    /// 3. Fetches the index page; any failure stops the crawl
    /// 4. Fetches and extracts every discovered article, at most
    ///    `max_concurrent_fetches` at a time, each failure isolated to its article
    /// 5. Once all article tasks are done, stores the new records in one transaction
    pub async fn crawl(&self, hub: &HubConfig) -> CrawlReport {
        let _hub_guard = self.locks.acquire(hub.id).await;
        let start_time = Instant::now();
        let mut report = CrawlReport::new(hub.id);
        let hub_url = hub.base_url.as_str();

        tracing::info!("Crawling hub {} '{}' at {}", hub.id, hub.name, hub_url);

        let selectors = match self.load_selectors(hub.id) {
            Ok(Some(selectors)) => selectors,
            Ok(None) => {
                tracing::error!("Hub {} has no selector set, skipping", hub.id);
                report.push(ErrorKind::Config, hub_url, "no selector set configured");
                return report;
            }
            Err(e) => {
                tracing::error!("Failed to read selectors for hub {}: {}", hub.id, e);
                report.push(
                    ErrorKind::Config,
                    hub_url,
                    format!("failed to read selector set: {}", e),
                );
                return report;
            }
        };

        let index = match self.fetcher.get(hub_url).await {
            Ok(response) if response.is_success() => response.body,
            Ok(response) => {
                tracing::error!("Index page {} returned HTTP {}", hub_url, response.status_code);
                report.push(
                    ErrorKind::Transport,
                    hub_url,
                    format!("index page returned HTTP {}", response.status_code),
                );
                return report;
            }
            Err(e) => {
                tracing::error!("Index page {} failed: {}", hub_url, e);
                report.push(ErrorKind::Transport, hub_url, format!("index page failed: {}", e));
                return report;
            }
        };

        let links = discover_links(&index, selectors.article_link.as_deref(), &hub.base_url);
        report.count_discovered = links.len();
        tracing::debug!("Hub {}: discovered {} article links", hub.id, links.len());

        if links.is_empty() {
            tracing::info!("Hub {}: no article links found", hub.id);
            return report;
        }

        let batch = self.fetch_articles(links, selectors, &mut report).await;

        if !batch.is_empty() {
            match self.store(hub.id, batch).await {
                Ok(outcome) => report.count_stored = outcome.inserted,
                Err(e) => {
                    tracing::error!("Failed to store articles for hub {}: {}", hub.id, e);
                    report.push(ErrorKind::Persistence, hub_url, e.to_string());
                }
            }
        }

        tracing::info!(
            "Hub {} done in {:?}: {} discovered, {} fetched, {} stored, {} problems",
            hub.id,
            start_time.elapsed(),
            report.count_discovered,
            report.count_fetched,
            report.count_stored,
            report.errors.len()
        );

        report
    }

    /// Crawls every configured hub concurrently
    ///
    /// Reports come back ordered by hub ID.
    pub async fn crawl_all(self: &Arc<Self>) -> Result<Vec<CrawlReport>, HubcrawlError> {
        let hubs = {
            let storage = self.lock_storage()?;
            storage.list_hubs()?
        };

        tracing::info!("Crawling {} hubs", hubs.len());

        let mut tasks = JoinSet::new();
        for hub in hubs {
            let crawler = Arc::clone(self);
            tasks.spawn(async move { crawler.crawl(&hub).await });
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => tracing::error!("Hub crawl task failed: {}", e),
            }
        }

        reports.sort_by_key(|report| report.hub_id);
        Ok(reports)
    }

    /// Fetches and extracts all articles, returning only after every task finished
    ///
    /// Each task returns its own outcome; aggregation happens here after the join.
    async fn fetch_articles(
        &self,
        links: Vec<String>,
        selectors: SelectorSet,
        report: &mut CrawlReport,
    ) -> Vec<ExtractedRecord> {
        let admission = Arc::new(Semaphore::new(self.max_concurrent_fetches));
        let selectors = Arc::new(selectors);
        let mut pending: HashSet<String> = links.iter().cloned().collect();
        let mut tasks = JoinSet::new();

        for url in links {
            let fetcher = Arc::clone(&self.fetcher);
            let admission = Arc::clone(&admission);
            let selectors = Arc::clone(&selectors);

            tasks.spawn(async move {
                let outcome = match admission.acquire_owned().await {
                    Ok(_permit) => fetch_article(fetcher.as_ref(), &url, &selectors).await,
                    Err(_) => ArticleOutcome::Failed("admission limiter closed".to_string()),
                };
                (url, outcome)
            });
        }

        let mut batch = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (url, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Article task failed: {}", e);
                    continue;
                }
            };
            pending.remove(&url);

            match outcome {
                ArticleOutcome::Extracted(record) => {
                    report.count_fetched += 1;
                    for field in &record.fallbacks {
                        tracing::warn!("{}: no {} found, using fallback", url, field);
                        report.push(
                            ErrorKind::Extraction,
                            url.as_str(),
                            format!("{} not found, fallback used", field),
                        );
                    }
                    batch.push(record);
                }
                ArticleOutcome::Failed(message) => {
                    tracing::warn!("Article {} failed: {}", url, message);
                    report.push(ErrorKind::Transport, url, message);
                }
            }
        }

        let mut lost: Vec<String> = pending.into_iter().collect();
        lost.sort();
        for url in lost {
            report.push(ErrorKind::Transport, url, "article task did not complete");
        }

        batch
    }

    /// Runs the gateway off the async workers; SQLite calls block
    async fn store(
        &self,
        hub_id: i64,
        batch: Vec<ExtractedRecord>,
    ) -> Result<StoreOutcome, StorageError> {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || store_new(&storage, hub_id, batch))
            .await
            .map_err(|e| StorageError::Database(format!("store task failed: {}", e)))?
    }

    fn load_selectors(&self, hub_id: i64) -> Result<Option<SelectorSet>, StorageError> {
        self.lock_storage()?.get_selector_set(hub_id)
    }

    fn lock_storage(&self) -> Result<std::sync::MutexGuard<'_, S>, StorageError> {
        self.storage
            .lock()
            .map_err(|_| StorageError::Database("storage lock poisoned".to_string()))
    }
}

async fn fetch_article<F: Fetcher>(
    fetcher: &F,
    url: &str,
    selectors: &SelectorSet,
) -> ArticleOutcome {
    match fetcher.get(url).await {
        Ok(response) if response.is_success() => {
            tracing::debug!("Fetched article {}", url);
            ArticleOutcome::Extracted(extract(&response.body, url, selectors, Utc::now()))
        }
        Ok(response) => ArticleOutcome::Failed(format!("HTTP {}", response.status_code)),
        Err(e) => ArticleOutcome::Failed(e.to_string()),
    }
}
