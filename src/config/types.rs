use crate::model::SelectorSet;
use serde::Deserialize;

/// Default number of simultaneous article fetches per hub crawl
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 5;

/// Main configuration structure for Hubcrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default, rename = "hub")]
    pub hubs: Vec<HubEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of in-flight article fetches within one hub crawl
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Transport timeout for a single request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

fn default_request_timeout_secs() -> u64 {
    30
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

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Watch-mode configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between checks for due hubs
    #[serde(rename = "tick-seconds", default = "default_tick_seconds")]
    pub tick_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
        }
    }
}

fn default_tick_seconds() -> u64 {
    60
}

/// A hub to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct HubEntry {
    pub id: i64,

    pub name: String,

    /// Index page URL
    pub url: String,

    /// Minutes between crawls
    #[serde(rename = "fetch-interval", default = "default_fetch_interval")]
    pub fetch_interval: i64,

    /// Absent when the hub has no selectors configured yet
    pub selectors: Option<SelectorEntry>,
}

fn default_fetch_interval() -> i64 {
    10
}

/// Selector strings for one hub
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorEntry {
    #[serde(rename = "article-link")]
    pub article_link: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "author-url")]
    pub author_url: Option<String>,
    #[serde(rename = "publication-date")]
    pub publication_date: Option<String>,
    pub content: Option<String>,
}

impl SelectorEntry {
    /// Converts the config entry into the selector set stored for `hub_id`
    pub fn to_selector_set(&self, hub_id: i64) -> SelectorSet {
        SelectorSet {
            hub_id,
            article_link: self.article_link.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            author_url: self.author_url.clone(),
            publication_date: self.publication_date.clone(),
            content: self.content.clone(),
        }
    }
}
