//! Hub and selector configuration as read by the crawler

use chrono::{DateTime, Duration, Utc};
use url::Url;

/// A configured source site
///
/// The crawler only reads hubs; the configuration store owns and mutates them.
#[derive(Debug, Clone, PartialEq)]
pub struct HubConfig {
    pub id: i64,
    pub name: String,
    /// Base URL of the hub's index page; relative article links resolve against it
    pub base_url: Url,
    pub fetch_interval_minutes: u32,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl HubConfig {
    /// Returns true if the hub should be crawled at `now`
    ///
    /// A hub that was never fetched is always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_fetched_at {
            None => true,
            Some(last) => last + Duration::minutes(i64::from(self.fetch_interval_minutes)) <= now,
        }
    }
}

/// The six selector strings used to read one hub's pages
///
/// Every selector is optional. A missing or blank selector is a valid
/// configuration and simply triggers the field's fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorSet {
    pub hub_id: i64,
    pub article_link: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub publication_date: Option<String>,
    pub content: Option<String>,
}

impl SelectorSet {
    /// Creates an empty selector set for a hub
    pub fn new(hub_id: i64) -> Self {
        Self {
            hub_id,
            ..Self::default()
        }
    }
}
