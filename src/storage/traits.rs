//! Storage traits and error types
//!
//! This module defines the interface the crawler needs from its backing store:
//! reading hub configuration and reading/inserting articles.

use crate::model::{ArticleRecord, HubConfig, SelectorSet};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The crawler never mutates hub configuration; `mark_fetched` exists for the
/// scheduling layer that decides when to invoke a crawl.
pub trait Storage {
    // ===== Hub Configuration =====

    /// Lists every configured hub, ordered by name
    fn list_hubs(&self) -> StorageResult<Vec<HubConfig>>;

    /// Gets a hub by ID
    fn get_hub(&self, hub_id: i64) -> StorageResult<Option<HubConfig>>;

    /// Gets the selector set for a hub, if one is configured
    fn get_selector_set(&self, hub_id: i64) -> StorageResult<Option<SelectorSet>>;

    /// Records when a hub was last crawled
    fn mark_fetched(&mut self, hub_id: i64, at: DateTime<Utc>) -> StorageResult<()>;

    // ===== Articles =====

    /// Returns the source URLs already stored for a hub
    fn list_known_urls(&self, hub_id: i64) -> StorageResult<HashSet<String>>;

    /// Inserts records in a single transaction
    ///
    /// Either every new record is written or none is. Records whose source URL
    /// already exists anywhere in the store are skipped, never updated.
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted
    fn bulk_insert(&mut self, hub_id: i64, records: &[ArticleRecord]) -> StorageResult<usize>;

    /// Counts stored articles for a hub
    fn count_articles(&self, hub_id: i64) -> StorageResult<u64>;

    /// Lists stored articles for a hub, newest publication first
    fn list_articles(&self, hub_id: i64) -> StorageResult<Vec<ArticleRecord>>;
}
