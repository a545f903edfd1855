//! Dedup and persistence gateway
//!
//! Filters a crawl batch against URLs already on file for the hub and writes the
//! remainder in one transaction.

use crate::model::{ArticleRecord, ExtractedRecord};
use crate::storage::{Storage, StorageError, StorageResult};
use chrono::Utc;
use std::sync::Mutex;

/// Outcome of a successful store step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreOutcome {
    /// Rows written by this call
    pub inserted: usize,
    /// Records dropped because their URL was already known or repeated in the batch
    pub skipped: usize,
}

/// Stores the records of `batch` whose source URL is not yet known
///
/// The store lock is held across the read and the insert. `first_seen_at` is
/// stamped here, at insert time. If the transaction fails nothing is stored.
pub fn store_new<S: Storage>(
    storage: &Mutex<S>,
    hub_id: i64,
    batch: Vec<ExtractedRecord>,
) -> StorageResult<StoreOutcome> {
    let total = batch.len();
    let mut storage = storage
        .lock()
        .map_err(|_| StorageError::Database("storage lock poisoned".to_string()))?;

    let mut known = storage.list_known_urls(hub_id)?;
    let now = Utc::now();

    let fresh: Vec<ArticleRecord> = batch
        .into_iter()
        .filter(|record| known.insert(record.source_url.clone()))
        .map(|record| ArticleRecord::from_extracted(hub_id, record, now))
        .collect();

    if fresh.is_empty() {
        tracing::debug!("Hub {}: nothing new among {} records", hub_id, total);
        return Ok(StoreOutcome {
            inserted: 0,
            skipped: total,
        });
    }

    let inserted = storage.bulk_insert(hub_id, &fresh)?;
    tracing::debug!(
        "Hub {}: inserted {} of {} candidate records",
        hub_id,
        inserted,
        fresh.len()
    );

    Ok(StoreOutcome {
        inserted,
        skipped: total - inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubEntry;
    use crate::storage::SqliteStorage;

    fn record(url: &str) -> ExtractedRecord {
        ExtractedRecord {
            source_url: url.to_string(),
            title: "t".to_string(),
            author_name: "a".to_string(),
            author_url: "#".to_string(),
            raw_publication_date: None,
            publication_date: Utc::now(),
            date_estimated: true,
            content: "c".to_string(),
            fallbacks: vec![],
        }
    }

    fn storage() -> Mutex<SqliteStorage> {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .sync_hubs(&[HubEntry {
                id: 1,
                name: "hub".to_string(),
                url: "https://x.example/".to_string(),
                fetch_interval: 10,
                selectors: None,
            }])
            .unwrap();
        Mutex::new(storage)
    }

    #[test]
    fn test_store_new_filters_known_urls() {
        let storage = storage();

        let first = store_new(&storage, 1, vec![record("https://x.example/1")]).unwrap();
        assert_eq!(first.inserted, 1);

        let second = store_new(
            &storage,
            1,
            vec![record("https://x.example/1"), record("https://x.example/2")],
        )
        .unwrap();
        assert_eq!(second, StoreOutcome { inserted: 1, skipped: 1 });

        assert_eq!(storage.lock().unwrap().count_articles(1).unwrap(), 2);
    }

    #[test]
    fn test_store_new_drops_duplicates_within_batch() {
        let storage = storage();
        let outcome = store_new(
            &storage,
            1,
            vec![record("https://x.example/1"), record("https://x.example/1")],
        )
        .unwrap();
        assert_eq!(outcome, StoreOutcome { inserted: 1, skipped: 1 });
    }

    #[test]
    fn test_store_new_empty_batch() {
        let storage = storage();
        let outcome = store_new(&storage, 1, vec![]).unwrap();
        assert_eq!(outcome, StoreOutcome::default());
    }

    #[test]
    fn test_store_new_reports_failed_transaction() {
        let storage = storage();
        let result = store_new(&storage, 42, vec![record("https://x.example/1")]);
        assert!(result.is_err());
        assert_eq!(storage.lock().unwrap().count_articles(42).unwrap(), 0);
    }
}
