//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::config::HubEntry;
use crate::model::{ArticleRecord, HubConfig, SelectorSet};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and initializes the schema
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Loads hub entries from configuration into the hub tables
    ///
    /// Hubs are upserted by ID in one transaction. `last_fetched_at` is kept for
    /// existing hubs. A hub without a selector table loses any stored selector set.
    ///
    /// # Returns
    ///
    /// The number of hubs written
    pub fn sync_hubs(&mut self, hubs: &[HubEntry]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        for hub in hubs {
            tx.execute(
                "INSERT INTO hubs (id, name, url, fetch_interval) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    url = excluded.url,
                    fetch_interval = excluded.fetch_interval",
                params![hub.id, hub.name, hub.url, hub.fetch_interval],
            )?;

            match &hub.selectors {
                Some(entry) => {
                    let selectors = entry.to_selector_set(hub.id);
                    tx.execute(
                        "INSERT OR REPLACE INTO hub_selectors
                         (hub_id, article_link, title, author, author_url, publication_date, content)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            selectors.hub_id,
                            selectors.article_link,
                            selectors.title,
                            selectors.author,
                            selectors.author_url,
                            selectors.publication_date,
                            selectors.content,
                        ],
                    )?;
                }
                None => {
                    tx.execute(
                        "DELETE FROM hub_selectors WHERE hub_id = ?1",
                        params![hub.id],
                    )?;
                }
            }
        }

        tx.commit()?;
        Ok(hubs.len())
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .map_err(|e| StorageError::CorruptRow(format!("bad timestamp '{}': {}", value, e)))
}

/// Raw hub row; URL and timestamp are decoded outside the rusqlite closure
type HubRow = (i64, String, String, i64, Option<String>);

fn read_hub_row(row: &Row<'_>) -> rusqlite::Result<HubRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_hub((id, name, url, fetch_interval, last_fetched_at): HubRow) -> StorageResult<HubConfig> {
    let base_url = Url::parse(&url)
        .map_err(|e| StorageError::CorruptRow(format!("hub {} has bad URL '{}': {}", id, url, e)))?;
    let fetch_interval_minutes = u32::try_from(fetch_interval).map_err(|_| {
        StorageError::CorruptRow(format!("hub {} has bad fetch interval {}", id, fetch_interval))
    })?;
    let last_fetched_at = last_fetched_at.as_deref().map(parse_timestamp).transpose()?;

    Ok(HubConfig {
        id,
        name,
        base_url,
        fetch_interval_minutes,
        last_fetched_at,
    })
}

/// Raw article row
type ArticleRow = (String, i64, String, String, String, Option<String>, bool, String, String);

fn read_article_row(row: &Row<'_>) -> rusqlite::Result<ArticleRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn decode_article(row: ArticleRow) -> StorageResult<ArticleRecord> {
    let (
        source_url,
        hub_id,
        title,
        author_name,
        author_url,
        publication_date,
        date_estimated,
        content,
        first_seen_at,
    ) = row;

    Ok(ArticleRecord {
        source_url,
        hub_id,
        title,
        author_name,
        author_url,
        publication_date: publication_date.as_deref().map(parse_timestamp).transpose()?,
        date_estimated,
        content,
        first_seen_at: parse_timestamp(&first_seen_at)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Hub Configuration =====

    fn list_hubs(&self) -> StorageResult<Vec<HubConfig>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, url, fetch_interval, last_fetched_at FROM hubs ORDER BY name, id",
        )?;

        let rows = stmt
            .query_map([], read_hub_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(decode_hub).collect()
    }

    fn get_hub(&self, hub_id: i64) -> StorageResult<Option<HubConfig>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, url, fetch_interval, last_fetched_at FROM hubs WHERE id = ?1",
                params![hub_id],
                read_hub_row,
            )
            .optional()?;

        row.map(decode_hub).transpose()
    }

    fn get_selector_set(&self, hub_id: i64) -> StorageResult<Option<SelectorSet>> {
        let selectors = self
            .conn
            .query_row(
                "SELECT hub_id, article_link, title, author, author_url, publication_date, content
                 FROM hub_selectors WHERE hub_id = ?1",
                params![hub_id],
                |row| {
                    Ok(SelectorSet {
                        hub_id: row.get(0)?,
                        article_link: row.get(1)?,
                        title: row.get(2)?,
                        author: row.get(3)?,
                        author_url: row.get(4)?,
                        publication_date: row.get(5)?,
                        content: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(selectors)
    }

    fn mark_fetched(&mut self, hub_id: i64, at: DateTime<Utc>) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE hubs SET last_fetched_at = ?1 WHERE id = ?2",
            params![at.to_rfc3339(), hub_id],
        )?;
        Ok(())
    }

    // ===== Articles =====

    fn list_known_urls(&self, hub_id: i64) -> StorageResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT source_url FROM articles WHERE hub_id = ?1")?;

        let urls = stmt
            .query_map(params![hub_id], |row| row.get(0))?
            .collect::<Result<HashSet<String>, _>>()?;

        Ok(urls)
    }

    fn bulk_insert(&mut self, hub_id: i64, records: &[ArticleRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO articles
                 (source_url, hub_id, title, author_name, author_url, publication_date,
                  date_estimated, content, first_seen_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(source_url) DO NOTHING",
            )?;

            for record in records {
                if record.hub_id != hub_id {
                    return Err(StorageError::ConstraintViolation(format!(
                        "record {} belongs to hub {}, not {}",
                        record.source_url, record.hub_id, hub_id
                    )));
                }

                inserted += stmt.execute(params![
                    record.source_url,
                    hub_id,
                    record.title,
                    record.author_name,
                    record.author_url,
                    record.publication_date.map(|d| d.to_rfc3339()),
                    record.date_estimated,
                    record.content,
                    record.first_seen_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn count_articles(&self, hub_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE hub_id = ?1",
            params![hub_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn list_articles(&self, hub_id: i64) -> StorageResult<Vec<ArticleRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_url, hub_id, title, author_name, author_url, publication_date,
                    date_estimated, content, first_seen_at
             FROM articles WHERE hub_id = ?1
             ORDER BY publication_date DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(params![hub_id], read_article_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(decode_article).collect()
    }
}
