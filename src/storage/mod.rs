//! Storage module for persisting hubs and articles
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Hub and selector configuration reads (and loading them from config)
//! - Article deduplication and atomic bulk insertion

mod gateway;
mod schema;
mod sqlite;
mod traits;

pub use gateway::{store_new, StoreOutcome};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, StorageError> {
    SqliteStorage::new(path)
}
