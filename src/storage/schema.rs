//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Hubcrawl database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Configured source sites
CREATE TABLE IF NOT EXISTS hubs (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    fetch_interval INTEGER NOT NULL DEFAULT 10 CHECK (fetch_interval > 0),
    last_fetched_at TEXT
);

-- At most one selector set per hub
CREATE TABLE IF NOT EXISTS hub_selectors (
    hub_id INTEGER PRIMARY KEY REFERENCES hubs(id) ON DELETE CASCADE,
    article_link TEXT,
    title TEXT,
    author TEXT,
    author_url TEXT,
    publication_date TEXT,
    content TEXT
);

-- Stored articles, unique by source URL across all hubs
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_url TEXT NOT NULL UNIQUE,
    hub_id INTEGER NOT NULL REFERENCES hubs(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    author_name TEXT NOT NULL,
    author_url TEXT NOT NULL,
    publication_date TEXT,
    date_estimated INTEGER NOT NULL DEFAULT 0,
    content TEXT NOT NULL,
    first_seen_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_hub ON articles(hub_id);
CREATE INDEX IF NOT EXISTS idx_articles_publication_date ON articles(publication_date);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["hubs", "hub_selectors", "articles"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_source_url_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO hubs (id, name, url) VALUES (1, 'a', 'https://a.example/')",
            [],
        )
        .unwrap();

        let insert = "INSERT INTO articles (source_url, hub_id, title, author_name, author_url, content, first_seen_at)
                      VALUES ('https://a.example/1', 1, 't', 'a', '#', 'c', '2024-01-01T00:00:00Z')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
