//! Per-crawl outcome summary

use std::fmt;

/// Category of a problem met during a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The hub has no selector set (or its configuration could not be read)
    Config,
    /// A request failed or returned a non-success status
    Transport,
    /// A field fell back to its sentinel; the record is still stored
    Extraction,
    /// The store transaction failed; nothing from this crawl was stored
    Persistence,
}

impl ErrorKind {
    /// Extraction problems are warnings: they never keep a record from being stored
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Extraction)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Transport => "transport",
            Self::Extraction => "extraction",
            Self::Persistence => "persistence",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured entry in a [`CrawlReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlError {
    pub kind: ErrorKind,
    /// The hub or article URL the problem relates to
    pub url: String,
    pub message: String,
}

impl CrawlError {
    pub fn new(kind: ErrorKind, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = if self.kind.is_warning() { "warning" } else { "error" };
        write!(f, "[{} {}] {}: {}", level, self.kind, self.url, self.message)
    }
}

/// Summary of one hub crawl
///
/// Counts and entries are aggregates; their values do not depend on the order
/// in which article fetches completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub hub_id: i64,
    /// Distinct article URLs found on the index page
    pub count_discovered: usize,
    /// Articles fetched with a success status
    pub count_fetched: usize,
    /// Articles newly written to the store
    pub count_stored: usize,
    pub errors: Vec<CrawlError>,
}

impl CrawlReport {
    pub fn new(hub_id: i64) -> Self {
        Self {
            hub_id,
            count_discovered: 0,
            count_fetched: 0,
            count_stored: 0,
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, kind: ErrorKind, url: impl Into<String>, message: impl Into<String>) {
        self.errors.push(CrawlError::new(kind, url, message));
    }

    /// Entries of a given kind
    pub fn errors_of(&self, kind: ErrorKind) -> impl Iterator<Item = &CrawlError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// Returns true if any entry is worse than a warning
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.kind.is_warning())
    }

    pub fn warning_count(&self) -> usize {
        self.errors.iter().filter(|e| e.kind.is_warning()).count()
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hub {}: {} discovered, {} fetched, {} stored, {} errors, {} warnings",
            self.hub_id,
            self.count_discovered,
            self.count_fetched,
            self.count_stored,
            self.errors.len() - self.warning_count(),
            self.warning_count()
        )
    }
}
