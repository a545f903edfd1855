//! Extracted and stored article records

use chrono::{DateTime, Utc};
use std::fmt;

/// Sentinel stored when no title could be extracted
pub const UNTITLED: &str = "untitled";
/// Sentinel stored when no author could be extracted
pub const ANONYMOUS: &str = "anonymous";
/// Sentinel stored when no author link could be extracted
pub const NO_AUTHOR_URL: &str = "#";
/// Sentinel stored when no content could be extracted
pub const NO_CONTENT: &str = "no content";

/// An article field that can fall back to a sentinel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Author,
    AuthorUrl,
    PublicationDate,
    Content,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::AuthorUrl => "author_url",
            Self::PublicationDate => "publication_date",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of running the field extractor over one article document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    /// Absolute URL the document was fetched from
    pub source_url: String,
    pub title: String,
    pub author_name: String,
    pub author_url: String,
    /// Raw date attribute as found on the page, before normalization
    pub raw_publication_date: Option<String>,
    pub publication_date: DateTime<Utc>,
    /// True when `publication_date` is the processing time rather than a parsed value
    pub date_estimated: bool,
    pub content: String,
    /// Fields that fell back to their sentinel (or, for dates, to the processing time)
    pub fallbacks: Vec<Field>,
}

/// A stored article
///
/// Records are immutable once stored; `source_url` is unique across all hubs.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub source_url: String,
    pub hub_id: i64,
    pub title: String,
    pub author_name: String,
    pub author_url: String,
    pub publication_date: Option<DateTime<Utc>>,
    pub date_estimated: bool,
    pub content: String,
    pub first_seen_at: DateTime<Utc>,
}

impl ArticleRecord {
    /// Builds a record ready for insertion from an extracted record
    pub fn from_extracted(hub_id: i64, record: ExtractedRecord, first_seen_at: DateTime<Utc>) -> Self {
        Self {
            source_url: record.source_url,
            hub_id,
            title: record.title,
            author_name: record.author_name,
            author_url: record.author_url,
            publication_date: Some(record.publication_date),
            date_estimated: record.date_estimated,
            content: record.content,
            first_seen_at,
        }
    }
}
