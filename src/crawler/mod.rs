//! Crawler module for hub and article processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` seam
//! - Article link discovery and field extraction
//! - Per-hub locking and bounded article fan-out
//! - Crawl reports

mod coordinator;
mod extractor;
mod fetcher;
mod links;
mod locks;
mod report;

pub use coordinator::Crawler;
pub use extractor::{extract, parse_publication_date};
pub use fetcher::{build_http_client, FetchResponse, Fetcher, HttpFetcher, TransportError};
pub use links::{discover_links, resolve_link};
pub use locks::HubLocks;
pub use report::{CrawlError, CrawlReport, ErrorKind};
