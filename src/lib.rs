//! Hubcrawl: a selector-driven article harvester
//!
//! This crate crawls configured source sites ("hubs"), discovers article links on
//! each hub's index page, extracts structured fields with the hub's CSS selectors,
//! and stores every article URL exactly once.

pub mod config;
pub mod crawler;
pub mod model;
pub mod storage;

use thiserror::Error;

/// Main error type for Hubcrawl operations
#[derive(Debug, Error)]
pub enum HubcrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Hub not found: {0}")]
    HubNotFound(i64),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlError, CrawlReport, Crawler, ErrorKind};
pub use model::{ArticleRecord, ExtractedRecord, HubConfig, SelectorSet};
