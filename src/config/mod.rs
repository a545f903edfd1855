//! Configuration module for Hubcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use hubcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("hubcrawl.toml")).unwrap();
//! println!("Fetching at most {} articles at once", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, HubEntry, OutputConfig, SchedulerConfig, SelectorEntry, UserAgentConfig,
    DEFAULT_MAX_CONCURRENT_FETCHES,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
