//! Domain types shared by the crawler and the storage layer
//!
//! - [`HubConfig`] and [`SelectorSet`] describe what to crawl and how to read it
//! - [`ExtractedRecord`] is what the field extractor yields for one article
//! - [`ArticleRecord`] is a stored, deduplicated article

mod article;
mod hub;

pub use article::{
    ArticleRecord, ExtractedRecord, Field, ANONYMOUS, NO_AUTHOR_URL, NO_CONTENT, UNTITLED,
};
pub use hub::{HubConfig, SelectorSet};
