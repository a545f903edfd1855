//! Selector-driven field extraction
//!
//! [`extract`] turns an article document into an [`ExtractedRecord`] using a hub's
//! [`SelectorSet`]. It never fails: every field has a fallback.
//!
//! | field            | source                                   | fallback      |
//! |------------------|------------------------------------------|---------------|
//! | title            | text of first `title` match              | "untitled"    |
//! | author           | text of first `author` match             | "anonymous"   |
//! | author URL       | `href` of first `author_url` match       | "#"           |
//! | publication date | `datetime`, else `title` attribute       | processing time |
//! | content          | whitelisted descendants of `content`     | "no content"  |

use crate::model::{
    ExtractedRecord, Field, SelectorSet, ANONYMOUS, NO_AUTHOR_URL, NO_CONTENT, UNTITLED,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Tags whose text makes up an article body
const CONTENT_TAGS: &[&str] = &[
    "p", "pre", "code", "blockquote", "div", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Content tags that start a new line inside a container `div`
const BLOCK_TAGS: &[&str] = &[
    "p", "pre", "blockquote", "div", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Extracts every field of an article document
///
/// `source_url` is the absolute URL the document came from; it is used to
/// resolve relative author links. `now` is the processing time substituted for
/// an unparseable publication date.
pub fn extract(
    document: &str,
    source_url: &str,
    selectors: &SelectorSet,
    now: DateTime<Utc>,
) -> ExtractedRecord {
    let html = Html::parse_document(document);
    let mut fallbacks = Vec::new();

    let title = first_match(&html, selectors.title.as_deref())
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| {
            fallbacks.push(Field::Title);
            UNTITLED.to_string()
        });

    let author_name = first_match(&html, selectors.author.as_deref())
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| {
            fallbacks.push(Field::Author);
            ANONYMOUS.to_string()
        });

    let author_url = first_match(&html, selectors.author_url.as_deref())
        .and_then(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_href(source_url, href))
        .unwrap_or_else(|| {
            fallbacks.push(Field::AuthorUrl);
            NO_AUTHOR_URL.to_string()
        });

    let raw_publication_date = first_match(&html, selectors.publication_date.as_deref())
        .and_then(raw_date_attribute);
    let (publication_date, date_estimated) = match raw_publication_date
        .as_deref()
        .and_then(parse_publication_date)
    {
        Some(date) => (date, false),
        None => {
            fallbacks.push(Field::PublicationDate);
            (now, true)
        }
    };

    let content = first_match(&html, selectors.content.as_deref())
        .map(content_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| {
            fallbacks.push(Field::Content);
            NO_CONTENT.to_string()
        });

    ExtractedRecord {
        source_url: source_url.to_string(),
        title,
        author_name,
        author_url,
        raw_publication_date,
        publication_date,
        date_estimated,
        content,
        fallbacks,
    }
}

/// Parses a selector string, treating blank or invalid selectors as absent
pub(crate) fn parse_selector(selector: Option<&str>) -> Option<Selector> {
    let selector = selector.map(str::trim).filter(|s| !s.is_empty())?;
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Ignoring unparseable selector '{}': {:?}", selector, e);
            None
        }
    }
}

fn first_match<'a>(html: &'a Html, selector: Option<&str>) -> Option<ElementRef<'a>> {
    let selector = parse_selector(selector)?;
    html.select(&selector).next()
}

/// Text of an element with whitespace runs collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

fn raw_date_attribute(element: ElementRef<'_>) -> Option<String> {
    let value = element.value();
    [value.attr("datetime"), value.attr("title")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|attr| !attr.is_empty())
        .map(str::to_string)
}

fn resolve_href(source_url: &str, href: &str) -> String {
    Url::parse(source_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Builds the article body from the node matched by the content selector
///
/// Whitelisted descendants contribute their full text, one per line. A `div`
/// that wraps block-level tags is walked as a container instead (see
/// [`collect_container`]). Inline tags such as `code` never split a `div`. If
/// nothing non-blank is collected the whole node's text is used.
fn content_text(root: ElementRef<'_>) -> String {
    let mut blocks = Vec::new();
    collect_blocks(root, &mut blocks);

    if blocks.is_empty() {
        element_text(root)
    } else {
        blocks.join("\n")
    }
}

fn collect_blocks(parent: ElementRef<'_>, blocks: &mut Vec<String>) {
    for child in parent.children().filter_map(ElementRef::wrap) {
        if CONTENT_TAGS.contains(&child.value().name()) {
            collect_content_element(child, blocks);
        } else {
            collect_blocks(child, blocks);
        }
    }
}

fn collect_content_element(element: ElementRef<'_>, blocks: &mut Vec<String>) {
    if element.value().name() == "div" && has_block_descendant(element) {
        collect_container(element, blocks);
    } else {
        push_block(blocks, element_text(element));
    }
}

/// Walks a `div` that holds block-level children
///
/// Each block child is collected on its own. Loose text and inline elements
/// between blocks are kept as one block per run.
fn collect_container(container: ElementRef<'_>, blocks: &mut Vec<String>) {
    let mut run = String::new();

    for child in container.children() {
        if let Some(element) = ElementRef::wrap(child) {
            if BLOCK_TAGS.contains(&element.value().name()) {
                push_block(blocks, collapse_whitespace(&run));
                run.clear();
                collect_content_element(element, blocks);
            } else {
                run.extend(element.text());
            }
        } else if let Some(text) = child.value().as_text() {
            run.push_str(text);
        }
    }

    push_block(blocks, collapse_whitespace(&run));
}

fn has_block_descendant(element: ElementRef<'_>) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|e| BLOCK_TAGS.contains(&e.value().name()))
}

fn push_block(blocks: &mut Vec<String>, text: String) {
    if !text.is_empty() {
        blocks.push(text);
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses an ISO-8601 date or timestamp
///
/// Accepts RFC 3339 with offset, naive date-times (taken as UTC) and bare dates
/// (midnight UTC).
pub fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
