//! Article link discovery on a hub's index page

use crate::crawler::extractor::parse_selector;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Finds article links on an index page
///
/// Applies the `article_link` selector, reads each match's `href`, resolves it
/// against the hub's base URL and drops repeats. Order of first appearance is kept.
///
/// # Example
///
/// ```
/// use hubcrawl::crawler::discover_links;
/// use url::Url;
///
/// let base = Url::parse("https://x.example/").unwrap();
/// let links = discover_links(r#"<a href="/a/1">One</a>"#, Some("a"), &base);
/// assert_eq!(links, vec!["https://x.example/a/1".to_string()]);
/// ```
pub fn discover_links(document: &str, article_link: Option<&str>, base_url: &Url) -> Vec<String> {
    let Some(selector) = parse_selector(article_link) else {
        return Vec::new();
    };

    let html = Html::parse_document(document);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in html.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(absolute_url) = resolve_link(href, base_url) {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment is dropped, so `/a/1#comments` and `/a/1` are the same article.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://x.example/").unwrap()
    }

    #[test]
    fn test_relative_link_resolves_against_base() {
        let links = discover_links(r#"<a href="/a/1">x</a>"#, Some("a"), &base_url());
        assert_eq!(links, vec!["https://x.example/a/1"]);
    }

    #[test]
    fn test_relative_path_uses_base_directory() {
        let base = Url::parse("https://x.example/blog/").unwrap();
        let links = discover_links(r#"<a href="post-1">x</a>"#, Some("a"), &base);
        assert_eq!(links, vec!["https://x.example/blog/post-1"]);
    }

    #[test]
    fn test_absolute_link_kept() {
        let links = discover_links(
            r#"<a href="https://other.example/p">x</a>"#,
            Some("a"),
            &base_url(),
        );
        assert_eq!(links, vec!["https://other.example/p"]);
    }

    #[test]
    fn test_duplicates_collapse_after_resolution() {
        let html = r#"
            <a href="/a/1">one</a>
            <a href="https://x.example/a/1">again</a>
            <a href="/a/1#comments">comments</a>
            <a href="/a/2">two</a>
        "#;
        let links = discover_links(html, Some("a"), &base_url());
        assert_eq!(links, vec!["https://x.example/a/1", "https://x.example/a/2"]);
    }

    #[test]
    fn test_selector_limits_matches() {
        let html = r#"
            <nav><a href="/about">About</a></nav>
            <article><a class="post" href="/p/1">Post</a></article>
        "#;
        let links = discover_links(html, Some("a.post"), &base_url());
        assert_eq!(links, vec!["https://x.example/p/1"]);
    }

    #[test]
    fn test_matches_without_href_are_skipped() {
        let html = r#"<div class="post">no link</div><a class="post" href="/p/1">x</a>"#;
        let links = discover_links(html, Some(".post"), &base_url());
        assert_eq!(links, vec!["https://x.example/p/1"]);
    }

    #[test]
    fn test_missing_selector_yields_nothing() {
        let html = r#"<a href="/a/1">x</a>"#;
        assert!(discover_links(html, None, &base_url()).is_empty());
        assert!(discover_links(html, Some(""), &base_url()).is_empty());
    }

    #[test]
    fn test_skips_non_http_links() {
        let html = r##"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:a@x.example">mail</a>
            <a href="tel:+100">tel</a>
            <a href="data:text/html,hi">data</a>
            <a href="#top">top</a>
            <a href="ftp://x.example/file">ftp</a>
        "##;
        assert!(discover_links(html, Some("a"), &base_url()).is_empty());
    }

    #[test]
    fn test_two_hubs_resolve_same_href_differently() {
        let a = Url::parse("https://a.example/").unwrap();
        let b = Url::parse("https://b.example/").unwrap();
        assert_ne!(resolve_link("/p/1", &a), resolve_link("/p/1", &b));
    }
}
