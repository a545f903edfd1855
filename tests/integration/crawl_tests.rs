//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end against an in-memory SQLite store.

use chrono::{TimeZone, Utc};
use hubcrawl::config::{CrawlerConfig, HubEntry, SelectorEntry, UserAgentConfig};
use hubcrawl::crawler::{Crawler, ErrorKind, HttpFetcher};
use hubcrawl::storage::{SqliteStorage, Storage};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HUB_ID: i64 = 1;

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn selectors() -> SelectorEntry {
    SelectorEntry {
        article_link: Some("a.post".to_string()),
        title: Some("h1".to_string()),
        author: Some(".byline a".to_string()),
        author_url: Some(".byline a".to_string()),
        publication_date: Some("time".to_string()),
        content: Some("div.c".to_string()),
    }
}

/// Builds a crawler whose single hub points at the mock server's index page
fn create_crawler(
    server: &MockServer,
    selectors: Option<SelectorEntry>,
) -> Crawler<HttpFetcher, SqliteStorage> {
    let mut storage = SqliteStorage::new_in_memory().expect("Failed to open storage");
    storage
        .sync_hubs(&[HubEntry {
            id: HUB_ID,
            name: "Mock hub".to_string(),
            url: format!("{}/", server.uri()),
            fetch_interval: 10,
            selectors,
        }])
        .expect("Failed to load hub");

    let crawler_config = CrawlerConfig {
        max_concurrent_fetches: 5,
        request_timeout_secs: 5,
    };
    let fetcher =
        HttpFetcher::from_config(&user_agent(), &crawler_config).expect("Failed to build client");

    Crawler::new(fetcher, Arc::new(Mutex::new(storage)))
        .with_max_concurrent_fetches(crawler_config.max_concurrent_fetches)
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_article() {
    let server = MockServer::start().await;

    mount_page(&server, "/", 200, r#"<a class="post" href="/a/1">One</a>"#).await;
    mount_page(
        &server,
        "/a/1",
        200,
        r#"<html><body>
            <h1>Hi</h1>
            <span class="byline"><a href="/u/ann">Ann</a></span>
            <time datetime="2024-01-02T03:04:05Z">Jan 2</time>
            <div class="c"><p>Hello</p></div>
        </body></html>"#,
    )
    .await;

    let crawler = create_crawler(&server, Some(selectors()));
    let report = crawler.crawl_hub(HUB_ID).await.expect("Crawl failed");

    assert_eq!(report.count_discovered, 1);
    assert_eq!(report.count_fetched, 1);
    assert_eq!(report.count_stored, 1);
    assert!(report.errors.is_empty(), "unexpected entries: {:?}", report.errors);

    let storage = crawler.storage().lock().unwrap();
    let articles = storage.list_articles(HUB_ID).unwrap();
    assert_eq!(articles.len(), 1);

    let article = &articles[0];
    assert_eq!(article.source_url, format!("{}/a/1", server.uri()));
    assert_eq!(article.title, "Hi");
    assert_eq!(article.author_name, "Ann");
    assert_eq!(article.author_url, format!("{}/u/ann", server.uri()));
    assert_eq!(
        article.publication_date,
        Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    );
    assert!(!article.date_estimated);
    assert_eq!(article.content, "Hello");
}

#[tokio::test]
async fn test_partial_failure_keeps_good_articles() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        200,
        r#"<a class="post" href="/a/1">1</a><a class="post" href="/a/2">2</a>"#,
    )
    .await;
    mount_page(&server, "/a/1", 200, r#"<h1>Fine</h1><div class="c"><p>ok</p></div>"#).await;
    mount_page(&server, "/a/2", 500, "Internal Server Error").await;

    let crawler = create_crawler(&server, Some(selectors()));
    let report = crawler.crawl_hub(HUB_ID).await.expect("Crawl failed");

    assert_eq!(report.count_discovered, 2);
    assert_eq!(report.count_fetched, 1);
    assert_eq!(report.count_stored, 1);

    let transport: Vec<_> = report.errors_of(ErrorKind::Transport).collect();
    assert_eq!(transport.len(), 1);
    assert_eq!(transport[0].url, format!("{}/a/2", server.uri()));
}

#[tokio::test]
async fn test_index_failure_stores_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", 503, "maintenance").await;

    let crawler = create_crawler(&server, Some(selectors()));
    let report = crawler.crawl_hub(HUB_ID).await.expect("Crawl failed");

    assert_eq!(report.count_fetched, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ErrorKind::Transport);
    assert_eq!(crawler.storage().lock().unwrap().count_articles(HUB_ID).unwrap(), 0);
}

#[tokio::test]
async fn test_hub_without_selectors_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let crawler = create_crawler(&server, None);
    let report = crawler.crawl_hub(HUB_ID).await.expect("Crawl failed");

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, ErrorKind::Config);
}

#[tokio::test]
async fn test_recrawl_is_idempotent() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        200,
        r#"<a class="post" href="/a/1">1</a><a class="post" href="/a/1#top">again</a>"#,
    )
    .await;
    mount_page(&server, "/a/1", 200, r#"<h1>Once</h1><div class="c"><p>x</p></div>"#).await;

    let crawler = create_crawler(&server, Some(selectors()));
    let first = crawler.crawl_hub(HUB_ID).await.expect("First crawl failed");
    let second = crawler.crawl_hub(HUB_ID).await.expect("Second crawl failed");

    assert_eq!(first.count_discovered, 1);
    assert_eq!(first.count_stored, 1);
    assert_eq!(second.count_stored, 0);
    assert_eq!(crawler.storage().lock().unwrap().count_articles(HUB_ID).unwrap(), 1);
}

#[tokio::test]
async fn test_missing_fields_fall_back_and_still_store() {
    let server = MockServer::start().await;

    mount_page(&server, "/", 200, r#"<a class="post" href="/a/1">1</a>"#).await;
    mount_page(&server, "/a/1", 200, "<p>bare page</p>").await;

    let crawler = create_crawler(&server, Some(selectors()));
    let before = Utc::now();
    let report = crawler.crawl_hub(HUB_ID).await.expect("Crawl failed");

    assert_eq!(report.count_stored, 1);
    assert!(!report.has_errors());
    assert_eq!(report.warning_count(), 5);

    let storage = crawler.storage().lock().unwrap();
    let article = &storage.list_articles(HUB_ID).unwrap()[0];
    assert_eq!(article.title, "untitled");
    assert_eq!(article.author_name, "anonymous");
    assert_eq!(article.author_url, "#");
    assert_eq!(article.content, "no content");
    assert!(article.date_estimated);
    assert!(article.publication_date.unwrap() >= before);
}

#[tokio::test]
async fn test_unknown_hub_is_an_error() {
    let server = MockServer::start().await;
    let crawler = create_crawler(&server, Some(selectors()));

    let result = crawler.crawl_hub(42).await;

    assert!(matches!(result, Err(hubcrawl::HubcrawlError::HubNotFound(42))));
}
