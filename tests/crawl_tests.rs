//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitelens::config::Config;
use sitelens::crawler::{CrawlEngine, CrawlOptions, CrawlTruncated, Fetcher, IssueKind};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates an engine with test budgets
fn engine(max_depth: u32, max_pages: usize) -> CrawlEngine {
    let config = Config::default();
    let fetcher = Fetcher::new(&config.user_agent, &config.crawler).expect("client builds");
    CrawlEngine::new(
        fetcher,
        CrawlOptions {
            max_depth,
            max_pages,
            max_duration: Duration::from_secs(30),
            ..CrawlOptions::default()
        },
    )
}

/// HTML page with a title and links
fn html(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
        title, title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Every HEAD check succeeds unless a more specific mock was mounted first
async fn mount_head_ok(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_depth_zero_fetches_only_start_page() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("Home", &["/b"])).await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("B", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let report = engine(0, 100)
        .crawl(&format!("{}/", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].title, "Home");
    assert_eq!(report.truncated, None);
}

#[tokio::test]
async fn test_two_page_site_with_missing_title() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("Home", &["/b"])).await;
    mount_page(&server, "/b", html("", &["/"])).await;

    let report = engine(1, 100).crawl(&format!("{}/", base)).await.unwrap();

    let urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/", base), format!("{}/b", base)]);

    let missing: Vec<_> = report.issues_of("MissingTitle").collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].url, format!("{}/b", base));
    assert_eq!(report.issues_of("DuplicateTitle").count(), 0);
    assert!(report.issues.iter().all(|i| i.kind == IssueKind::MissingTitle));
}

#[tokio::test]
async fn test_pages_never_repeat() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("Home", &["/a", "/b", "/a#top", "/"])).await;
    mount_page(&server, "/a", html("A", &["/b", "/"])).await;
    mount_page(&server, "/b", html("B", &["/a"])).await;

    let report = engine(3, 100).crawl(&format!("{}/", base)).await.unwrap();

    let mut urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls.len(), 3);
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), 3);
}

#[tokio::test]
async fn test_duplicate_title_references_first_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("Same", &["/b"])).await;
    mount_page(&server, "/b", html("Same", &[])).await;

    let report = engine(1, 100).crawl(&format!("{}/", base)).await.unwrap();

    let duplicates: Vec<_> = report.issues_of("DuplicateTitle").collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].url, format!("{}/b", base));
    assert_eq!(
        duplicates[0].kind,
        IssueKind::DuplicateTitle {
            duplicate_of: format!("{}/", base)
        }
    );
}

#[tokio::test]
async fn test_fetch_failure_records_one_issue_and_no_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("Home", &["/down"])).await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500).set_body_string(html("Down", &["/child"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("Child", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let report = engine(2, 100).crawl(&format!("{}/", base)).await.unwrap();

    assert_eq!(report.pages.len(), 1);
    let failures: Vec<_> = report.issues_of("FetchError").collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].url, format!("{}/down", base));
}

#[tokio::test]
async fn test_broken_internal_link_reported() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("Home", &["/gone", "https://external.invalid/x"])).await;

    let report = engine(0, 100).crawl(&format!("{}/", base)).await.unwrap();

    let broken: Vec<_> = report.issues_of("BrokenLink").collect();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].url, format!("{}/", base));
    assert_eq!(
        broken[0].kind,
        IssueKind::BrokenLink {
            link: format!("{}/gone", base),
            status: Some(404),
            error: None,
        }
    );
}

#[tokio::test]
async fn test_depth_one_never_fetches_grandchildren() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("A", &["/b"])).await;
    mount_page(&server, "/b", html("B", &["/c"])).await;

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("C", &[])))
        .expect(0)
        .mount(&server)
        .await;

    let report = engine(1, 100)
        .crawl(&format!("{}/", server.uri()))
        .await
        .unwrap();

    let titles: Vec<&str> = report.pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
}

#[tokio::test]
async fn test_each_link_checked_once() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("A", &["/b", "/c", "/c"])).await;
    mount_page(&server, "/b", html("B", &["/c"])).await;
    mount_page(&server, "/c", html("C", &[])).await;

    let report = engine(1, 100)
        .crawl(&format!("{}/", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.pages.len(), 3);
}

#[tokio::test]
async fn test_max_pages_truncates() {
    let server = MockServer::start().await;
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("Home", &["/b", "/c", "/d"])).await;
    mount_page(&server, "/b", html("B", &[])).await;
    mount_page(&server, "/c", html("C", &[])).await;
    mount_page(&server, "/d", html("D", &[])).await;

    let report = engine(1, 2)
        .crawl(&format!("{}/", server.uri()))
        .await
        .unwrap();

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.truncated, Some(CrawlTruncated::MaxPages { limit: 2 }));
}

#[tokio::test]
async fn test_robots_blocked_start_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_head_ok(&server).await;
    mount_page(&server, "/", html("Home", &[])).await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .mount(&server)
        .await;

    let report = engine(1, 100).crawl(&format!("{}/", base)).await.unwrap();

    let blocked: Vec<_> = report.issues_of("RobotsBlocked").collect();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].url, format!("{}/", base));
    // The report is informational; the page is still recorded
    assert_eq!(report.pages.len(), 1);
}

#[tokio::test]
async fn test_deadline_stops_link_checks_mid_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html("Home", &["/a", "/b", "/c", "/d"])).await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
        .mount(&server)
        .await;

    let config = Config::default();
    let fetcher = Fetcher::new(&config.user_agent, &config.crawler).expect("client builds");
    let engine = CrawlEngine::new(
        fetcher,
        CrawlOptions {
            max_depth: 0,
            max_pages: 100,
            max_duration: Duration::from_secs(1),
            ..CrawlOptions::default()
        },
    );

    let started = Instant::now();
    let report = engine.crawl(&format!("{}/", base)).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(
        report.truncated,
        Some(CrawlTruncated::MaxDuration { seconds: 1 })
    );
    assert!(elapsed < Duration::from_secs(4), "crawl ran for {:?}", elapsed);
    // The fetched page is kept even though its link checks were cut short
    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].url, format!("{}/", base));
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_head_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/blog/"))
        .mount(&server)
        .await;
    mount_page(&server, "/blog/", html("Blog", &["post"])).await;

    let report = engine(0, 100)
        .crawl(&format!("{}/blog", base))
        .await
        .unwrap();

    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].url, format!("{}/blog", base));
    assert_eq!(report.pages[0].links, vec![format!("{}/blog/post", base)]);
}

#[tokio::test]
async fn test_invalid_start_url() {
    let result = engine(1, 10).crawl("not a url").await;
    assert!(matches!(result, Err(sitelens::SiteLensError::InvalidUrl(_))));
}
