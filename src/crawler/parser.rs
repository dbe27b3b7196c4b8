//! HTML parser for crawled pages
//!
//! A crawl needs far less than a full audit: the title, the meta description,
//! the H1 headings and the links to follow.

use crate::extract::page;
use crate::url::{resolve_link, ResolveMode};
use scraper::Html;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The trimmed `<title>` text; empty when missing
    pub title: String,

    pub meta_description: String,

    pub h1_tags: Vec<String>,

    /// Resolved absolute links, in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts what the crawl engine needs
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Hrefs that do not resolve to an HTTP(S) URL
///
/// **Note:** `rel="nofollow"` links ARE followed
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL, used for resolving relative links
/// * `mode` - How non-rooted relative hrefs are resolved
///
/// # Example
///
/// ```
/// use sitelens::crawler::parse_page;
/// use sitelens::url::ResolveMode;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &base_url, ResolveMode::Standard);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links, vec!["https://example.com/page"]);
/// ```
pub fn parse_page(html: &str, base_url: &Url, mode: ResolveMode) -> ParsedPage {
    let document = Html::parse_document(html);

    let links = page::anchor_hrefs(&document)
        .iter()
        .filter_map(|href| resolve_link(href, base_url, mode))
        .collect();

    ParsedPage {
        title: page::title(&document),
        meta_description: page::meta_description(&document),
        h1_tags: page::heading_texts(&document, 1),
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/section/page").unwrap()
    }

    fn parse(html: &str) -> ParsedPage {
        parse_page(html, &base_url(), ResolveMode::Standard)
    }

    #[test]
    fn test_extract_title() {
        let parsed = parse(r#"<html><head><title>Test Page</title></head><body></body></html>"#);
        assert_eq!(parsed.title, "Test Page");
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let parsed = parse(r#"<html><head><title>  Test Page  </title></head><body></body></html>"#);
        assert_eq!(parsed.title, "Test Page");
    }

    #[test]
    fn test_no_title() {
        let parsed = parse(r#"<html><head></head><body></body></html>"#);
        assert_eq!(parsed.title, "");
    }

    #[test]
    fn test_meta_and_h1() {
        let parsed = parse(
            r#"<html><head><meta name="description" content="Desc"></head>
            <body><h1>First</h1><h1> Second </h1></body></html>"#,
        );
        assert_eq!(parsed.meta_description, "Desc");
        assert_eq!(parsed.h1_tags, vec!["First", "Second"]);
    }

    #[test]
    fn test_extract_absolute_link() {
        let parsed = parse(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(parsed.links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let parsed = parse(r#"<html><body><a href="/other">Link</a></body></html>"#);
        assert_eq!(parsed.links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link_by_mode() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        assert_eq!(parse(html).links, vec!["https://example.com/section/other"]);
        assert_eq!(
            parse_page(html, &base_url(), ResolveMode::OriginRoot).links,
            vec!["https://example.com/other"]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            </body></html>"#;
        assert!(parse(html).links.is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let parsed = parse(r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#);
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let parsed = parse(r##"<html><body><a href="#section">Jump</a></body></html>"##);
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_follow_nofollow_links() {
        let parsed = parse(r#"<html><body><a href="/page" rel="nofollow">Link</a></body></html>"#);
        assert_eq!(parsed.links, vec!["https://example.com/page"]);
    }

    #[test]
    fn test_links_keep_document_order() {
        let html = r#"
            <html>
            <body>
                <a href="/page2">Link 2</a>
                <a href="javascript:alert('no')">Invalid</a>
                <a href="/page1">Link 1</a>
                <a href="//cdn.example.com/page3">Link 3</a>
            </body>
            </html>
        "#;
        assert_eq!(
            parse(html).links,
            vec![
                "https://example.com/page2",
                "https://example.com/page1",
                "https://cdn.example.com/page3"
            ]
        );
    }
}
