//! Core on-page fields: title, meta tags, headings, canonical, images

use crate::extract::dom::{self, all_attrs, all_texts, first_attr, first_text};
use crate::url::{resolve_link, ResolveMode};
use scraper::Html;
use serde::Serialize;
use url::Url;

/// Maximum length of the SERP snippet preview
pub const SERP_SNIPPET_LENGTH: usize = 160;

/// An alternate-language link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hreflang {
    pub hreflang: String,
    pub href: String,
}

/// The page `<title>`, trimmed; empty when missing
pub fn title(document: &Html) -> String {
    first_text(document, &dom::TITLE).unwrap_or_default()
}

/// The `content` of `<meta name="description">`; empty when missing
pub fn meta_description(document: &Html) -> String {
    first_attr(document, &dom::META_DESCRIPTION, "content").unwrap_or_default()
}

/// Text of every heading at `level` (1-6), in document order
///
/// Levels outside 1-6 yield nothing.
pub fn heading_texts(document: &Html, level: usize) -> Vec<String> {
    match level.checked_sub(1).and_then(|i| dom::HEADINGS.get(i)) {
        Some(sel) => all_texts(document, sel),
        None => Vec::new(),
    }
}

/// Raw `href` values of anchors, in document order
///
/// Anchors with a `download` attribute point at files, not pages, and are skipped.
pub fn anchor_hrefs(document: &Html) -> Vec<String> {
    document
        .select(&dom::ANCHOR)
        .filter(|el| el.value().attr("download").is_none())
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect()
}

pub fn canonical(document: &Html) -> String {
    first_attr(document, &dom::CANONICAL, "href").unwrap_or_default()
}

pub fn robots_meta(document: &Html) -> String {
    first_attr(document, &dom::META_ROBOTS, "content").unwrap_or_default()
}

pub fn language(document: &Html) -> String {
    first_attr(document, &dom::HTML_ROOT, "lang").unwrap_or_default()
}

pub fn hreflangs(document: &Html) -> Vec<Hreflang> {
    document
        .select(&dom::HREFLANG)
        .map(|el| Hreflang {
            hreflang: el.value().attr("hreflang").unwrap_or_default().to_string(),
            href: el.value().attr("href").unwrap_or_default().to_string(),
        })
        .collect()
}

/// `og:image`, falling back to `twitter:image`, resolved against the page
pub fn meta_image(document: &Html, page_url: &Url, mode: ResolveMode) -> String {
    let raw = first_attr(document, &dom::OG_IMAGE, "content")
        .filter(|s| !s.is_empty())
        .or_else(|| first_attr(document, &dom::TWITTER_IMAGE, "content"))
        .unwrap_or_default();
    resolve_or_empty(&raw, page_url, mode)
}

/// `<link rel="icon">`, falling back to `rel="shortcut icon"`, resolved against the page
pub fn favicon(document: &Html, page_url: &Url, mode: ResolveMode) -> String {
    let raw = first_attr(document, &dom::ICON, "href")
        .filter(|s| !s.is_empty())
        .or_else(|| first_attr(document, &dom::SHORTCUT_ICON, "href"))
        .unwrap_or_default();
    resolve_or_empty(&raw, page_url, mode)
}

/// Every Open Graph `content` value, in document order
pub fn open_graph_values(document: &Html) -> Vec<String> {
    all_attrs(document, &dom::OPEN_GRAPH, "content")
}

/// `"{title} - {description}"` cut to [`SERP_SNIPPET_LENGTH`] characters
pub fn serp_snippet(title: &str, description: &str) -> String {
    format!("{} - {}", title, description)
        .chars()
        .take(SERP_SNIPPET_LENGTH)
        .collect()
}

fn resolve_or_empty(raw: &str, page_url: &Url, mode: ResolveMode) -> String {
    resolve_link(raw, page_url, mode).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://example.com/blog/post").unwrap()
    }

    #[test]
    fn test_title_trimmed() {
        let doc = Html::parse_document("<html><head><title>  Test Page  </title></head></html>");
        assert_eq!(title(&doc), "Test Page");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let doc = Html::parse_document("<html><head></head><body></body></html>");
        assert_eq!(title(&doc), "");
    }

    #[test]
    fn test_meta_description() {
        let doc = Html::parse_document(
            r#"<html><head><meta name="description" content="About us"></head></html>"#,
        );
        assert_eq!(meta_description(&doc), "About us");
    }

    #[test]
    fn test_headings_by_level() {
        let doc = Html::parse_document(
            "<body><h1> One </h1><h2>Two a</h2><h2>Two b</h2><h6>Six</h6></body>",
        );
        assert_eq!(heading_texts(&doc, 1), vec!["One"]);
        assert_eq!(heading_texts(&doc, 2), vec!["Two a", "Two b"]);
        assert!(heading_texts(&doc, 3).is_empty());
        assert_eq!(heading_texts(&doc, 6), vec!["Six"]);
        assert!(heading_texts(&doc, 0).is_empty());
        assert!(heading_texts(&doc, 7).is_empty());
    }

    #[test]
    fn test_anchor_hrefs_skip_download() {
        let doc = Html::parse_document(
            r#"<body><a href="/a">A</a><a href="/f.pdf" download>F</a><a>none</a><a href="b">B</a></body>"#,
        );
        assert_eq!(anchor_hrefs(&doc), vec!["/a", "b"]);
    }

    #[test]
    fn test_hreflangs_and_language() {
        let doc = Html::parse_document(
            r#"<html lang="en"><head>
            <link rel="alternate" hreflang="de" href="https://example.com/de">
            <link rel="alternate" href="https://example.com/feed">
            </head></html>"#,
        );
        assert_eq!(language(&doc), "en");
        assert_eq!(
            hreflangs(&doc),
            vec![Hreflang {
                hreflang: "de".to_string(),
                href: "https://example.com/de".to_string()
            }]
        );
    }

    #[test]
    fn test_meta_image_fallback_and_resolution() {
        let doc = Html::parse_document(
            r#"<head><meta name="twitter:image" content="/img/card.png"></head>"#,
        );
        assert_eq!(
            meta_image(&doc, &page_url(), ResolveMode::Standard),
            "https://example.com/img/card.png"
        );
    }

    #[test]
    fn test_favicon_shortcut_icon() {
        let doc = Html::parse_document(
            r#"<head><link rel="shortcut icon" href="//cdn.example.com/fav.ico"></head>"#,
        );
        assert_eq!(
            favicon(&doc, &page_url(), ResolveMode::Standard),
            "https://cdn.example.com/fav.ico"
        );
    }

    #[test]
    fn test_serp_snippet_truncated() {
        let long = "x".repeat(300);
        assert_eq!(serp_snippet(&long, "d").chars().count(), SERP_SNIPPET_LENGTH);
        assert_eq!(serp_snippet("Title", "Desc"), "Title - Desc");
    }
}
