//! Signal extraction module
//!
//! Turns one fetched HTML document and its response headers into the on-page
//! SEO signals of an audit. Extraction is a pure function: no network access,
//! and identical input always yields identical output.

pub(crate) mod dom;
pub mod fingerprint;
pub mod links;
pub mod page;

pub use fingerprint::{LocalSeo, SocialSignals};
pub use links::{analyze, link_records, LinkAnalysis, LinkRecord};
pub use page::Hreflang;

use crate::url::ResolveMode;
use regex::Regex;
use reqwest::header::{HeaderMap, CONTENT_TYPE, SERVER};
use scraper::Html;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

static CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"charset=([^;]+)").expect("static regex must compile - this is a bug")
});

const X_ROBOTS_TAG: &str = "x-robots-tag";

/// On-page signals of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSignals {
    pub title: String,
    pub title_length: usize,
    pub meta_description: String,
    pub meta_description_length: usize,
    pub serp_snippet: String,
    pub hreflangs: Vec<Hreflang>,
    pub language: String,
    pub h1_tags: Vec<String>,
    pub h2_tags: Vec<String>,
    pub h3_tags: Vec<String>,
    pub h4_tags: Vec<String>,
    pub h5_tags: Vec<String>,
    pub h6_tags: Vec<String>,
    /// Heading counts for `H2` through `H6`
    pub header_usage: BTreeMap<String, usize>,
    pub canonical: String,
    pub robots_meta: String,
    pub noindex_meta: bool,
    pub x_robots_tag: String,
    pub noindex_header: bool,
    pub meta_image: String,
    pub favicon: String,
    pub analytics: Vec<String>,
    pub gtag_code: Option<String>,
    pub gtm_code: Option<String>,
    pub structured_data: Vec<Value>,
    pub technology: Vec<String>,
    pub web_server: String,
    pub charset: String,
    #[serde(skip)]
    pub local: LocalSeo,
    #[serde(skip)]
    pub social: SocialSignals,
    #[serde(skip)]
    pub links: Vec<LinkRecord>,
    #[serde(skip)]
    pub link_analysis: LinkAnalysis,
}

/// Extracts every on-page signal from `html`
///
/// # Arguments
///
/// * `html` - Raw document body
/// * `page_url` - URL the document was served from; base for relative references
/// * `headers` - Response headers (`Server`, `Content-Type`, `X-Robots-Tag`)
/// * `mode` - How relative image and icon references are resolved
pub fn extract_signals(
    html: &str,
    page_url: &Url,
    headers: &HeaderMap,
    mode: ResolveMode,
) -> PageSignals {
    let document = Html::parse_document(html);

    let title = page::title(&document);
    let meta_description = page::meta_description(&document);
    let headings: Vec<Vec<String>> = (1..=6)
        .map(|level| page::heading_texts(&document, level))
        .collect();
    let header_usage = (2..=6)
        .map(|level| (format!("H{}", level), headings[level - 1].len()))
        .collect();

    let robots_meta = page::robots_meta(&document);
    let x_robots_tag = header_str(headers, X_ROBOTS_TAG);
    let content_type = header_str(headers, CONTENT_TYPE.as_str());

    let structured_data = fingerprint::structured_data(&document);
    let links = link_records(&document, page_url);
    let link_analysis = analyze(&links);

    let mut headings = headings.into_iter();
    let mut next_level = || headings.next().unwrap_or_default();

    PageSignals {
        title_length: title.chars().count(),
        meta_description_length: meta_description.chars().count(),
        serp_snippet: page::serp_snippet(&title, &meta_description),
        hreflangs: page::hreflangs(&document),
        language: page::language(&document),
        h1_tags: next_level(),
        h2_tags: next_level(),
        h3_tags: next_level(),
        h4_tags: next_level(),
        h5_tags: next_level(),
        h6_tags: next_level(),
        header_usage,
        canonical: page::canonical(&document),
        noindex_meta: robots_meta.to_lowercase().contains("noindex"),
        robots_meta,
        noindex_header: x_robots_tag.to_lowercase().contains("noindex"),
        x_robots_tag,
        meta_image: page::meta_image(&document, page_url, mode),
        favicon: page::favicon(&document, page_url, mode),
        analytics: fingerprint::analytics(html),
        gtag_code: fingerprint::gtag_code(html),
        gtm_code: fingerprint::gtm_code(html),
        local: fingerprint::local_seo(&document, html, &structured_data),
        social: fingerprint::social(&document, html),
        structured_data,
        technology: fingerprint::technology(html),
        web_server: header_str(headers, SERVER.as_str()),
        charset: CHARSET
            .captures(&content_type)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        title,
        meta_description,
        links,
        link_analysis,
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
