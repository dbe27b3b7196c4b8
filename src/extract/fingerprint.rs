//! Vendor and technology fingerprints matched against raw page source
//!
//! Every check here is a substring or regex match over the HTML string, so
//! it sees inline scripts and attribute values alike.

use crate::extract::dom::{self, all_attrs};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile - this is a bug")
}

static GTAG_EXTERNAL: LazyLock<Regex> = LazyLock::new(|| {
    regex(r#"(?i)<script[^>]*src=["'][^"']*gtag/js[^"']*["'][^>]*></script>"#)
});
static GTAG_INLINE: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?is)<script[^>]*>.*?gtag\(.*?</script>"));
static GTM_EXTERNAL: LazyLock<Regex> = LazyLock::new(|| {
    regex(r#"(?i)<script[^>]*src=["'][^"']*googletagmanager\.com[^"']*["'][^>]*></script>"#)
});
static GTM_INLINE: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?is)<script[^>]*>.*?dataLayer.*?</script>"));
static NEXT_JS: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)next\.js"));
static REACT: LazyLock<Regex> = LazyLock::new(|| regex(r"(?i)react"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| regex(r"\d{3}[-.\s]?\d{3}[-.\s]?\d{4}"));
static PIXEL_ID: LazyLock<Regex> =
    LazyLock::new(|| regex(r#"fbq\(['"]init['"],\s*['"]([^'"]+)['"]"#));

static FACEBOOK_LINK: LazyLock<Selector> =
    LazyLock::new(|| dom::selector("a[href*='facebook.com']"));
static TWITTER_LINK: LazyLock<Selector> =
    LazyLock::new(|| dom::selector("a[href*='twitter.com']"));
static INSTAGRAM_LINK: LazyLock<Selector> =
    LazyLock::new(|| dom::selector("a[href*='instagram.com']"));
static LINKEDIN_LINK: LazyLock<Selector> =
    LazyLock::new(|| dom::selector("a[href*='linkedin.com']"));
static YOUTUBE_LINK: LazyLock<Selector> =
    LazyLock::new(|| dom::selector("a[href*='youtube.com']"));

/// Analytics vendors whose snippets appear in `html`, in a fixed order
pub fn analytics(html: &str) -> Vec<String> {
    let mut found = Vec::new();
    if html.contains("gtag(") {
        found.push("Google Analytics (gtag)".to_string());
    }
    if html.contains("analytics.js") {
        found.push("Google Analytics (analytics.js)".to_string());
    }
    if html.contains("ga('create'") {
        found.push("Google Analytics (ga.js)".to_string());
    }
    if html.contains("dataLayer") {
        found.push("Google Tag Manager".to_string());
    }
    if html.contains("fbq(") || html.contains("connect.facebook.net") {
        found.push("Facebook Pixel".to_string());
    }
    found
}

/// The gtag `<script>` element, preferring the external loader over an inline call
pub fn gtag_code(html: &str) -> Option<String> {
    first_match(html, &GTAG_EXTERNAL, &GTAG_INLINE)
}

/// The Google Tag Manager `<script>` element, external loader first
pub fn gtm_code(html: &str) -> Option<String> {
    first_match(html, &GTM_EXTERNAL, &GTM_INLINE)
}

fn first_match(html: &str, preferred: &Regex, fallback: &Regex) -> Option<String> {
    preferred
        .find(html)
        .or_else(|| fallback.find(html))
        .map(|m| m.as_str().to_string())
}

/// Front-end and CMS fingerprints
pub fn technology(html: &str) -> Vec<String> {
    let mut found = Vec::new();
    if html.contains("wp-content") {
        found.push("WordPress".to_string());
    }
    if html.contains("Drupal.settings") {
        found.push("Drupal".to_string());
    }
    if html.contains("Shopify") {
        found.push("Shopify".to_string());
    }
    if NEXT_JS.is_match(html) {
        found.push("Next.js".to_string());
    }
    if REACT.is_match(html) {
        found.push("React".to_string());
    }
    found
}

/// JSON-LD blocks, each parsed on its own
///
/// Blocks that fail to parse, or parse to `null`, are dropped without
/// affecting the others.
pub fn structured_data(document: &Html) -> Vec<Value> {
    document
        .select(&dom::JSON_LD)
        .filter_map(|el| {
            let raw: String = el.text().collect();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(Value::Null) => None,
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("Discarding malformed JSON-LD block: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// Local SEO signals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalSeo {
    pub address_phone_shown: bool,
    pub local_business_schema: bool,
    pub google_business_profile_identified: bool,
}

pub fn local_seo(document: &Html, html: &str, structured: &[Value]) -> LocalSeo {
    LocalSeo {
        address_phone_shown: document.select(&dom::TEL_LINK).next().is_some()
            || PHONE.is_match(html),
        local_business_schema: structured
            .iter()
            .any(|item| item.get("@type").and_then(Value::as_str) == Some("LocalBusiness")),
        google_business_profile_identified: html.contains("google.com/maps"),
    }
}

/// Social profile and sharing signals, each a `", "`-joined list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialSignals {
    pub facebook_page_linked: String,
    pub open_graph_tags: String,
    pub facebook_pixel: String,
    pub x_account_linked: String,
    pub x_cards: String,
    pub instagram_linked: String,
    pub linked_in_page_linked: String,
    pub you_tube_channel_linked: String,
    pub you_tube_channel_activity: String,
}

pub fn social(document: &Html, html: &str) -> SocialSignals {
    let joined = |sel: &Selector, attr: &str| all_attrs(document, sel, attr).join(", ");

    SocialSignals {
        facebook_page_linked: joined(&FACEBOOK_LINK, "href"),
        open_graph_tags: joined(&dom::OPEN_GRAPH, "content"),
        facebook_pixel: PIXEL_ID
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        x_account_linked: joined(&TWITTER_LINK, "href"),
        x_cards: joined(&dom::TWITTER_CARD, "content"),
        instagram_linked: joined(&INSTAGRAM_LINK, "href"),
        linked_in_page_linked: joined(&LINKEDIN_LINK, "href"),
        you_tube_channel_linked: joined(&YOUTUBE_LINK, "href"),
        you_tube_channel_activity: joined(&dom::YOUTUBE_EMBED, "src"),
    }
}
