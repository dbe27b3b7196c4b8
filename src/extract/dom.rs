//! Shared selectors and DOM helpers

use scraper::{Html, Selector};
use std::sync::LazyLock;

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse - this is a bug")
}

pub(crate) static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
pub(crate) static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[name='description']"));
pub(crate) static META_ROBOTS: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[name='robots']"));
pub(crate) static CANONICAL: LazyLock<Selector> =
    LazyLock::new(|| selector("link[rel='canonical']"));
pub(crate) static HREFLANG: LazyLock<Selector> =
    LazyLock::new(|| selector("link[rel='alternate'][hreflang]"));
pub(crate) static HTML_ROOT: LazyLock<Selector> = LazyLock::new(|| selector("html"));
pub(crate) static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
pub(crate) static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[property='og:image']"));
pub(crate) static TWITTER_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[name='twitter:image']"));
pub(crate) static ICON: LazyLock<Selector> = LazyLock::new(|| selector("link[rel='icon']"));
pub(crate) static SHORTCUT_ICON: LazyLock<Selector> =
    LazyLock::new(|| selector("link[rel='shortcut icon']"));
pub(crate) static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| selector("script[type='application/ld+json']"));
pub(crate) static TEL_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href^='tel:']"));
pub(crate) static OPEN_GRAPH: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[property^='og:']"));
pub(crate) static TWITTER_CARD: LazyLock<Selector> =
    LazyLock::new(|| selector("meta[name^='twitter:card']"));
pub(crate) static YOUTUBE_EMBED: LazyLock<Selector> =
    LazyLock::new(|| selector("iframe[src*='youtube.com/embed']"));

/// Heading selectors, `h1` through `h6`
pub(crate) static HEADINGS: LazyLock<[Selector; 6]> = LazyLock::new(|| {
    [
        selector("h1"),
        selector("h2"),
        selector("h3"),
        selector("h4"),
        selector("h5"),
        selector("h6"),
    ]
});

/// Text content of the first element matching `sel`, trimmed
pub(crate) fn first_text(document: &Html, sel: &Selector) -> Option<String> {
    document
        .select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Trimmed text content of every element matching `sel`, in document order
pub(crate) fn all_texts(document: &Html, sel: &Selector) -> Vec<String> {
    document
        .select(sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect()
}

/// `attr` of the first element matching `sel`
pub(crate) fn first_attr(document: &Html, sel: &Selector, attr: &str) -> Option<String> {
    document
        .select(sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

/// `attr` of every element matching `sel` that carries it
pub(crate) fn all_attrs(document: &Html, sel: &Selector, attr: &str) -> Vec<String> {
    document
        .select(sel)
        .filter_map(|el| el.value().attr(attr))
        .map(str::to_string)
        .collect()
}
