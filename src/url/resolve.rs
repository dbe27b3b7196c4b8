//! Link resolution against a page URL
//!
//! Turns `href` attribute values into absolute HTTP(S) URLs and decides
//! whether a resolved link stays on the crawl's start host.

use serde::Deserialize;
use url::Url;

/// Schemes that never lead to a crawlable document
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// How non-rooted relative hrefs (`page.html`, `../a`) are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolveMode {
    /// RFC 3986 resolution against the page URL
    #[default]
    Standard,

    /// Treat every non-rooted href as relative to the origin root
    OriginRoot,
}

/// Resolves an href to an absolute URL string
///
/// # Resolution Rules
///
/// | href | Result |
/// |------|--------|
/// | `http(s)://host/path` | returned verbatim |
/// | `//host/path` | base scheme + href |
/// | `/path` | base origin + href |
/// | anything else | depends on [`ResolveMode`] |
///
/// Returns `None` for empty and fragment-only hrefs, for `javascript:`,
/// `mailto:`, `tel:` and `data:` links, for anything that does not parse,
/// and for anything that resolves to a non-HTTP(S) scheme.
///
/// # Examples
///
/// ```
/// use sitelens::url::{resolve_link, ResolveMode};
/// use url::Url;
///
/// let base = Url::parse("https://example.com/blog/post").unwrap();
/// assert_eq!(
///     resolve_link("other", &base, ResolveMode::Standard).as_deref(),
///     Some("https://example.com/blog/other")
/// );
/// assert_eq!(
///     resolve_link("other", &base, ResolveMode::OriginRoot).as_deref(),
///     Some("https://example.com/other")
/// );
/// ```
pub fn resolve_link(href: &str, base: &Url, mode: ResolveMode) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return None;
    }

    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return Url::parse(href).ok().map(|_| href.to_string());
    }

    let resolved = if href.starts_with("//") {
        Url::parse(&format!("{}:{}", base.scheme(), href)).ok()?
    } else if href.starts_with('/') || mode == ResolveMode::Standard {
        base.join(href).ok()?
    } else {
        let origin = base.origin().ascii_serialization();
        Url::parse(&format!("{}/{}", origin, href)).ok()?
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Resolves links for one crawl and classifies them against the start host
#[derive(Debug, Clone)]
pub struct LinkResolver {
    start_host: String,
    mode: ResolveMode,
}

impl LinkResolver {
    /// Creates a resolver whose internal host is the host of `start_url`
    pub fn new(start_url: &Url, mode: ResolveMode) -> Self {
        Self {
            start_host: start_url.host_str().unwrap_or_default().to_lowercase(),
            mode,
        }
    }

    /// The host that counts as internal
    pub fn start_host(&self) -> &str {
        &self.start_host
    }

    /// Resolves `href` against `base` and parses the result
    pub fn resolve(&self, href: &str, base: &Url) -> Option<Url> {
        resolve_link(href, base, self.mode).and_then(|s| Url::parse(&s).ok())
    }

    /// Whether `url` lives on the start host (exact match, no subdomain folding)
    pub fn is_internal(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|h| h.eq_ignore_ascii_case(&self.start_host))
    }
}
