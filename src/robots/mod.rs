//! Robots.txt handling module
//!
//! This module provides functionality for fetching and parsing robots.txt files.
//! A robots.txt that cannot be fetched is not an error for an audit: the
//! feature degrades and a debug event is emitted.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::Fetcher;
use url::Url;

/// User agent checked against robots rules: the wildcard group only
pub const WILDCARD_AGENT: &str = "*";

/// Builds the robots.txt URL for the origin of `page_url`
pub fn robots_url(page_url: &Url) -> Option<Url> {
    page_url.join("/robots.txt").ok()
}

/// Fetches and parses robots.txt for the origin of `page_url`
///
/// # Returns
///
/// * `Some(ParsedRobots)` - robots.txt answered 2xx
/// * `None` - missing, unreachable or not text; logged at debug level
pub async fn fetch_robots(fetcher: &Fetcher, page_url: &Url) -> Option<ParsedRobots> {
    let robots_url = robots_url(page_url)?;

    match fetcher.fetch_text(&robots_url).await {
        Ok(content) => Some(ParsedRobots::from_content(&content)),
        Err(e) => {
            tracing::debug!("robots.txt unavailable at {}: {}", robots_url, e);
            None
        }
    }
}

/// Checks if a URL is allowed for the wildcard user agent
pub fn is_allowed(robots: &ParsedRobots, url: &str) -> bool {
    robots.is_allowed(url, WILDCARD_AGENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robots_url_uses_origin() {
        let page = Url::parse("https://example.com/deep/page?q=1").unwrap();
        assert_eq!(
            robots_url(&page).unwrap().as_str(),
            "https://example.com/robots.txt"
        );
    }

    #[test]
    fn test_robots_url_keeps_port() {
        let page = Url::parse("http://127.0.0.1:9000/a").unwrap();
        assert_eq!(
            robots_url(&page).unwrap().as_str(),
            "http://127.0.0.1:9000/robots.txt"
        );
    }

    #[test]
    fn test_is_allowed_uses_wildcard() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /private");
        assert!(is_allowed(&robots, "https://example.com/"));
        assert!(!is_allowed(&robots, "https://example.com/private"));
    }
}
