//! robots.txt rules and sitemap declarations

use robotstxt::DefaultMatcher;

/// The body of one robots.txt file
///
/// Rule matching is delegated to the `robotstxt` crate; sitemap lines are
/// read directly since they sit outside user-agent groups.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The URL (or path) to check
    /// * `user_agent` - The user agent string; `*` checks the wildcard group only
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Lists the `Sitemap:` URLs declared in the file, in order
    ///
    /// Sitemap lines are not tied to a user-agent group, so every one counts.
    pub fn sitemaps(&self) -> Vec<String> {
        self.content
            .lines()
            .filter_map(|line| {
                let line = line.split('#').next().unwrap_or("").trim();
                let (key, value) = line.split_once(':')?;
                if key.trim().eq_ignore_ascii_case("sitemap") {
                    Some(value.trim().to_string())
                } else {
                    None
                }
            })
            .filter(|value| !value.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_disallow_all() {
        let content = "User-agent: *\nDisallow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(!robots.is_allowed("https://example.com/", "*"));
        assert!(!robots.is_allowed("https://example.com/page", "*"));
    }

    #[test]
    fn test_parse_disallow_specific() {
        let content = "User-agent: *\nDisallow: /admin";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("https://example.com/", "*"));
        assert!(!robots.is_allowed("https://example.com/admin", "*"));
        assert!(!robots.is_allowed("https://example.com/admin/users", "*"));
    }

    #[test]
    fn test_parse_allow_and_disallow() {
        let content = "User-agent: *\nDisallow: /private\nAllow: /private/public";
        let robots = ParsedRobots::from_content(content);
        assert!(!robots.is_allowed("https://example.com/private", "*"));
        assert!(robots.is_allowed("https://example.com/private/public", "*"));
    }

    #[test]
    fn test_wildcard_ignores_specific_groups() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let robots = ParsedRobots::from_content(content);
        assert!(robots.is_allowed("https://example.com/page", "*"));
        assert!(!robots.is_allowed("https://example.com/page", "BadBot"));
    }

    #[test]
    fn test_invalid_robots_txt() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(robots.is_allowed("https://example.com/any/path", "*"));
    }

    #[test]
    fn test_empty_robots_txt() {
        let robots = ParsedRobots::from_content("");
        assert!(robots.is_allowed("https://example.com/any/path", "*"));
    }

    #[test]
    fn test_sitemaps() {
        let content = "User-agent: *\nDisallow: /admin\nSitemap: https://example.com/sitemap.xml\nsitemap:https://example.com/news.xml # news\nSitemap:";
        let robots = ParsedRobots::from_content(content);
        assert_eq!(
            robots.sitemaps(),
            vec![
                "https://example.com/sitemap.xml".to_string(),
                "https://example.com/news.xml".to_string()
            ]
        );
    }

    #[test]
    fn test_no_sitemaps() {
        let robots = ParsedRobots::from_content("User-agent: *\nAllow: /");
        assert!(robots.sitemaps().is_empty());
    }
}
