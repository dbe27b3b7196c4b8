//! Crawl engine - bounded breadth-first traversal of one site
//!
//! The engine drives a single crawl from a start URL:
//! - Pops tasks from the frontier in breadth-first order
//! - Fetches and parses each page
//! - Records missing and duplicate titles
//! - Checks robots.txt for the start page
//! - Enqueues internal links and checks each unique one with a HEAD request
//! - Stops early when the page or time budget runs out
//!
//! All state lives in one [`CrawlRun`] private to the call, so concurrent
//! crawls never share anything but the HTTP client.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{Fetcher, LinkStatus};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::parse_page;
use crate::crawler::types::{
    CrawlIssue, CrawlReport, CrawlTask, CrawlTruncated, IssueKind, PageRecord,
};
use crate::robots;
use crate::url::{LinkResolver, ResolveMode};
use crate::SiteLensError;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use url::Url;

/// Limits and behavior of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Maximum link hops from the start page; 0 visits only the start page
    pub max_depth: u32,

    /// Maximum pages visited (fetch attempts, successful or not)
    pub max_pages: usize,

    /// Wall-clock budget for the whole crawl
    pub max_duration: Duration,

    pub resolve_mode: ResolveMode,
}

impl CrawlOptions {
    /// Builds options from the crawler config with an explicit depth
    pub fn from_config(config: &CrawlerConfig, max_depth: u32) -> Self {
        Self {
            max_depth,
            max_pages: config.max_pages,
            max_duration: Duration::from_secs(config.max_duration_secs),
            resolve_mode: config.resolve_mode,
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default(), 1)
    }
}

/// Runs bounded breadth-first crawls
#[derive(Debug, Clone)]
pub struct CrawlEngine {
    fetcher: Fetcher,
    options: CrawlOptions,
}

impl CrawlEngine {
    pub fn new(fetcher: Fetcher, options: CrawlOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Crawls a site starting from `start_url`
    ///
    /// Pages are visited in breadth-first order; ties within a depth follow
    /// the order links were discovered. Only links whose host equals the
    /// start host exactly are followed and liveness-checked.
    ///
    /// # Arguments
    ///
    /// * `start_url` - Absolute HTTP(S) URL of the first page
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Pages and issues; page-level failures are issues
    /// * `Err(SiteLensError::InvalidUrl)` - `start_url` is not an absolute HTTP(S) URL
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sitelens::config::Config;
    /// use sitelens::crawler::{CrawlEngine, CrawlOptions, Fetcher};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config::default();
    /// let fetcher = Fetcher::new(&config.user_agent, &config.crawler)?;
    /// let engine = CrawlEngine::new(fetcher, CrawlOptions::from_config(&config.crawler, 2));
    /// let report = engine.crawl("https://example.com/").await?;
    /// println!("{} pages, {} issues", report.pages.len(), report.issues.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, start_url: &str) -> Result<CrawlReport, SiteLensError> {
        let start = parse_start_url(start_url)?;
        let resolver = LinkResolver::new(&start, self.options.resolve_mode);

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {})",
            start,
            self.options.max_depth,
            self.options.max_pages
        );

        let mut run = CrawlRun {
            fetcher: &self.fetcher,
            options: &self.options,
            resolver,
            frontier: Frontier::new(start, self.options.max_depth),
            started: Instant::now(),
            title_owners: HashMap::new(),
            link_checks: HashMap::new(),
            reported_links: HashSet::new(),
            report: CrawlReport::default(),
        };

        run.execute().await;

        let report = run.report;
        match report.truncated {
            Some(reason) => tracing::warn!(
                "Crawl truncated: {} ({} pages, {} issues)",
                reason,
                report.pages.len(),
                report.issues.len()
            ),
            None => tracing::info!(
                "Crawl completed: {} pages, {} issues",
                report.pages.len(),
                report.issues.len()
            ),
        }

        Ok(report)
    }
}

pub(crate) fn parse_start_url(start_url: &str) -> Result<Url, SiteLensError> {
    let url = Url::parse(start_url.trim())
        .map_err(|e| SiteLensError::InvalidUrl(format!("{}: {}", start_url, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(SiteLensError::InvalidUrl(format!(
            "{}: expected an absolute http(s) URL",
            start_url
        )));
    }

    Ok(url)
}

/// Mutable state of one crawl invocation
struct CrawlRun<'a> {
    fetcher: &'a Fetcher,
    options: &'a CrawlOptions,
    resolver: LinkResolver,
    frontier: Frontier,
    started: Instant,
    /// Title -> URL of the first page that used it
    title_owners: HashMap<String, String>,
    /// One HEAD result per unique link
    link_checks: HashMap<String, LinkStatus>,
    /// (referring page, link) pairs already reported broken
    reported_links: HashSet<(String, String)>,
    report: CrawlReport,
}

impl CrawlRun<'_> {
    async fn execute(&mut self) {
        while let Some(task) = self.frontier.next_task() {
            if let Some(reason) = self.budget_exceeded() {
                self.report.truncated = Some(reason);
                break;
            }

            if !self.frontier.visit(&task) {
                continue;
            }

            self.process(task).await;
            if self.report.truncated.is_some() {
                break;
            }
        }
    }

    fn budget_exceeded(&self) -> Option<CrawlTruncated> {
        if self.frontier.visited_count() >= self.options.max_pages {
            return Some(CrawlTruncated::MaxPages {
                limit: self.options.max_pages,
            });
        }
        self.deadline_passed()
    }

    fn deadline_passed(&self) -> Option<CrawlTruncated> {
        (self.started.elapsed() >= self.options.max_duration).then(|| {
            CrawlTruncated::MaxDuration {
                seconds: self.options.max_duration.as_secs(),
            }
        })
    }

    async fn process(&mut self, task: CrawlTask) {
        let page_url = task.url.as_str().to_string();
        tracing::debug!("Visiting {} (depth {})", page_url, task.depth);

        let fetched = match self.fetcher.fetch_page(&task.url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::debug!("Fetch of {} failed: {}", page_url, e);
                self.issue(&page_url, IssueKind::FetchError {
                    error: e.to_string(),
                });
                return;
            }
        };

        // Relative links resolve against where the page actually lives
        let parsed = parse_page(&fetched.body, &fetched.final_url, self.options.resolve_mode);

        self.check_title(&page_url, &parsed.title);

        if task.depth == 0 {
            self.check_robots(&task.url).await;
        }

        for link in &parsed.links {
            // The page is still recorded; only its remaining link checks are cut
            if let Some(reason) = self.deadline_passed() {
                self.report.truncated = Some(reason);
                break;
            }
            self.follow_link(&task, &page_url, link).await;
        }

        self.report.pages.push(PageRecord {
            url: page_url,
            title: parsed.title,
            meta_description: parsed.meta_description,
            h1_tags: parsed.h1_tags,
            links: parsed.links,
        });
    }

    fn check_title(&mut self, page_url: &str, title: &str) {
        if title.is_empty() {
            self.issue(page_url, IssueKind::MissingTitle);
            return;
        }

        match self.title_owners.get(title) {
            Some(first) if first != page_url => {
                let duplicate_of = first.clone();
                self.issue(page_url, IssueKind::DuplicateTitle { duplicate_of });
            }
            Some(_) => {}
            None => {
                self.title_owners
                    .insert(title.to_string(), page_url.to_string());
            }
        }
    }

    async fn check_robots(&mut self, page_url: &Url) {
        let Some(parsed) = robots::fetch_robots(self.fetcher, page_url).await else {
            return;
        };

        if !robots::is_allowed(&parsed, page_url.as_str()) {
            tracing::info!("{} is disallowed by robots.txt", page_url);
            self.issue(page_url.as_str(), IssueKind::RobotsBlocked);
        }
    }

    async fn follow_link(&mut self, task: &CrawlTask, page_url: &str, link: &str) {
        let Ok(link_url) = Url::parse(link) else {
            tracing::trace!("Dropping unparseable link {}", link);
            return;
        };

        if !self.resolver.is_internal(&link_url) {
            return;
        }

        self.frontier.enqueue_child(link_url.clone(), task.depth);

        let status = self.check_link(&link_url).await;
        if status.is_alive() {
            return;
        }

        if !self
            .reported_links
            .insert((page_url.to_string(), link.to_string()))
        {
            return;
        }

        let kind = match status {
            LinkStatus::Broken(code) => IssueKind::BrokenLink {
                link: link.to_string(),
                status: Some(code),
                error: None,
            },
            LinkStatus::Unreachable(error) => IssueKind::BrokenLink {
                link: link.to_string(),
                status: None,
                error: Some(error),
            },
            LinkStatus::Alive(_) => return,
        };
        self.issue(page_url, kind);
    }

    /// HEAD-checks a link once per crawl, reusing earlier results
    async fn check_link(&mut self, link: &Url) -> LinkStatus {
        if let Some(status) = self.link_checks.get(link.as_str()) {
            return status.clone();
        }

        let status = self.fetcher.check_link(link).await;
        tracing::trace!("HEAD {} -> {:?}", link, status);
        self.link_checks
            .insert(link.as_str().to_string(), status.clone());
        status
    }

    fn issue(&mut self, url: &str, kind: IssueKind) {
        self.report.issues.push(CrawlIssue::new(url, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_url() {
        assert!(parse_start_url("https://example.com/").is_ok());
        assert!(parse_start_url("  http://example.com  ").is_ok());
    }

    #[test]
    fn test_parse_start_url_rejects_relative_and_other_schemes() {
        for bad in ["/relative", "example.com", "ftp://example.com/", "mailto:a@b.c", ""] {
            assert!(
                matches!(parse_start_url(bad), Err(SiteLensError::InvalidUrl(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_options_from_config() {
        let config = CrawlerConfig {
            max_pages: 7,
            max_duration_secs: 9,
            ..CrawlerConfig::default()
        };
        let options = CrawlOptions::from_config(&config, 3);
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.max_pages, 7);
        assert_eq!(options.max_duration, Duration::from_secs(9));
    }

    #[tokio::test]
    async fn test_invalid_start_url_fails_before_any_request() {
        let config = crate::config::Config::default();
        let fetcher = Fetcher::new(&config.user_agent, &config.crawler).unwrap();
        let engine = CrawlEngine::new(fetcher, CrawlOptions::default());
        let result = engine.crawl("not a url").await;
        assert!(matches!(result, Err(SiteLensError::InvalidUrl(_))));
    }

    // Traversal behavior is covered against mock servers in tests/crawl_tests.rs
}
