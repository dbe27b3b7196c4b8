//! Crawler module for page fetching and site traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeouts and error classification
//! - HTML parsing and link extraction
//! - The breadth-first frontier and visited set
//! - Overall crawl coordination and issue detection

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod types;

pub use engine::{CrawlEngine, CrawlOptions};
pub(crate) use engine::parse_start_url;
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, LinkStatus};
pub use frontier::Frontier;
pub use parser::{parse_page, ParsedPage};
pub use types::{CrawlIssue, CrawlReport, CrawlTask, CrawlTruncated, IssueKind, PageRecord};

use crate::config::Config;
use crate::SiteLensError;

/// Runs a complete crawl with settings from `config`
///
/// This is the entry point used by the `crawl` command. It will:
/// 1. Build the HTTP client from the user agent and timeout settings
/// 2. Apply the page and time budgets from the crawler section
/// 3. Traverse the site breadth-first up to `max_depth`
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `start_url` - Absolute URL of the first page
/// * `max_depth` - Maximum link hops from the start page
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished or was truncated by a budget
/// * `Err(SiteLensError)` - Invalid start URL or HTTP client setup failure
pub async fn crawl(
    config: &Config,
    start_url: &str,
    max_depth: u32,
) -> Result<CrawlReport, SiteLensError> {
    let fetcher = Fetcher::new(&config.user_agent, &config.crawler)?;
    let options = CrawlOptions::from_config(&config.crawler, max_depth);
    CrawlEngine::new(fetcher, options).crawl(start_url).await
}
