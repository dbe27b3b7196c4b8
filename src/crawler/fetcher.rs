//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made on behalf of an audit:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests for page documents (non-2xx is a failure)
//! - HEAD requests for link liveness checks
//! - Plain-text GETs for robots.txt and sitemap probes
//! - Manual-redirect HEAD for the HTTPS redirect test
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for page fetches
const MAX_REDIRECTS: usize = 10;

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("{0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Page body content
    pub body: String,
}

/// Outcome of a HEAD liveness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// 2xx response
    Alive(u16),

    /// Non-success response
    Broken(u16),

    /// The request itself failed
    Unreachable(String),
}

impl LinkStatus {
    pub fn is_alive(&self) -> bool {
        matches!(self, LinkStatus::Alive(_))
    }
}

/// Builds an HTTP client with proper configuration
///
/// The User-Agent is `CrawlerName/Version (+ContactURL)`.
///
/// # Example
///
/// ```no_run
/// use sitelens::config::{CrawlerConfig, UserAgentConfig};
/// use sitelens::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    client_builder(user_agent, crawler)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
}

fn client_builder(user_agent: &UserAgentConfig, crawler: &CrawlerConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
}

/// Issues every network request of an audit or crawl
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    no_redirect: Client,
}

impl Fetcher {
    /// Creates a fetcher with one redirect-following and one non-following client
    pub fn new(user_agent: &UserAgentConfig, crawler: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, crawler)?,
            no_redirect: client_builder(user_agent, crawler)
                .redirect(Policy::none())
                .build()?,
        })
    }

    /// The redirect-following client, shared with external service calls
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a page document
    ///
    /// Fails on network errors and on any non-2xx status.
    pub async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            headers,
            body,
        })
    }

    /// Fetches a small text resource such as robots.txt
    pub async fn fetch_text(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Returns true when a GET for `url` answers 2xx
    pub async fn exists(&self, url: &Url) -> bool {
        match self.client.get(url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", url, e);
                false
            }
        }
    }

    /// Sends a HEAD request to check whether a link resolves
    pub async fn check_link(&self, url: &Url) -> LinkStatus {
        match self.client.head(url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                LinkStatus::Alive(response.status().as_u16())
            }
            Ok(response) => LinkStatus::Broken(response.status().as_u16()),
            Err(e) => LinkStatus::Unreachable(FetchError::from(e).to_string()),
        }
    }

    /// Checks whether a plain-HTTP URL redirects straight to HTTPS
    ///
    /// Sends a HEAD without following redirects and inspects `Location`.
    pub async fn redirects_to_https(&self, url: &Url) -> Result<bool, FetchError> {
        let response = self.no_redirect.head(url.clone()).send().await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        Ok(location.starts_with("https:"))
    }
}
