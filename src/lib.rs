//! SiteLens: an on-page SEO auditor
//!
//! This crate fetches a page, extracts its SEO signals, optionally crawls the
//! site breadth-first to find structural issues, and merges everything with
//! external facts (performance scores, DNS, WHOIS) into one audit record.

pub mod audit;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod robots;
pub mod server;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for SiteLens operations
#[derive(Debug, Error)]
pub enum SiteLensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        source: crawler::FetchError,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Export error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for SiteLens operations
pub type Result<T> = std::result::Result<T, SiteLensError>;

// Re-export commonly used types
pub use audit::{AuditRecord, AuditRequest, Auditor};
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlIssue, CrawlReport, PageRecord};
pub use crate::url::{extract_domain, normalize_url, resolve_link, LinkResolver, ResolveMode};
