//! Audit aggregation module
//!
//! An audit merges the on-page signals of one document with the link
//! analysis, an optional site crawl and facts from external services
//! (PageSpeed Insights, DNS, WHOIS) into one flat [`AuditRecord`].
//!
//! External services sit behind async traits so each can be swapped out;
//! a failing service degrades its own fields and never the whole audit.

mod aggregator;
pub mod dns;
pub mod performance;
mod record;
pub mod whois;

pub use aggregator::Auditor;
pub use dns::{DnsFacts, DnsLookup, SystemResolver};
pub use performance::{PageSpeedClient, PerformanceReport, PerformanceScorer, Strategy};
pub use record::AuditRecord;
pub use whois::{domain_age, TcpWhois, WhoisLookup};

use crate::output::ExportFormat;
use serde::Deserialize;
use thiserror::Error;

/// Failure of a third-party lookup
///
/// These are logged and turned into empty or null fields by the aggregator.
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("HTTP error from {service}: {source}")]
    Http {
        service: &'static str,
        source: reqwest::Error,
    },

    #[error("{service} answered HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("DNS lookup failed: {0}")]
    Dns(String),

    #[error("WHOIS query failed: {0}")]
    Whois(String),

    #[error("Unexpected response from {service}: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },
}

/// Body of an audit request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    pub url: String,

    #[serde(default)]
    pub export_type: ExportFormat,

    /// PDF template name; `default` when absent
    #[serde(default)]
    pub template: Option<String>,

    /// Link depth; values above 1 add a site crawl
    #[serde(default = "default_depth")]
    pub depth: u32,
}

fn default_depth() -> u32 {
    1
}

impl AuditRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            export_type: ExportFormat::default(),
            template: None,
            depth: default_depth(),
        }
    }

    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or("default")
    }
}
