//! Records produced by a crawl

use serde::Serialize;
use std::fmt;
use url::Url;

/// A URL waiting in the crawl queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,

    /// Link hops from the start page (the start page is depth 0)
    pub depth: u32,
}

/// One successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub h1_tags: Vec<String>,

    /// Resolved absolute links, in document order
    pub links: Vec<String>,
}

/// What went wrong on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum IssueKind {
    MissingTitle,

    DuplicateTitle {
        /// URL of the first page that used the title
        #[serde(rename = "duplicateOf")]
        duplicate_of: String,
    },

    RobotsBlocked,

    BrokenLink {
        link: String,
        /// Status of the HEAD check; `None` when the request itself failed
        status: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    FetchError {
        error: String,
    },
}

/// A structural problem found during a crawl, attached to the page it was found on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlIssue {
    pub url: String,

    #[serde(flatten)]
    pub kind: IssueKind,
}

impl CrawlIssue {
    pub fn new(url: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// Human-readable description of the issue
    pub fn detail(&self) -> String {
        match &self.kind {
            IssueKind::MissingTitle => "Missing title".to_string(),
            IssueKind::DuplicateTitle { duplicate_of } => {
                format!("Duplicate title (first used by {})", duplicate_of)
            }
            IssueKind::RobotsBlocked => "Blocked by robots.txt".to_string(),
            IssueKind::BrokenLink {
                link,
                status: Some(status),
                ..
            } => format!("Broken internal link {} (HTTP {})", link, status),
            IssueKind::BrokenLink { link, error, .. } => format!(
                "Broken internal link {} ({})",
                link,
                error.as_deref().unwrap_or("unreachable")
            ),
            IssueKind::FetchError { error } => format!("Fetch error: {}", error),
        }
    }
}

impl fmt::Display for CrawlIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.detail())
    }
}

/// Why a crawl stopped before its queue emptied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum CrawlTruncated {
    MaxPages { limit: usize },
    MaxDuration { seconds: u64 },
}

impl fmt::Display for CrawlTruncated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlTruncated::MaxPages { limit } => write!(f, "page limit of {} reached", limit),
            CrawlTruncated::MaxDuration { seconds } => {
                write!(f, "time limit of {}s reached", seconds)
            }
        }
    }
}

/// Everything one crawl produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    /// Fetched pages in visit order
    pub pages: Vec<PageRecord>,

    /// Issues in the order they were found
    pub issues: Vec<CrawlIssue>,

    /// Set when a budget stopped the crawl early
    pub truncated: Option<CrawlTruncated>,
}

impl CrawlReport {
    /// Issues of one kind, by kind name (`"MissingTitle"`, `"BrokenLink"`, ...)
    pub fn issues_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a CrawlIssue> + 'a {
        self.issues.iter().filter(move |issue| issue.kind.name() == kind)
    }
}

impl IssueKind {
    /// The variant name, as serialized in the `kind` tag
    pub fn name(&self) -> &'static str {
        match self {
            IssueKind::MissingTitle => "MissingTitle",
            IssueKind::DuplicateTitle { .. } => "DuplicateTitle",
            IssueKind::RobotsBlocked => "RobotsBlocked",
            IssueKind::BrokenLink { .. } => "BrokenLink",
            IssueKind::FetchError { .. } => "FetchError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_serializes_with_kind_tag() {
        let issue = CrawlIssue::new(
            "https://example.com/b",
            IssueKind::DuplicateTitle {
                duplicate_of: "https://example.com/".to_string(),
            },
        );
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({
                "url": "https://example.com/b",
                "kind": "DuplicateTitle",
                "duplicateOf": "https://example.com/"
            })
        );
    }

    #[test]
    fn test_broken_link_omits_missing_error() {
        let issue = CrawlIssue::new(
            "https://example.com/",
            IssueKind::BrokenLink {
                link: "https://example.com/gone".to_string(),
                status: Some(404),
                error: None,
            },
        );
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["status"], 404);
        assert!(value.get("error").is_none());
        assert_eq!(
            issue.detail(),
            "Broken internal link https://example.com/gone (HTTP 404)"
        );
    }

    #[test]
    fn test_detail_strings() {
        let url = "https://example.com/";
        assert_eq!(CrawlIssue::new(url, IssueKind::MissingTitle).detail(), "Missing title");
        assert_eq!(
            CrawlIssue::new(url, IssueKind::RobotsBlocked).to_string(),
            "https://example.com/: Blocked by robots.txt"
        );
        assert_eq!(
            CrawlIssue::new(
                url,
                IssueKind::FetchError {
                    error: "HTTP 500".to_string()
                }
            )
            .detail(),
            "Fetch error: HTTP 500"
        );
    }

    #[test]
    fn test_truncated_serialization() {
        assert_eq!(
            serde_json::to_value(CrawlTruncated::MaxPages { limit: 5 }).unwrap(),
            json!({"reason": "maxPages", "limit": 5})
        );
    }

    #[test]
    fn test_issues_of() {
        let report = CrawlReport {
            issues: vec![
                CrawlIssue::new("a", IssueKind::MissingTitle),
                CrawlIssue::new("b", IssueKind::RobotsBlocked),
                CrawlIssue::new("c", IssueKind::MissingTitle),
            ],
            ..Default::default()
        };
        let urls: Vec<&str> = report
            .issues_of("MissingTitle")
            .map(|i| i.url.as_str())
            .collect();
        assert_eq!(urls, vec!["a", "c"]);
    }
}
