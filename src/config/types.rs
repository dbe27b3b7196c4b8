use crate::url::ResolveMode;
use serde::Deserialize;

/// Main configuration structure for SiteLens
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(rename = "search-console", default)]
    pub search_console: SearchConsoleConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Depth used when a request does not specify one
    pub default_depth: u32,

    /// Hard ceiling on pages fetched by a single crawl
    pub max_pages: usize,

    /// Wall-clock budget for a single crawl (seconds)
    pub max_duration_secs: u64,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Connect timeout (seconds)
    pub connect_timeout_secs: u64,

    /// How non-rooted relative hrefs are resolved
    pub resolve_mode: ResolveMode,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_depth: 1,
            max_pages: 200,
            max_duration_secs: 120,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            resolve_mode: ResolveMode::Standard,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteLens".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/sitelens".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// In-memory audit cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CacheConfig {
    /// Freshness window for cached audits (seconds)
    pub ttl_seconds: u64,

    /// Maximum number of URLs kept in the latest-audit cache
    pub max_entries: usize,

    /// Maximum number of history entries kept per URL
    pub max_history: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,
            max_entries: 1000,
            max_history: 50,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:3000`
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Audit persistence configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StorageConfig {
    /// Path to the SQLite database file; persistence is disabled when unset
    pub database_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: Some("./sitelens.db".to_string()),
        }
    }
}

/// PageSpeed Insights configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PerformanceConfig {
    /// API key; performance scoring is skipped when absent
    pub api_key: Option<String>,

    /// runPagespeed endpoint
    pub endpoint: String,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://www.googleapis.com/pagespeedonline/v5/runPagespeed".to_string(),
        }
    }
}

/// Search Console proxy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SearchConsoleConfig {
    /// Base URL of the Webmasters API
    pub endpoint: String,
}

impl Default for SearchConsoleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/webmasters/v3".to_string(),
        }
    }
}
