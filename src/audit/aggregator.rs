//! Audit orchestration
//!
//! The [`Auditor`] runs every step of an audit in order:
//! 1. Validate the URL (the only failure besides the page fetch that aborts)
//! 2. Score performance on mobile and desktop concurrently
//! 3. Crawl the site when the requested depth is above 1
//! 4. Test whether plain HTTP redirects to HTTPS
//! 5. Fetch the page and extract its signals
//! 6. Check robots.txt and find sitemaps
//! 7. Look up DNS facts and the spread of referring-domain addresses
//! 8. Look up the domain age over WHOIS

use crate::audit::dns::{self, DnsLookup, SystemResolver};
use crate::audit::performance::{self, PageSpeedClient, PerformanceReport, PerformanceScorer};
use crate::audit::record::{AuditRecord, SiteFacts};
use crate::audit::whois::{domain_age, TcpWhois, WhoisLookup};
use crate::config::Config;
use crate::crawler::{parse_start_url, CrawlEngine, CrawlOptions, CrawlReport, Fetcher};
use crate::extract::extract_signals;
use crate::robots;
use crate::SiteLensError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Runs audits with a shared HTTP client and pluggable external services
#[derive(Clone)]
pub struct Auditor {
    config: Arc<Config>,
    fetcher: Fetcher,
    scorer: Option<Arc<dyn PerformanceScorer>>,
    dns: Arc<dyn DnsLookup>,
    whois: Arc<dyn WhoisLookup>,
}

impl Auditor {
    /// Creates an auditor with the production service clients
    ///
    /// Performance scoring is enabled only when an API key is configured.
    pub fn new(config: &Config) -> Result<Self, SiteLensError> {
        let fetcher = Fetcher::new(&config.user_agent, &config.crawler)?;
        let scorer = PageSpeedClient::from_config(fetcher.client().clone(), &config.performance)
            .map(|client| Arc::new(client) as Arc<dyn PerformanceScorer>);
        let whois_timeout = Duration::from_secs(config.crawler.request_timeout_secs);

        Ok(Self {
            config: Arc::new(config.clone()),
            fetcher,
            scorer,
            dns: Arc::new(SystemResolver::new()),
            whois: Arc::new(TcpWhois::new(whois_timeout)),
        })
    }

    /// Replaces the performance scorer; `None` disables scoring
    pub fn with_scorer(mut self, scorer: Option<Arc<dyn PerformanceScorer>>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_dns(mut self, dns: Arc<dyn DnsLookup>) -> Self {
        self.dns = dns;
        self
    }

    pub fn with_whois(mut self, whois: Arc<dyn WhoisLookup>) -> Self {
        self.whois = whois;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Audits `url`, crawling the site as well when `depth > 1`
    ///
    /// # Returns
    ///
    /// * `Ok(AuditRecord)` - Every field filled as far as its source allowed
    /// * `Err(SiteLensError::InvalidUrl)` - `url` is not an absolute HTTP(S) URL
    /// * `Err(SiteLensError::Fetch)` - The page itself could not be fetched
    pub async fn audit(&self, url: &str, depth: u32) -> Result<AuditRecord, SiteLensError> {
        let page_url = parse_start_url(url)?;
        let host = page_url.host_str().unwrap_or_default().to_string();
        tracing::info!("Auditing {} (depth {})", page_url, depth);

        let performance = match &self.scorer {
            Some(scorer) => performance::run(scorer.as_ref(), page_url.as_str()).await,
            None => {
                tracing::warn!("PageSpeed API key not configured; skipping performance scores");
                PerformanceReport::default()
            }
        };

        let crawl = if depth > 1 {
            Some(self.crawl(&page_url, depth).await?)
        } else {
            None
        };

        let https_redirect = self.https_redirect(&page_url).await;

        let page = self
            .fetcher
            .fetch_page(&page_url)
            .await
            .map_err(|source| SiteLensError::Fetch {
                url: page_url.to_string(),
                source,
            })?;

        let mut signals = extract_signals(
            &page.body,
            &page.final_url,
            &page.headers,
            self.config.crawler.resolve_mode,
        );

        let mut site = SiteFacts {
            ssl_enabled: page.final_url.scheme() == "https",
            https_redirect,
            ..SiteFacts::default()
        };
        self.check_robots(&page_url, &mut site).await;

        site.dns = dns::gather(self.dns.as_ref(), &host).await;
        let (unique_ips, unique_subnets) =
            dns::ip_spread(self.dns.as_ref(), signals.link_analysis.referring_domains()).await;
        signals.link_analysis.set_ip_counts(unique_ips, unique_subnets);

        site.domain_age = match self.whois.creation_date(&host).await {
            Ok(Some(created)) => Some(domain_age(created, Utc::now())),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("WHOIS lookup for {} failed: {}", host, e);
                None
            }
        };

        tracing::info!("Audit of {} complete", page_url);
        Ok(AuditRecord::assemble(signals, site, performance, crawl))
    }

    async fn crawl(&self, page_url: &Url, depth: u32) -> Result<CrawlReport, SiteLensError> {
        let options = CrawlOptions::from_config(&self.config.crawler, depth);
        CrawlEngine::new(self.fetcher.clone(), options)
            .crawl(page_url.as_str())
            .await
    }

    /// Plain-HTTP URLs only; HTTPS URLs report `false`
    async fn https_redirect(&self, page_url: &Url) -> bool {
        if page_url.scheme() != "http" {
            return false;
        }

        self.fetcher
            .redirects_to_https(page_url)
            .await
            .unwrap_or_else(|e| {
                tracing::debug!("HTTPS redirect test for {} failed: {}", page_url, e);
                false
            })
    }

    async fn check_robots(&self, page_url: &Url, site: &mut SiteFacts) {
        if let Some(parsed) = robots::fetch_robots(&self.fetcher, page_url).await {
            site.robots_txt_exists = true;
            site.blocked_by_robots = !robots::is_allowed(&parsed, page_url.as_str());
            site.xml_sitemaps = parsed.sitemaps();
        }

        if site.xml_sitemaps.is_empty() {
            if let Ok(fallback) = page_url.join("/sitemap.xml") {
                if self.fetcher.exists(&fallback).await {
                    site.xml_sitemaps.push(fallback.to_string());
                } else {
                    tracing::debug!("No sitemap found at {}", fallback);
                }
            }
        }
    }
}
