//! The flat audit record returned to clients and exported

use crate::audit::dns::DnsFacts;
use crate::audit::performance::{
    DevicePair, MetricCategory, Metrics, PerformanceReport, Recommendation,
};
use crate::crawler::{CrawlIssue, CrawlReport, CrawlTruncated, PageRecord};
use crate::extract::{Hreflang, LinkAnalysis, PageSignals};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One audit, flattened into top-level fields
///
/// Field order is the order of CSV columns and PDF lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub title: String,
    pub title_length: usize,
    pub meta_description: String,
    pub meta_description_length: usize,
    pub serp_snippet: String,
    pub hreflangs: Vec<Hreflang>,
    pub language: String,
    pub h1_tags: Vec<String>,
    pub h2_tags: Vec<String>,
    pub h3_tags: Vec<String>,
    pub h4_tags: Vec<String>,
    pub h5_tags: Vec<String>,
    pub h6_tags: Vec<String>,
    pub canonical: String,
    pub noindex_meta: bool,
    pub noindex_header: bool,
    pub ssl_enabled: bool,
    pub https_redirect: bool,
    pub robots_txt_exists: bool,
    pub blocked_by_robots: bool,
    pub xml_sitemaps: Vec<String>,
    pub analytics: Vec<String>,
    pub gtag_code: Option<String>,
    pub gtm_code: Option<String>,
    pub domain_age: Option<String>,
    pub structured_data: Vec<Value>,
    pub meta_image: String,
    pub favicon: String,
    pub psi: DevicePair<Value>,
    pub performance_metrics: DevicePair<Metrics<f64>>,
    pub performance_comparison: DevicePair<Metrics<MetricCategory>>,
    pub actionable_recommendations: DevicePair<Vec<Recommendation>>,
    pub technology: Vec<String>,
    pub server_ip: String,
    pub dns_servers: Vec<String>,
    pub web_server: String,
    pub charset: String,
    pub dmarc_record: Option<String>,
    pub spf_record: Option<String>,
    pub address_phone_shown: bool,
    pub local_business_schema: bool,
    pub google_business_profile_identified: bool,
    pub facebook_page_linked: String,
    pub open_graph_tags: String,
    pub facebook_pixel: String,
    pub x_account_linked: String,
    pub x_cards: String,
    pub instagram_linked: String,
    pub linked_in_page_linked: String,
    pub you_tube_channel_linked: String,
    pub you_tube_channel_activity: String,
    pub header_usage: BTreeMap<String, usize>,
    pub link_analysis: LinkAnalysis,
    /// Crawled pages; `null` for single-page audits
    pub site_structure: Option<Vec<PageRecord>>,
    pub crawl_issues: Option<Vec<CrawlIssue>>,
    pub crawl_truncated: Option<CrawlTruncated>,
}

/// Facts about the site gathered outside the page document
#[derive(Debug, Clone, Default)]
pub(crate) struct SiteFacts {
    pub ssl_enabled: bool,
    pub https_redirect: bool,
    pub robots_txt_exists: bool,
    pub blocked_by_robots: bool,
    pub xml_sitemaps: Vec<String>,
    pub domain_age: Option<String>,
    pub dns: DnsFacts,
}

impl AuditRecord {
    pub(crate) fn assemble(
        signals: PageSignals,
        site: SiteFacts,
        performance: PerformanceReport,
        crawl: Option<CrawlReport>,
    ) -> Self {
        let (site_structure, crawl_issues, crawl_truncated) = match crawl {
            Some(report) => (Some(report.pages), Some(report.issues), report.truncated),
            None => (None, None, None),
        };
        let local = signals.local;
        let social = signals.social;

        Self {
            title: signals.title,
            title_length: signals.title_length,
            meta_description: signals.meta_description,
            meta_description_length: signals.meta_description_length,
            serp_snippet: signals.serp_snippet,
            hreflangs: signals.hreflangs,
            language: signals.language,
            h1_tags: signals.h1_tags,
            h2_tags: signals.h2_tags,
            h3_tags: signals.h3_tags,
            h4_tags: signals.h4_tags,
            h5_tags: signals.h5_tags,
            h6_tags: signals.h6_tags,
            canonical: signals.canonical,
            noindex_meta: signals.noindex_meta,
            noindex_header: signals.noindex_header,
            ssl_enabled: site.ssl_enabled,
            https_redirect: site.https_redirect,
            robots_txt_exists: site.robots_txt_exists,
            blocked_by_robots: site.blocked_by_robots,
            xml_sitemaps: site.xml_sitemaps,
            analytics: signals.analytics,
            gtag_code: signals.gtag_code,
            gtm_code: signals.gtm_code,
            domain_age: site.domain_age,
            structured_data: signals.structured_data,
            meta_image: signals.meta_image,
            favicon: signals.favicon,
            psi: performance.psi,
            performance_metrics: performance.metrics,
            performance_comparison: performance.comparison,
            actionable_recommendations: performance.recommendations,
            technology: signals.technology,
            server_ip: site.dns.server_ip,
            dns_servers: site.dns.dns_servers,
            web_server: signals.web_server,
            charset: signals.charset,
            dmarc_record: site.dns.dmarc_record,
            spf_record: site.dns.spf_record,
            address_phone_shown: local.address_phone_shown,
            local_business_schema: local.local_business_schema,
            google_business_profile_identified: local.google_business_profile_identified,
            facebook_page_linked: social.facebook_page_linked,
            open_graph_tags: social.open_graph_tags,
            facebook_pixel: social.facebook_pixel,
            x_account_linked: social.x_account_linked,
            x_cards: social.x_cards,
            instagram_linked: social.instagram_linked,
            linked_in_page_linked: social.linked_in_page_linked,
            you_tube_channel_linked: social.you_tube_channel_linked,
            you_tube_channel_activity: social.you_tube_channel_activity,
            header_usage: signals.header_usage,
            link_analysis: signals.link_analysis,
            site_structure,
            crawl_issues,
            crawl_truncated,
        }
    }

    /// The record as a JSON object, the form cached and persisted
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
