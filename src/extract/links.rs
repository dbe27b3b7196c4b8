//! On-page link records and the link analysis summary
//!
//! Every `<a href>` becomes a [`LinkRecord`]; [`LinkAnalysis`] aggregates them
//! into counts and top-five lists. IP-based counts need DNS and are filled in
//! later by the audit.

use crate::extract::dom;
use crate::url::{extract_domain, host_with_port};
use scraper::Html;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// Length of each "top" list in the analysis
const TOP_N: usize = 5;

/// One anchor on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    /// Raw `href` attribute value
    pub href: String,
    /// Trimmed anchor text
    pub text: String,
    /// Lowercased `rel` attribute
    pub rel: String,
    /// Absolute URL, empty when the href does not resolve to HTTP(S)
    pub normalized_url: String,
    pub is_internal: bool,
    /// `host[:port]` of the resolved URL
    pub domain: String,
}

impl LinkRecord {
    /// True when `rel` lists `nofollow`
    pub fn is_nofollow(&self) -> bool {
        self.rel.split_whitespace().any(|token| token == "nofollow")
    }

    fn is_external(&self) -> bool {
        !self.is_internal && !self.normalized_url.is_empty()
    }
}

/// Builds one record per anchor, resolved against `page_url`
///
/// A link is internal when its `host[:port]` equals the page's.
pub fn link_records(document: &Html, page_url: &Url) -> Vec<LinkRecord> {
    let page_host = host_with_port(page_url).unwrap_or_default();

    document
        .select(&dom::ANCHOR)
        .map(|el| {
            let href = el.value().attr("href").unwrap_or_default().to_string();
            let text = el.text().collect::<String>().trim().to_string();
            let rel = el.value().attr("rel").unwrap_or_default().to_lowercase();

            let resolved = page_url
                .join(href.trim())
                .ok()
                .filter(|u| matches!(u.scheme(), "http" | "https"));

            match resolved {
                Some(url) => {
                    let domain = host_with_port(&url).unwrap_or_default();
                    LinkRecord {
                        href,
                        text,
                        rel,
                        normalized_url: url.to_string(),
                        is_internal: domain == page_host,
                        domain,
                    }
                }
                None => LinkRecord {
                    href,
                    text,
                    rel,
                    normalized_url: String::new(),
                    is_internal: false,
                    domain: String::new(),
                },
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCount {
    pub url: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorCount {
    pub anchor: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeographyCount {
    pub geography: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkStructure {
    pub internal: usize,
    pub external: usize,
}

/// Summary of the page's outgoing links
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalysis {
    pub total_links: usize,
    pub internal_links_count: usize,
    pub external_links_count: usize,
    /// Counted among external links only
    pub nofollow_links_count: usize,
    pub dofollow_links_count: usize,
    pub edu_links_count: usize,
    pub gov_links_count: usize,
    pub referring_domains_count: usize,
    pub unique_subnets_count: usize,
    pub unique_ips_count: usize,
    pub top_pages_by_backlinks: Vec<PageCount>,
    pub top_anchors_by_backlinks: Vec<AnchorCount>,
    pub top_domain_geographies: Vec<GeographyCount>,
    pub on_page_link_structure: LinkStructure,
    /// External links whose anchor text is not part of their URL
    pub friendly_links_count: usize,
    #[serde(skip)]
    referring_domains: Vec<String>,
}

impl LinkAnalysis {
    /// Distinct external domains, in first-seen order
    pub fn referring_domains(&self) -> &[String] {
        &self.referring_domains
    }

    /// Sets the DNS-derived counts for the referring domains
    pub fn set_ip_counts(&mut self, unique_ips: usize, unique_subnets: usize) {
        self.unique_ips_count = unique_ips;
        self.unique_subnets_count = unique_subnets;
    }
}

/// Aggregates link records into a [`LinkAnalysis`]
pub fn analyze(links: &[LinkRecord]) -> LinkAnalysis {
    let external: Vec<&LinkRecord> = links.iter().filter(|l| l.is_external()).collect();
    let internal_links_count = links.iter().filter(|l| l.is_internal).count();
    let nofollow_links_count = external.iter().filter(|l| l.is_nofollow()).count();

    let mut referring_domains: Vec<String> = Vec::new();
    for link in &external {
        if !link.domain.is_empty() && !referring_domains.contains(&link.domain) {
            referring_domains.push(link.domain.clone());
        }
    }

    let top_pages_by_backlinks = top_counts(external.iter().map(|l| l.normalized_url.clone()))
        .into_iter()
        .map(|(url, count)| PageCount { url, count })
        .collect();

    let top_anchors_by_backlinks = top_counts(external.iter().map(|l| {
        if l.text.is_empty() {
            l.normalized_url.clone()
        } else {
            l.text.clone()
        }
    }))
    .into_iter()
    .map(|(anchor, count)| AnchorCount { anchor, count })
    .collect();

    let top_domain_geographies = top_counts(referring_domains.iter().map(|d| tld_label(d)))
        .into_iter()
        .map(|(geography, count)| GeographyCount { geography, count })
        .collect();

    LinkAnalysis {
        total_links: links.len(),
        internal_links_count,
        external_links_count: external.len(),
        nofollow_links_count,
        dofollow_links_count: external.len() - nofollow_links_count,
        edu_links_count: external.iter().filter(|l| l.domain.ends_with(".edu")).count(),
        gov_links_count: external.iter().filter(|l| l.domain.ends_with(".gov")).count(),
        referring_domains_count: referring_domains.len(),
        unique_subnets_count: 0,
        unique_ips_count: 0,
        top_pages_by_backlinks,
        top_anchors_by_backlinks,
        top_domain_geographies,
        on_page_link_structure: LinkStructure {
            internal: internal_links_count,
            external: external.len(),
        },
        friendly_links_count: external
            .iter()
            .filter(|l| !l.text.is_empty() && !l.normalized_url.contains(&l.text))
            .count(),
        referring_domains,
    }
}

/// Uppercased last label of a domain, ignoring any port
fn tld_label(domain: &str) -> String {
    let host = Url::parse(&format!("http://{}", domain))
        .ok()
        .and_then(|u| extract_domain(&u))
        .unwrap_or_else(|| domain.to_string());
    host.rsplit('.').next().unwrap_or_default().to_uppercase()
}

/// Counts keys, sorted by count descending with ties in first-seen order
fn top_counts(keys: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for key in keys {
        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.truncate(TOP_N);
    order
}
