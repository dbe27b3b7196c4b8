//! DNS facts: server address, name servers, DMARC and SPF records
//!
//! Lookups go through [`DnsLookup`]; the production implementation wraps the
//! trust-dns async resolver. Each fact degrades on its own.

use crate::audit::ExternalServiceError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Resolver operations an audit needs
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// First address of `host`
    async fn lookup_ip(&self, host: &str) -> Result<IpAddr, ExternalServiceError>;

    /// Authoritative name servers of `host`, without the trailing dot
    async fn name_servers(&self, host: &str) -> Result<Vec<String>, ExternalServiceError>;

    /// TXT records at `name`, each record's strings joined
    async fn txt_records(&self, name: &str) -> Result<Vec<String>, ExternalServiceError>;
}

/// [`DnsLookup`] backed by the system resolver configuration defaults
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
}

impl SystemResolver {
    pub fn new() -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn dns_error(e: impl std::fmt::Display) -> ExternalServiceError {
    ExternalServiceError::Dns(e.to_string())
}

#[async_trait]
impl DnsLookup for SystemResolver {
    async fn lookup_ip(&self, host: &str) -> Result<IpAddr, ExternalServiceError> {
        let lookup = self.resolver.lookup_ip(host).await.map_err(dns_error)?;
        lookup
            .iter()
            .next()
            .ok_or_else(|| dns_error(format!("no address for {}", host)))
    }

    async fn name_servers(&self, host: &str) -> Result<Vec<String>, ExternalServiceError> {
        let lookup = self.resolver.ns_lookup(host).await.map_err(dns_error)?;
        Ok(lookup
            .iter()
            .map(|ns| ns.to_string().trim_end_matches('.').to_string())
            .collect())
    }

    async fn txt_records(&self, name: &str) -> Result<Vec<String>, ExternalServiceError> {
        let lookup = self.resolver.txt_lookup(name).await.map_err(dns_error)?;
        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|part| String::from_utf8_lossy(part).into_owned())
                    .collect::<String>()
            })
            .collect())
    }
}

/// DNS-derived audit fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsFacts {
    /// Empty when the lookup failed
    pub server_ip: String,
    pub dns_servers: Vec<String>,
    pub dmarc_record: Option<String>,
    pub spf_record: Option<String>,
}

/// Gathers every DNS fact for `host`
///
/// Failures are logged at debug level and leave their field empty.
pub async fn gather(dns: &dyn DnsLookup, host: &str) -> DnsFacts {
    let server_ip = match dns.lookup_ip(host).await {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            tracing::debug!("Address lookup for {} failed: {}", host, e);
            String::new()
        }
    };

    let dns_servers = dns.name_servers(host).await.unwrap_or_else(|e| {
        tracing::debug!("NS lookup for {} failed: {}", host, e);
        Vec::new()
    });

    let dmarc_record = find_txt(dns, &format!("_dmarc.{}", host), "v=DMARC1").await;
    let spf_record = find_txt(dns, host, "v=spf1").await;

    DnsFacts {
        server_ip,
        dns_servers,
        dmarc_record,
        spf_record,
    }
}

async fn find_txt(dns: &dyn DnsLookup, name: &str, prefix: &str) -> Option<String> {
    match dns.txt_records(name).await {
        Ok(records) => records.into_iter().find(|r| r.starts_with(prefix)),
        Err(e) => {
            tracing::debug!("TXT lookup for {} failed: {}", name, e);
            None
        }
    }
}

/// Resolves each domain and counts distinct addresses and /24 subnets
///
/// Domains may carry a port (`host:8080`); it is ignored. Domains that do not
/// resolve are skipped. IPv6 addresses count as their own subnet.
///
/// # Returns
///
/// `(unique_ips, unique_subnets)`
pub async fn ip_spread(dns: &dyn DnsLookup, domains: &[String]) -> (usize, usize) {
    let mut ips: HashSet<IpAddr> = HashSet::new();

    for domain in domains {
        match dns.lookup_ip(strip_port(domain)).await {
            Ok(ip) => {
                ips.insert(ip);
            }
            Err(e) => tracing::debug!("Referring domain {} did not resolve: {}", domain, e),
        }
    }

    let subnets: HashSet<String> = ips.iter().map(subnet_key).collect();
    (ips.len(), subnets.len())
}

fn subnet_key(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            format!("{}.{}.{}", a, b, c)
        }
        IpAddr::V6(v6) => v6.to_string(),
    }
}

fn strip_port(domain: &str) -> &str {
    match domain.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) && !host.contains(':') => {
            host
        }
        _ => domain,
    }
}
