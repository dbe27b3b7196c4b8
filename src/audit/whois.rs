//! WHOIS lookups for domain age
//!
//! Queries go over plain TCP port 43: the IANA root server names the
//! registry's WHOIS server, which is then asked for the domain record.

use crate::audit::ExternalServiceError;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const WHOIS_PORT: u16 = 43;
const IANA_SERVER: &str = "whois.iana.org";

/// Registration-date source
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    /// Creation date of `domain`, if the registry reports one
    async fn creation_date(&self, domain: &str) -> Result<Option<DateTime<Utc>>, ExternalServiceError>;
}

/// WHOIS over TCP with a referral from the IANA root
#[derive(Debug, Clone)]
pub struct TcpWhois {
    root_server: String,
    timeout: Duration,
}

impl TcpWhois {
    pub fn new(timeout: Duration) -> Self {
        Self {
            root_server: IANA_SERVER.to_string(),
            timeout,
        }
    }

    async fn query(&self, server: &str, domain: &str) -> Result<String, ExternalServiceError> {
        let exchange = async {
            let mut stream = TcpStream::connect((server, WHOIS_PORT)).await?;
            stream.write_all(format!("{}\r\n", domain).as_bytes()).await?;
            let mut response = Vec::new();
            stream.read_to_end(&mut response).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&response).into_owned())
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExternalServiceError::Whois(format!("{}: {}", server, e))),
            Err(_) => Err(ExternalServiceError::Whois(format!("{}: timed out", server))),
        }
    }
}

#[async_trait]
impl WhoisLookup for TcpWhois {
    async fn creation_date(&self, domain: &str) -> Result<Option<DateTime<Utc>>, ExternalServiceError> {
        let domain = registrable_name(domain);
        let root = self.query(&self.root_server, domain).await?;

        let record = match referral(&root) {
            Some(server) => {
                tracing::debug!("WHOIS for {} referred to {}", domain, server);
                self.query(&server, domain).await?
            }
            None => root,
        };

        Ok(parse_creation_date(&record))
    }
}

/// Drops a leading `www.`; registries know the domain, not the host
fn registrable_name(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// The `refer:` (or `whois:`) server named in an IANA response
fn referral(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        ((key == "refer" || key == "whois") && !value.is_empty()).then(|| value.to_string())
    })
}

/// Keys registries use for the registration date
const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "registered on",
    "registration time",
    "domain registration date",
];

/// Finds and parses the first creation-date line of a WHOIS record
pub fn parse_creation_date(record: &str) -> Option<DateTime<Utc>> {
    record.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let key = key.trim().to_ascii_lowercase();
        if !CREATION_KEYS.contains(&key.as_str()) {
            return None;
        }
        parse_date(value.trim())
    })
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%d.%m.%Y"))
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Whole years between `created` and `now`, rendered as `"N year"` / `"N years"`
pub fn domain_age(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mut years = now.year() - created.year();
    if (now.month(), now.day()) < (created.month(), created.day()) {
        years -= 1;
    }
    let years = years.max(0);
    format!("{} year{}", years, if years == 1 { "" } else { "s" })
}
