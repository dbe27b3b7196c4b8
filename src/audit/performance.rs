//! Performance scoring through the PageSpeed Insights API
//!
//! Mobile and desktop runs are requested concurrently. From each Lighthouse
//! result the six headline metrics are read, categorized against fixed
//! benchmarks, and every audit that did not score a perfect 1 becomes a
//! recommendation.

use crate::audit::ExternalServiceError;
use crate::config::PerformanceConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

const SERVICE: &str = "PageSpeed Insights";

/// Device profile a score is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

/// Source of raw Lighthouse results
#[async_trait]
pub trait PerformanceScorer: Send + Sync {
    /// Runs one scoring pass and returns the raw API response
    async fn score(&self, url: &str, strategy: Strategy) -> Result<Value, ExternalServiceError>;
}

/// PageSpeed Insights v5 client
#[derive(Debug, Clone)]
pub struct PageSpeedClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl PageSpeedClient {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Builds a client when an API key is configured
    pub fn from_config(client: Client, config: &PerformanceConfig) -> Option<Self> {
        config
            .api_key
            .as_ref()
            .map(|key| Self::new(client, config.endpoint.clone(), key.clone()))
    }
}

#[async_trait]
impl PerformanceScorer for PageSpeedClient {
    async fn score(&self, url: &str, strategy: Strategy) -> Result<Value, ExternalServiceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("url", url),
                ("key", self.api_key.as_str()),
                ("strategy", strategy.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ExternalServiceError::Http {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExternalServiceError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| ExternalServiceError::Http {
                service: SERVICE,
                source,
            })
    }
}

/// A mobile/desktop pair; each side is `null` when its data is missing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevicePair<T> {
    pub mobile: Option<T>,
    pub desktop: Option<T>,
}

impl<T> Default for DevicePair<T> {
    fn default() -> Self {
        Self {
            mobile: None,
            desktop: None,
        }
    }
}

impl<T> DevicePair<T> {
    fn map<U>(&self, f: impl Fn(&T) -> Option<U>) -> DevicePair<U> {
        DevicePair {
            mobile: self.mobile.as_ref().and_then(&f),
            desktop: self.desktop.as_ref().and_then(&f),
        }
    }
}

/// Benchmark bucket of one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricCategory {
    Good,
    NeedsImprovement,
    Poor,
}

/// Buckets `value` as good up to `good`, needs-improvement up to `moderate`, else poor
pub fn categorize(value: f64, good: f64, moderate: f64) -> MetricCategory {
    if value <= good {
        MetricCategory::Good
    } else if value <= moderate {
        MetricCategory::NeedsImprovement
    } else {
        MetricCategory::Poor
    }
}

/// One headline Lighthouse metric: audit id and benchmark bounds
struct Benchmark {
    audit: &'static str,
    good: f64,
    moderate: f64,
}

const FIRST_CONTENTFUL_PAINT: Benchmark = Benchmark {
    audit: "first-contentful-paint",
    good: 1000.0,
    moderate: 3000.0,
};
const LARGEST_CONTENTFUL_PAINT: Benchmark = Benchmark {
    audit: "largest-contentful-paint",
    good: 2500.0,
    moderate: 4000.0,
};
const SPEED_INDEX: Benchmark = Benchmark {
    audit: "speed-index",
    good: 3000.0,
    moderate: 5000.0,
};
const TIME_TO_INTERACTIVE: Benchmark = Benchmark {
    audit: "interactive",
    good: 5000.0,
    moderate: 10000.0,
};
const TOTAL_BLOCKING_TIME: Benchmark = Benchmark {
    audit: "total-blocking-time",
    good: 200.0,
    moderate: 600.0,
};
const CUMULATIVE_LAYOUT_SHIFT: Benchmark = Benchmark {
    audit: "cumulative-layout-shift",
    good: 0.1,
    moderate: 0.25,
};

/// Headline metrics of one run, in milliseconds (CLS is unitless)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics<T> {
    pub first_contentful_paint: Option<T>,
    pub largest_contentful_paint: Option<T>,
    pub speed_index: Option<T>,
    pub time_to_interactive: Option<T>,
    pub total_blocking_time: Option<T>,
    pub cumulative_layout_shift: Option<T>,
}

impl<T> Metrics<T> {
    fn from_fn(f: impl Fn(&Benchmark) -> Option<T>) -> Self {
        Self {
            first_contentful_paint: f(&FIRST_CONTENTFUL_PAINT),
            largest_contentful_paint: f(&LARGEST_CONTENTFUL_PAINT),
            speed_index: f(&SPEED_INDEX),
            time_to_interactive: f(&TIME_TO_INTERACTIVE),
            total_blocking_time: f(&TOTAL_BLOCKING_TIME),
            cumulative_layout_shift: f(&CUMULATIVE_LAYOUT_SHIFT),
        }
    }
}

/// A Lighthouse audit that did not score a perfect 1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: String,
    pub title: Value,
    pub description: Value,
}

/// Everything the audit record carries about performance
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// Raw API responses
    pub psi: DevicePair<Value>,
    pub metrics: DevicePair<Metrics<f64>>,
    pub comparison: DevicePair<Metrics<MetricCategory>>,
    pub recommendations: DevicePair<Vec<Recommendation>>,
}

impl PerformanceReport {
    /// Derives metrics, comparisons and recommendations from raw responses
    pub fn from_raw(psi: DevicePair<Value>) -> Self {
        let metrics = psi.map(|raw| audits(raw).map(|a| Metrics::from_fn(|b| numeric_value(a, b))));
        let comparison = psi.map(|raw| {
            audits(raw).map(|a| {
                Metrics::from_fn(|b| numeric_value(a, b).map(|v| categorize(v, b.good, b.moderate)))
            })
        });
        let recommendations = psi.map(|raw| audits(raw).map(collect_recommendations));

        Self {
            psi,
            metrics,
            comparison,
            recommendations,
        }
    }
}

/// Runs mobile and desktop scoring concurrently
///
/// A failure on either side is logged and leaves that side `null`.
pub async fn run(scorer: &dyn PerformanceScorer, url: &str) -> PerformanceReport {
    let (mobile, desktop) = tokio::join!(
        scorer.score(url, Strategy::Mobile),
        scorer.score(url, Strategy::Desktop)
    );

    let keep = |strategy: Strategy, result: Result<Value, ExternalServiceError>| match result {
        Ok(raw) => {
            let score = raw
                .pointer("/lighthouseResult/categories/performance/score")
                .cloned()
                .unwrap_or_default();
            tracing::debug!(
                "{} performance score for {}: {}",
                strategy.as_str(),
                url,
                score
            );
            Some(raw)
        }
        Err(e) => {
            tracing::warn!("PageSpeed {} run failed for {}: {}", strategy.as_str(), url, e);
            None
        }
    };

    PerformanceReport::from_raw(DevicePair {
        mobile: keep(Strategy::Mobile, mobile),
        desktop: keep(Strategy::Desktop, desktop),
    })
}

fn audits(raw: &Value) -> Option<&serde_json::Map<String, Value>> {
    raw.pointer("/lighthouseResult/audits")?.as_object()
}

fn numeric_value(audits: &serde_json::Map<String, Value>, benchmark: &Benchmark) -> Option<f64> {
    audits.get(benchmark.audit)?.get("numericValue")?.as_f64()
}

fn collect_recommendations(audits: &serde_json::Map<String, Value>) -> Vec<Recommendation> {
    audits
        .iter()
        .filter(|(_, audit)| audit.get("score").and_then(Value::as_f64) != Some(1.0))
        .map(|(id, audit)| Recommendation {
            id: id.clone(),
            title: audit.get("title").cloned().unwrap_or(Value::Null),
            description: audit.get("description").cloned().unwrap_or(Value::Null),
        })
        .collect()
}
