//! Search Console analytics proxy
//!
//! Forwards a one-row `searchAnalytics/query` for the last seven days,
//! filtered to a single page, using the caller's OAuth bearer token.

use crate::audit::ExternalServiceError;
use crate::server::{ApiError, AppState};
use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

const SERVICE: &str = "Search Console";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConsoleQuery {
    pub site_url: Option<String>,
}

/// `GET /api/search-console?siteUrl=`
pub async fn search_console(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchConsoleQuery>,
) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    let site_url = query
        .site_url
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing siteUrl".to_string()))?;

    let today = Local::now().date_naive();
    match query_page(&state.http, &state.search_console_endpoint, token, &site_url, today).await {
        Ok(data) => Ok(Json(data)),
        Err(e) => {
            tracing::error!("Search Console API error for {}: {}", site_url, e);
            Err(ApiError::Internal(
                "Failed to fetch Search Console data".to_string(),
            ))
        }
    }
}

/// The token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Request body for one page over the seven days ending `today`
pub fn query_body(site_url: &str, today: NaiveDate) -> Value {
    let start = today - Duration::days(7);
    json!({
        "startDate": start.format("%Y-%m-%d").to_string(),
        "endDate": today.format("%Y-%m-%d").to_string(),
        "dimensions": ["page"],
        "dimensionFilterGroups": [{
            "filters": [{
                "dimension": "page",
                "operator": "equals",
                "expression": site_url
            }]
        }],
        "rowLimit": 1
    })
}

/// Runs the query against `{endpoint}/sites/{site}/searchAnalytics/query`
pub async fn query_page(
    client: &reqwest::Client,
    endpoint: &str,
    token: &str,
    site_url: &str,
    today: NaiveDate,
) -> Result<Value, ExternalServiceError> {
    let site: String = url::form_urlencoded::byte_serialize(site_url.as_bytes()).collect();
    let request_url = format!(
        "{}/sites/{}/searchAnalytics/query",
        endpoint.trim_end_matches('/'),
        site
    );

    let response = client
        .post(&request_url)
        .bearer_auth(token)
        .json(&query_body(site_url, today))
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
