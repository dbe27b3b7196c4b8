//! Audit and history handlers

use crate::audit::AuditRequest;
use crate::cache::CacheEntry;
use crate::output::{self, ExportFormat};
use crate::server::{ApiError, AppState};
use crate::storage::StoredAudit;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/audit`
///
/// Serves a fresh cached record when there is one; otherwise audits,
/// caches, appends to history and persists before responding.
pub async fn post_audit(
    State(state): State<AppState>,
    body: Result<Json<AuditRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if let Some(cached) = state.cache.get(&request.url, Utc::now().timestamp_millis()) {
        tracing::info!("Returning cached audit for {}", request.url);
        return respond(&cached.data, &request);
    }

    let record = state.auditor.audit(&request.url, request.depth).await?;
    let data = record.to_value();

    let entry = CacheEntry::new(Utc::now().timestamp_millis(), data.clone());
    state.cache.set(&request.url, entry.clone());
    state.cache.append_history(&request.url, entry);

    persist(&state, &request.url, &data).await;

    respond(&data, &request)
}

/// Saves an audit; failures are logged and never reach the client
async fn persist(state: &AppState, url: &str, data: &Value) {
    let store = Arc::clone(&state.store);
    let url = url.to_string();
    let data = data.clone();

    match tokio::task::spawn_blocking(move || store.save_audit(&url, &data)).await {
        Ok(Ok(id)) => tracing::debug!("Stored audit {}", id),
        Ok(Err(e)) => tracing::error!("Failed to store audit: {}", e),
        Err(e) => tracing::error!("Audit storage task failed: {}", e),
    }
}

fn respond(data: &Value, request: &AuditRequest) -> Result<Response, ApiError> {
    if request.export_type == ExportFormat::Json {
        return Ok(Json(data.clone()).into_response());
    }

    let url = Url::parse(request.url.trim())
        .map_err(|e| ApiError::BadRequest(format!("Invalid URL: {}", e)))?;
    let export = output::export(
        data,
        request.export_type,
        request.template_name(),
        &url,
        Local::now().naive_local(),
    )?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (CONTENT_TYPE, export.content_type.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub url: Option<String>,
}

/// `GET /api/audit/history?url=`
pub async fn audit_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<CacheEntry>>, ApiError> {
    let url = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing `url` query parameter".to_string()))?;

    Ok(Json(state.cache.history(&url)))
}

/// `GET /api/history`
pub async fn list_stored(State(state): State<AppState>) -> Result<Json<Vec<StoredAudit>>, ApiError> {
    let store = Arc::clone(&state.store);
    let audits = tokio::task::spawn_blocking(move || store.list_audits()).await??;
    Ok(Json(audits))
}

/// `DELETE /api/history/:id`
pub async fn delete_stored(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state.store);
    let deleted = tokio::task::spawn_blocking(move || store.delete_audit(id)).await??;

    if !deleted {
        return Err(ApiError::NotFound(format!("Audit {} not found", id)));
    }
    tracing::info!("Deleted stored audit {}", id);
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct ViewOptionUpdate {
    pub view_option: Option<String>,
}

/// `PATCH /api/history/:id`
pub async fn update_stored(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<ViewOptionUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(update) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let store = Arc::clone(&state.store);

    let audit = tokio::task::spawn_blocking(move || {
        store.update_view_option(id, update.view_option.as_deref())
    })
    .await??;

    Ok(Json(json!({ "data": audit })))
}
