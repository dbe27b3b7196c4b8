//! HTTP API
//!
//! An axum router over one shared [`AppState`]:
//! - `POST /api/audit` runs (or serves a cached) audit and exports it
//! - `GET /api/audit/history` lists cached audits of one URL
//! - `/api/history` lists, deletes and annotates stored audits
//! - `GET /api/search-console` proxies a Search Console query
//! - `GET /health`

mod error;
mod handlers;
mod search_console;

pub use error::ApiError;
pub use search_console::{bearer_token, query_body};

use crate::audit::Auditor;
use crate::cache::{AuditCache, MemoryCache};
use crate::config::Config;
use crate::storage::{self, AuditStore};
use crate::SiteLensError;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Everything a request handler needs, shared by reference counting
#[derive(Clone)]
pub struct AppState {
    pub auditor: Arc<Auditor>,
    pub cache: Arc<dyn AuditCache>,
    pub store: Arc<dyn AuditStore>,
    pub http: reqwest::Client,
    pub search_console_endpoint: String,
}

impl AppState {
    /// Builds the production state: real services, an in-memory cache and
    /// the configured database
    pub fn from_config(config: &Config) -> Result<Self, SiteLensError> {
        let auditor = Auditor::new(config)?;
        let cache = MemoryCache::new(&config.cache);
        let store = storage::open_store(&config.storage)?;
        Ok(Self::new(config, auditor, Arc::new(cache), Arc::new(store)))
    }

    /// Builds state from explicit parts
    pub fn new(
        config: &Config,
        auditor: Auditor,
        cache: Arc<dyn AuditCache>,
        store: Arc<dyn AuditStore>,
    ) -> Self {
        let http = auditor.fetcher().client().clone();
        Self {
            auditor: Arc::new(auditor),
            cache,
            store,
            http,
            search_console_endpoint: config.search_console.endpoint.clone(),
        }
    }
}

/// Builds the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/audit", post(handlers::post_audit))
        .route("/api/audit/history", get(handlers::audit_history))
        .route("/api/history", get(handlers::list_stored))
        .route(
            "/api/history/:id",
            delete(handlers::delete_stored).patch(handlers::update_stored),
        )
        .route("/api/search-console", get(search_console::search_console))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C
///
/// # Returns
///
/// * `Ok(())` - The server shut down cleanly
/// * `Err(SiteLensError)` - State setup, bind or serve failed
pub async fn serve(config: &Config) -> Result<(), SiteLensError> {
    let state = AppState::from_config(config)?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
