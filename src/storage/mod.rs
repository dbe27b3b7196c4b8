//! Storage module for persisting audits
//!
//! This module handles all database operations for audit history, including:
//! - SQLite database initialization and schema management
//! - Saving every completed audit
//! - Listing, deleting and annotating stored audits

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{AuditStore, StorageError, StorageResult};

use crate::config::StorageConfig;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Opens the store described by the storage config
///
/// # Arguments
///
/// * `config` - Storage section; no database path means an in-memory store
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully opened storage
/// * `Err(StorageError)` - Failed to open or initialize the database
pub fn open_store(config: &StorageConfig) -> StorageResult<SqliteStore> {
    match &config.database_path {
        Some(path) => SqliteStore::new(Path::new(path)),
        None => {
            tracing::warn!("No database path configured; audits are kept in memory only");
            SqliteStore::new_in_memory()
        }
    }
}

/// Represents a stored audit in the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredAudit {
    pub id: i64,
    pub site_url: String,
    pub audit_data: Value,
    pub view_option: Option<String>,
    /// RFC 3339 timestamp
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_store_in_memory() {
        let store = open_store(&StorageConfig {
            database_path: None,
        })
        .unwrap();
        assert!(store.list_audits().unwrap().is_empty());
    }

    #[test]
    fn test_stored_audit_serializes_snake_case() {
        let audit = StoredAudit {
            id: 1,
            site_url: "https://a.test/".to_string(),
            audit_data: serde_json::json!({}),
            view_option: None,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        };
        let value = serde_json::to_value(&audit).unwrap();
        assert_eq!(value["site_url"], "https://a.test/");
        assert!(value["view_option"].is_null());
    }
}
