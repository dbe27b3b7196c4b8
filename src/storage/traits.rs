//! Storage traits and error types
//!
//! This module defines the trait interface for audit persistence backends
//! and associated error types.

use crate::storage::StoredAudit;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Audit not found: {0}")]
    AuditNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for audit persistence backends
///
/// Implementations are shared between request handlers and must provide
/// their own synchronization.
pub trait AuditStore: Send + Sync {
    /// Stores a finished audit
    ///
    /// # Arguments
    ///
    /// * `site_url` - The URL that was audited
    /// * `audit_data` - The audit record
    ///
    /// # Returns
    ///
    /// The ID of the new row
    fn save_audit(&self, site_url: &str, audit_data: &Value) -> StorageResult<i64>;

    /// Lists every stored audit, newest first
    fn list_audits(&self) -> StorageResult<Vec<StoredAudit>>;

    /// Gets one stored audit by ID
    fn get_audit(&self, id: i64) -> StorageResult<Option<StoredAudit>>;

    /// Deletes a stored audit
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted, `false` if none had that ID
    fn delete_audit(&self, id: i64) -> StorageResult<bool>;

    /// Sets the display preference of a stored audit
    ///
    /// # Returns
    ///
    /// * `Ok(StoredAudit)` - The updated row
    /// * `Err(StorageError::AuditNotFound)` - No row has that ID
    fn update_view_option(&self, id: i64, view_option: Option<&str>) -> StorageResult<StoredAudit>;
}
