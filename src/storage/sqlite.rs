//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the AuditStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{AuditStore, StorageError, StorageResult};
use crate::storage::StoredAudit;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

const SELECT_AUDIT: &str =
    "SELECT id, site_url, audit_data, view_option, created_at FROM seo_audits";

/// SQLite storage backend
///
/// The connection sits behind a mutex so one store can serve every request.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        tracing::debug!("Opened audit database at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Raw column values of one row; JSON is decoded outside the row closure
struct AuditRow {
    id: i64,
    site_url: String,
    audit_data: String,
    view_option: Option<String>,
    created_at: String,
}

impl AuditRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            site_url: row.get(1)?,
            audit_data: row.get(2)?,
            view_option: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn decode(self) -> StorageResult<StoredAudit> {
        let audit_data: Value = serde_json::from_str(&self.audit_data).map_err(|e| {
            StorageError::Serialization(format!("audit {} has invalid JSON: {}", self.id, e))
        })?;

        Ok(StoredAudit {
            id: self.id,
            site_url: self.site_url,
            audit_data,
            view_option: self.view_option,
            created_at: self.created_at,
        })
    }
}

fn fetch_audit(conn: &Connection, id: i64) -> StorageResult<Option<StoredAudit>> {
    let row = conn
        .query_row(
            &format!("{} WHERE id = ?1", SELECT_AUDIT),
            params![id],
            AuditRow::from_row,
        )
        .optional()?;

    row.map(AuditRow::decode).transpose()
}

impl AuditStore for SqliteStore {
    fn save_audit(&self, site_url: &str, audit_data: &Value) -> StorageResult<i64> {
        let data = serde_json::to_string(audit_data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let conn = self.lock();
        conn.execute(
            "INSERT INTO seo_audits (site_url, audit_data, created_at) VALUES (?1, ?2, ?3)",
            params![site_url, data, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_audits(&self) -> StorageResult<Vec<StoredAudit>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, id DESC",
            SELECT_AUDIT
        ))?;

        let rows = stmt
            .query_map([], AuditRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(AuditRow::decode).collect()
    }

    fn get_audit(&self, id: i64) -> StorageResult<Option<StoredAudit>> {
        fetch_audit(&self.lock(), id)
    }

    fn delete_audit(&self, id: i64) -> StorageResult<bool> {
        let deleted = self
            .lock()
            .execute("DELETE FROM seo_audits WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn update_view_option(&self, id: i64, view_option: Option<&str>) -> StorageResult<StoredAudit> {
        let conn = self.lock();
        let updated = conn.execute(
            "UPDATE seo_audits SET view_option = ?1 WHERE id = ?2",
            params![view_option, id],
        )?;

        if updated == 0 {
            return Err(StorageError::AuditNotFound(id));
        }

        fetch_audit(&conn, id)?.ok_or(StorageError::AuditNotFound(id))
    }
}
