//! Database schema definitions
//!
//! This module contains the SQL schema for the audit history database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per completed audit
CREATE TABLE IF NOT EXISTS seo_audits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_url TEXT NOT NULL,
    audit_data TEXT NOT NULL,
    view_option TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_seo_audits_site_url ON seo_audits(site_url);
CREATE INDEX IF NOT EXISTS idx_seo_audits_created_at ON seo_audits(created_at);
"#;

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Reads the schema version recorded in the database
pub fn get_schema_version(conn: &rusqlite::Connection) -> Result<u32, rusqlite::Error> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}
