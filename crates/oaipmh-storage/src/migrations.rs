//! Database schema migrations.
//!
//! Applies the initial schema: metadata_formats, records,
//! matterhorn_records and the schema_migrations bookkeeping table.

use rusqlite::Connection;
use tracing::info;

use oaipmh_core::error::OaiError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), OaiError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| OaiError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| OaiError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), OaiError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata_formats (
            prefix          TEXT PRIMARY KEY NOT NULL,
            namespace       TEXT NOT NULL,
            schema_location TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS records (
            identifier      TEXT PRIMARY KEY NOT NULL,
            metadata_prefix TEXT NOT NULL,
            datestamp       INTEGER NOT NULL,
            xml             TEXT NOT NULL,
            harvested_at    INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY (metadata_prefix) REFERENCES metadata_formats(prefix)
        );

        CREATE INDEX IF NOT EXISTS idx_records_metadata_prefix
            ON records (metadata_prefix);

        -- One row per record, enforced by the UNIQUE constraint.
        CREATE TABLE IF NOT EXISTS matterhorn_records (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            record_identifier   TEXT NOT NULL UNIQUE,
            title               TEXT NOT NULL DEFAULT '',
            description         TEXT NOT NULL DEFAULT '',
            created_at          INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            updated_at          INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            FOREIGN KEY (record_identifier) REFERENCES records(identifier) ON DELETE CASCADE
        );

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| OaiError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
