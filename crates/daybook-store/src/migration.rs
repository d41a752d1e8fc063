//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL
//! batch that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    // Photos cascade from their record; SQLite needs this per connection.
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    // Get current version
    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Apply migrations
    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            tracing::debug!(version, "applying schema migration");
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Journal records, one per calendar date
        CREATE TABLE records (
            date_key TEXT PRIMARY KEY,        -- YYYY-MM-DD
            created_at INTEGER NOT NULL,      -- creation instant (Unix ms)
            note TEXT NOT NULL DEFAULT '',
            record_hash TEXT NOT NULL,        -- hex digest of canonical form
            algo TEXT NOT NULL,               -- hash algorithm tag
            tags TEXT,                        -- JSON array, preserves order
            location TEXT,
            pinned INTEGER NOT NULL DEFAULT 0
        );

        -- Photos, owned by their record
        CREATE TABLE photos (
            id TEXT PRIMARY KEY,
            date_key TEXT NOT NULL REFERENCES records(date_key) ON DELETE CASCADE,
            file_uri TEXT NOT NULL,           -- opaque, not part of the hash
            mime_type TEXT NOT NULL,
            sha256 TEXT NOT NULL,             -- hex digest of raw file bytes
            sort_index INTEGER NOT NULL
        );

        -- Accounts with inline token slots
        CREATE TABLE accounts (
            email TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            email_verified INTEGER NOT NULL DEFAULT 0,   -- 0/1, bool at the boundary
            email_verification_token TEXT,
            email_verification_expiry INTEGER,           -- Unix ms
            password_reset_token TEXT,
            password_reset_expiry INTEGER,               -- Unix ms
            created_at INTEGER NOT NULL
        );

        -- Sliding attempt windows per (operation class, identifier)
        CREATE TABLE rate_limits (
            op_class TEXT NOT NULL,
            identifier TEXT NOT NULL,
            attempts INTEGER NOT NULL,
            first_attempt INTEGER NOT NULL,              -- window start (Unix ms)
            locked_until INTEGER,                        -- Unix ms
            PRIMARY KEY (op_class, identifier)
        );

        -- Indexes for common queries
        CREATE INDEX idx_photos_date_key ON photos(date_key, sort_index, id);
        CREATE INDEX idx_records_created ON records(created_at);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
