//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_secs()],
            )?;
            info!(version, "applied schema migration");
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
        -- Single-row registry state
        CREATE TABLE registry_meta (
            id INTEGER PRIMARY KEY CHECK (id = 0),
            token_origin INTEGER NOT NULL,    -- first id ever minted
            next_token_id INTEGER NOT NULL    -- monotonic, never reused
        );

        -- Post ledger: append-only
        CREATE TABLE posts (
            token_id INTEGER PRIMARY KEY,
            post_uri TEXT NOT NULL,
            original_author BLOB NOT NULL,    -- 20 bytes
            published_at INTEGER NOT NULL,    -- Unix seconds, registry clock
            author_index INTEGER NOT NULL,    -- position in the author's history

            UNIQUE(original_author, author_index)
        );

        -- Ownership index: mutated on transfer
        CREATE TABLE tokens (
            token_id INTEGER PRIMARY KEY REFERENCES posts(token_id),
            owner BLOB NOT NULL,              -- 20 bytes
            owner_index INTEGER NOT NULL,     -- position in the owner's holdings

            UNIQUE(owner, owner_index)
        );

        CREATE INDEX idx_posts_author ON posts(original_author, author_index);
        CREATE INDEX idx_tokens_owner ON tokens(owner, owner_index);
        "#,
    )?;

    Ok(())
}

/// Get current time in seconds.
fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
