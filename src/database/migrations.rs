//! Schema migrations for the bookmarks SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Migrations are versioned; each runs exactly once and is recorded in
/// the `schema_version` table. Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    // journal_mode returns a row, so it cannot go through execute_batch
    let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: bookmarks table")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Add access_count and favicon to bookmarks")?;
    }

    tracing::debug!(version = CURRENT_SCHEMA_VERSION, "schema up to date");
    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    tracing::info!(version, description, "applied schema migration");
    Ok(())
}

/// V1: the single tree table. Hierarchy is expressed through `path` only.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL,
            display_name TEXT NOT NULL,
            url TEXT NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0,
            type TEXT NOT NULL CHECK (type IN ('Node', 'Folder')),
            user_name TEXT NOT NULL,
            child_count INTEGER NOT NULL DEFAULT 0,
            created INTEGER NOT NULL,
            modified INTEGER,
            UNIQUE(user_name, path, display_name)
        );

        CREATE INDEX IF NOT EXISTS idx_bookmarks_path ON bookmarks(path);
        CREATE INDEX IF NOT EXISTS idx_bookmarks_user ON bookmarks(user_name);
        CREATE INDEX IF NOT EXISTS idx_bookmarks_user_path ON bookmarks(user_name, path);
        "
    )
}

/// V2: access counting and favicons.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    if conn.prepare("SELECT access_count FROM bookmarks LIMIT 0").is_err() {
        conn.execute_batch(
            "ALTER TABLE bookmarks ADD COLUMN access_count INTEGER NOT NULL DEFAULT 0;"
        )?;
    }
    if conn.prepare("SELECT favicon FROM bookmarks LIMIT 0").is_err() {
        conn.execute_batch(
            "ALTER TABLE bookmarks ADD COLUMN favicon TEXT NOT NULL DEFAULT '';"
        )?;
    }
    Ok(())
}
