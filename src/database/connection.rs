//! Opening the bookmarks database.
//!
//! Every [`Database`] handed out here has its schema migrated to
//! [`migrations::CURRENT_SCHEMA_VERSION`].

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

use super::migrations;
use crate::types::settings::DatabaseSettings;

/// Database path selecting a transient in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// How long a write waits for a competing connection's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A migrated SQLite connection plus the location it was opened from.
pub struct Database {
    conn: Connection,
    location: String,
}

impl Database {
    /// Opens (or creates) the database file at `path`.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let location = path.as_ref().display().to_string();
        tracing::info!(path = %location, "opening bookmarks database");
        Self::prepare(Connection::open(path)?, location)
    }

    /// Opens a database that lives as long as the returned value.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::prepare(Connection::open_in_memory()?, IN_MEMORY.to_string())
    }

    /// Opens the database configured in `settings`; [`IN_MEMORY`] selects
    /// [`Database::open_in_memory`].
    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self, rusqlite::Error> {
        if settings.path == IN_MEMORY {
            Self::open_in_memory()
        } else {
            Self::open(&settings.path)
        }
    }

    /// Places a relative database `path` below `data_dir`. Absolute paths and
    /// [`IN_MEMORY`] are returned unchanged.
    pub fn resolve_path(path: &str, data_dir: Option<&Path>) -> String {
        match data_dir {
            Some(dir) if path != IN_MEMORY && Path::new(path).is_relative() => {
                dir.join(path).to_string_lossy().to_string()
            }
            _ => path.to_string(),
        }
    }

    fn prepare(conn: Connection, location: String) -> Result<Self, rusqlite::Error> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::run_all(&conn)?;
        Ok(Self { conn, location })
    }

    /// The file path the database was opened from, or [`IN_MEMORY`].
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
