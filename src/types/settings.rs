use serde::{Deserialize, Serialize};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppSettings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub validation: ValidationSettings,
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    /// File path of the database. `:memory:` opens a transient in-memory database.
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "bookmarks.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `info` or `bookmarks=debug`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Limits applied to user supplied bookmark fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationSettings {
    /// Characters that may never appear in a display name, in addition to `/`.
    pub invalid_chars: String,
    pub max_display_name_len: usize,
    pub max_url_len: usize,
    pub max_path_len: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            invalid_chars: "<>\"'&\\`".to_string(),
            max_display_name_len: 128,
            max_url_len: 512,
            max_path_len: 512,
        }
    }
}
