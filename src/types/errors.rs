use thiserror::Error;

// === BookmarkError ===

/// Errors produced by the bookmark store and the hierarchy validator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookmarkError {
    /// Empty identifier, malformed path or an invalid field value.
    #[error("validation failed: {0}")]
    Validation(String),
    /// An ancestor folder of the target path is not stored.
    #[error("the folder with path '{path}' and name '{name}' does not exist")]
    Hierarchy { path: String, name: String },
    /// No row matched the given id/path for the tenant.
    #[error("not found: {0}")]
    NotFound(String),
    /// A sibling with the same display name already exists.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The database or a transaction failed.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl BookmarkError {
    /// Short machine-readable tag, used by the RPC layer.
    pub fn kind(&self) -> &'static str {
        match self {
            BookmarkError::Validation(_) => "validation",
            BookmarkError::Hierarchy { .. } => "hierarchy",
            BookmarkError::NotFound(_) => "not_found",
            BookmarkError::Conflict(_) => "conflict",
            BookmarkError::Persistence(_) => "persistence",
        }
    }
}

impl From<rusqlite::Error> for BookmarkError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                BookmarkError::Conflict(err.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => BookmarkError::NotFound(err.to_string()),
            other => BookmarkError::Persistence(other.to_string()),
        }
    }
}

// === SettingsError ===

/// Errors related to loading and saving the application settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// The settings file could not be (de)serialized.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// A setting holds a value the application cannot use.
    #[error("Invalid setting: {0}")]
    InvalidValue(String),
}
