//! App Core.
//!
//! Central struct holding the database and the settings the request handlers need.

use std::path::Path;

use crate::database::connection::{Database, IN_MEMORY};
use crate::services::item_validator::ItemValidator;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait, DEFAULT_CONFIG_FILE};
use crate::types::errors::SettingsError;
use crate::types::settings::AppSettings;

/// Central application struct.
///
/// `BookmarkManager` is created on demand via `db.connection()` because it
/// borrows the connection with a lifetime parameter.
pub struct App {
    pub db: Database,
    pub settings_engine: SettingsEngine,
    pub validator: ItemValidator,
}

impl App {
    /// Creates a new App on top of the database at `db_path` with default settings.
    ///
    /// Settings are kept beside a file database (`data/test.db` uses
    /// `data/test.json`), or in [`DEFAULT_CONFIG_FILE`] for `:memory:`.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = AppSettings::default();
        settings.database.path = db_path.to_string();
        let config_path = if db_path == IN_MEMORY {
            DEFAULT_CONFIG_FILE.to_string()
        } else {
            Path::new(db_path).with_extension("json").to_string_lossy().to_string()
        };
        Self::from_engine(SettingsEngine::with_settings(&config_path, settings))
    }

    /// Creates an App from an already loaded settings engine.
    pub fn from_engine(settings_engine: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = settings_engine.get_settings();
        let db = Database::from_settings(&settings.database)?;
        let validator = ItemValidator::new(settings.validation.clone());
        tracing::debug!(database = db.location(), config = settings_engine.get_config_path(), "app initialised");

        Ok(Self {
            db,
            settings_engine,
            validator,
        })
    }

    /// Stores new settings and rebuilds the validator from them. The database
    /// location only changes on the next start.
    pub fn apply_settings(&mut self, settings: AppSettings) -> Result<(), SettingsError> {
        self.settings_engine.update(settings)?;
        self.validator = ItemValidator::new(self.settings_engine.get_settings().validation.clone());
        Ok(())
    }

    /// Restores default field limits, keeping the current database location.
    pub fn reset_settings(&mut self) -> Result<(), SettingsError> {
        let database = self.settings_engine.get_settings().database.clone();
        self.settings_engine.reset()?;
        let defaults = AppSettings {
            database,
            ..self.settings_engine.get_settings().clone()
        };
        self.apply_settings(defaults)
    }
}
