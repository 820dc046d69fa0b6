// Bookmarks Settings Engine
// Loads, saves and resets the application settings.
// Settings are stored as a JSON file; a missing file means defaults.

use std::fs;
use std::path::Path;

use crate::types::errors::SettingsError;
use crate::types::settings::AppSettings;

/// Default settings file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bookmarks.json";

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<AppSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &AppSettings;
    fn update(&mut self, settings: AppSettings) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: AppSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file,
    /// otherwise [`DEFAULT_CONFIG_FILE`].
    pub fn new(path_override: Option<String>) -> Self {
        Self {
            config_path: path_override.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()),
            settings: AppSettings::default(),
        }
    }

    /// Creates an engine holding the given settings without touching disk.
    pub fn with_settings(config_path: &str, settings: AppSettings) -> Self {
        Self {
            config_path: config_path.to_string(),
            settings,
        }
    }

    fn check(settings: &AppSettings) -> Result<(), SettingsError> {
        let v = &settings.validation;
        if v.max_display_name_len == 0 || v.max_url_len == 0 || v.max_path_len == 0 {
            return Err(SettingsError::InvalidValue(
                "validation limits must be greater than zero".to_string(),
            ));
        }
        if settings.database.path.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "database.path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed, returns a serialization error.
    fn load(&mut self) -> Result<AppSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            tracing::debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = AppSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: AppSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Self::check(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Replaces the settings and writes them to disk. Rejected values leave
    /// the current settings untouched.
    fn update(&mut self, settings: AppSettings) -> Result<(), SettingsError> {
        Self::check(&settings)?;
        self.settings = settings;
        self.save()?;
        tracing::info!(path = %self.config_path, "settings updated");
        Ok(())
    }

    /// Restores the defaults and writes them to disk.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = AppSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
