//! Unit tests for the SettingsEngine public API.
//!
//! Exercises default loading, persistence, validation of loaded values and reset.

use bookmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmarks::types::errors::SettingsError;
use bookmarks::types::settings::AppSettings;
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("bookmarks.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.validation.max_display_name_len, 128);
}

#[test]
fn test_partial_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    std::fs::write(
        engine.get_config_path(),
        r#"{"database": {"path": "/var/lib/bookmarks.db"}}"#,
    )
    .unwrap();

    let settings = engine.load().unwrap();
    assert_eq!(settings.database.path, "/var/lib/bookmarks.db");
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.validation, AppSettings::default().validation);
}

#[test]
fn test_malformed_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    std::fs::write(engine.get_config_path(), "{ not json").unwrap();

    assert!(matches!(engine.load(), Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_zero_limits_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    std::fs::write(
        engine.get_config_path(),
        r#"{"validation": {"max_display_name_len": 0}}"#,
    )
    .unwrap();

    assert!(matches!(engine.load(), Err(SettingsError::InvalidValue(_))));
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let mut settings = AppSettings::default();
    settings.logging.level = "debug".to_string();
    let path = dir.path().join("nested").join("bookmarks.json");
    let engine = SettingsEngine::with_settings(path.to_str().unwrap(), settings.clone());
    engine.save().unwrap();

    let mut reloaded = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
    assert_eq!(reloaded.load().unwrap(), settings);
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut settings = AppSettings::default();
    settings.validation.invalid_chars = "#".to_string();
    let path = dir.path().join("bookmarks.json");
    let mut engine = SettingsEngine::with_settings(path.to_str().unwrap(), settings);

    engine.reset().unwrap();

    assert_eq!(engine.get_settings(), &AppSettings::default());
    let mut reloaded = engine_in_temp(&dir);
    assert_eq!(reloaded.load().unwrap(), AppSettings::default());
}

#[test]
fn test_update_saves_valid_settings_and_keeps_them_on_rejection() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let mut settings = AppSettings::default();
    settings.validation.max_url_len = 64;
    engine.update(settings.clone()).unwrap();
    assert_eq!(engine.get_settings(), &settings);

    let mut broken = settings.clone();
    broken.validation.max_path_len = 0;
    assert!(matches!(engine.update(broken), Err(SettingsError::InvalidValue(_))));
    assert_eq!(engine.get_settings(), &settings);

    let mut reloaded = engine_in_temp(&dir);
    assert_eq!(reloaded.load().unwrap().validation.max_url_len, 64);
}
