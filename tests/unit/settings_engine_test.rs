//! Integration-level unit tests for the SettingsEngine public API.

use std::path::PathBuf;

use secretmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use secretmarks::types::errors::SettingsError;
use secretmarks::types::settings::{VaultSettings, DEFAULT_KDF_ITERATIONS};
use tempfile::TempDir;

/// Helper: a SettingsEngine whose config file lives in `dir`.
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    SettingsEngine::new(Some(dir.path().join("config.json")))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();
    assert_eq!(settings, VaultSettings::default());
    assert_eq!(settings.kdf_iterations, DEFAULT_KDF_ITERATIONS);
}

#[test]
fn test_update_persists_and_reloads() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let custom = VaultSettings {
        database_path: PathBuf::from("/tmp/elsewhere.db"),
        kdf_iterations: 250_000,
        log_filter: "secretmarks=debug".to_string(),
    };
    engine.update(custom.clone()).unwrap();
    assert!(engine.get_config_path().exists());

    let mut reloaded = engine_in_temp(&dir);
    assert_eq!(reloaded.load().unwrap(), custom);
}

/// Keys missing from the file fall back to their defaults.
#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), r#"{"kdf_iterations": 5000}"#).unwrap();

    let settings = engine_in_temp(&dir).load().unwrap();
    assert_eq!(settings.kdf_iterations, 5000);
    assert_eq!(settings.log_filter, VaultSettings::default().log_filter);
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

    assert!(matches!(
        engine_in_temp(&dir).load(),
        Err(SettingsError::SerializationError(_))
    ));
}

#[test]
fn test_zero_iterations_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let bad = VaultSettings {
        kdf_iterations: 0,
        ..VaultSettings::default()
    };
    assert!(matches!(engine.update(bad), Err(SettingsError::InvalidValue(_))));
    assert!(!engine.get_config_path().exists());

    std::fs::write(dir.path().join("config.json"), r#"{"kdf_iterations": 0}"#).unwrap();
    assert!(matches!(engine.load(), Err(SettingsError::InvalidValue(_))));
}
