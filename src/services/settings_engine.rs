// SecretMarks Settings Engine
// Loads and saves the vault configuration as a JSON file at the platform-specific config path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::VaultSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<VaultSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &VaultSettings;
    fn update(&mut self, settings: VaultSettings) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &Path;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: VaultSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `config.json`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("config.json"));
        Self {
            config_path,
            settings: VaultSettings::default(),
        }
    }

    fn validate(settings: &VaultSettings) -> Result<(), SettingsError> {
        if settings.kdf_iterations == 0 {
            return Err(SettingsError::InvalidValue(
                "kdf_iterations must be at least 1".to_string(),
            ));
        }
        if settings.database_path.as_os_str().is_empty() {
            return Err(SettingsError::InvalidValue(
                "database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults. A malformed file is a serialization error;
    /// fields absent from the file take their default values.
    fn load(&mut self) -> Result<VaultSettings, SettingsError> {
        if !self.config_path.exists() {
            self.settings = VaultSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: VaultSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Self::validate(&settings)?;

        tracing::debug!(path = %self.config_path.display(), "loaded settings");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &VaultSettings {
        &self.settings
    }

    /// Replaces the in-memory settings after validation and writes them to disk.
    fn update(&mut self, settings: VaultSettings) -> Result<(), SettingsError> {
        Self::validate(&settings)?;
        self.settings = settings;
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
