//! Settings file management

use std::path::{Path, PathBuf};

use super::settings::TabSettings;
use crate::error::{ConfigError, ConfigResult};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "TABKEEPER_CONFIG_DIR";

/// Settings file name inside the configuration directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// Loads and saves [`TabSettings`] in a configuration directory
#[derive(Debug, Clone)]
pub struct SettingsManager {
    config_dir: PathBuf,
}

impl SettingsManager {
    /// Creates a manager for the default configuration directory.
    ///
    /// Uses `$TABKEEPER_CONFIG_DIR` when set, otherwise
    /// `<config_dir>/tabkeeper`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if no directory can be determined.
    pub fn new() -> ConfigResult<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
            && !dir.is_empty()
        {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }
        let dir = dirs::config_dir()
            .map(|dir| dir.join("tabkeeper"))
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(dir))
    }

    /// Creates a manager for an explicit directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the path of the settings file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Loads settings; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> ConfigResult<TabSettings> {
        Self::load_from(&self.settings_path())
    }

    /// Loads settings from an explicit file; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> ConfigResult<TabSettings> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(TabSettings::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Settings loaded");
        Ok(settings)
    }

    /// Saves settings, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, settings: &TabSettings) -> ConfigResult<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let content = toml::to_string_pretty(settings)?;
        std::fs::write(self.settings_path(), content)?;
        tracing::debug!(path = %self.settings_path().display(), "Settings saved");
        Ok(())
    }
}
