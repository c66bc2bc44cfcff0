//! Shared utility functions used across command modules.

use std::path::Path;

use tabkeeper_core::config::SettingsManager;
use tabkeeper_core::persistence::StateLayout;
use tabkeeper_core::TabSettings;

use crate::error::CliError;

/// Global options shared by every command
#[derive(Debug, Clone, Copy)]
pub struct GlobalArgs<'a> {
    /// Configuration directory override
    pub config_dir: Option<&'a Path>,
    /// State base directory override
    pub state_dir: Option<&'a Path>,
}

/// Creates a `SettingsManager` using the optional custom config directory
/// from CLI args.
pub fn create_settings_manager(config_dir: Option<&Path>) -> Result<SettingsManager, CliError> {
    match config_dir {
        Some(path) => Ok(SettingsManager::with_config_dir(path.to_path_buf())),
        None => SettingsManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads settings, falling back to defaults when no file exists
pub fn load_settings(config_dir: Option<&Path>) -> Result<TabSettings, CliError> {
    let manager = create_settings_manager(config_dir)?;
    manager
        .load()
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))
}

/// Resolves the state layout from the command line or the settings
pub fn resolve_layout(args: GlobalArgs<'_>) -> Result<StateLayout, CliError> {
    if let Some(dir) = args.state_dir {
        return Ok(StateLayout::new(dir));
    }
    let settings = load_settings(args.config_dir)?;
    settings
        .persistence
        .resolve_state_dir()
        .map(StateLayout::new)
        .ok_or_else(|| CliError::Config("Could not determine the tab state directory".into()))
}

/// Builds a runtime for commands that drive async persistence APIs
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Config(format!("Failed to create async runtime: {e}")))
}
