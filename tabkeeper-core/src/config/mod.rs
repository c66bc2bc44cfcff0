//! Configuration management for TabKeeper
//!
//! This module provides the `SettingsManager` for loading and saving
//! `settings.toml`.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, SETTINGS_FILE, SettingsManager};
pub use settings::{
    LoggingSettings, OperationWeights, PersistenceSettings, SimulationSettings, TabSettings,
};
