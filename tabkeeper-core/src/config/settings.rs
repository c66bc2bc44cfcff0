//! Application settings
//!
//! Stored as `settings.toml`. Every section and field has a default, so a
//! partial or empty file loads fine.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::window::DEFAULT_MAX_WINDOWS;

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabSettings {
    /// Tab state persistence
    pub persistence: PersistenceSettings,
    /// Logging
    pub logging: LoggingSettings,
    /// Randomized simulation
    pub simulation: SimulationSettings,
}

/// Tab state persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Base directory for tab state; defaults to the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    /// Quiet period before a metadata save is written
    pub save_debounce_ms: u64,
    /// Whether `pause_save_tab_list` suspends metadata saves
    pub pause_list_saves: bool,
    /// Maximum number of simultaneously open windows
    pub max_windows: usize,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            state_dir: None,
            save_debounce_ms: 500,
            pause_list_saves: true,
            max_windows: DEFAULT_MAX_WINDOWS,
        }
    }
}

impl PersistenceSettings {
    /// Returns the debounce interval
    #[must_use]
    pub const fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Returns the configured state directory, falling back to
    /// `<data_dir>/tabkeeper`.
    #[must_use]
    pub fn resolve_state_dir(&self) -> Option<PathBuf> {
        self.state_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("tabkeeper")))
    }

    /// Sets the state directory
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    /// Sets the debounce interval in milliseconds
    #[must_use]
    pub const fn with_save_debounce_ms(mut self, ms: u64) -> Self {
        self.save_debounce_ms = ms;
        self
    }

    /// Enables or disables pausing of metadata saves
    #[must_use]
    pub const fn with_pause_list_saves(mut self, enabled: bool) -> Self {
        self.pause_list_saves = enabled;
        self
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Full `EnvFilter` directive, overrides `level` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filter: None,
        }
    }
}

/// Randomized simulation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Steps per run when none are given
    pub default_steps: usize,
    /// Relative operation weights
    pub weights: OperationWeights,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            default_steps: 1000,
            weights: OperationWeights::default(),
        }
    }
}

/// Relative weight of each simulated operation. A weight of 0 disables it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct OperationWeights {
    pub add_tab: u32,
    pub close_tab: u32,
    pub cancel_closure: u32,
    pub commit_closures: u32,
    pub move_tab: u32,
    pub move_related_tabs: u32,
    pub set_index: u32,
    pub pin_tab: u32,
    pub unpin_tab: u32,
    pub merge_tabs: u32,
    pub ungroup_tabs: u32,
    pub ungroup_group: u32,
    pub group_visuals: u32,
    pub select_model: u32,
    pub close_all: u32,
}

impl Default for OperationWeights {
    fn default() -> Self {
        Self {
            add_tab: 20,
            close_tab: 10,
            cancel_closure: 6,
            commit_closures: 3,
            move_tab: 8,
            move_related_tabs: 4,
            set_index: 8,
            pin_tab: 4,
            unpin_tab: 3,
            merge_tabs: 6,
            ungroup_tabs: 3,
            ungroup_group: 2,
            group_visuals: 4,
            select_model: 2,
            close_all: 1,
        }
    }
}
