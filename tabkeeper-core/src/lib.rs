//! `TabKeeper` Core Library
//!
//! This crate provides the tab model of a browser window, undoable tab
//! closure, tab groups, and background persistence of tab state.
//!
//! # Crate Structure
//!
//! - [`tab`] - Tab records, ids and launch/creation enums
//! - [`model`] - `TabCollection`, closure tracking, groups, observers and the
//!   regular/incognito `TabModelSelector`
//! - [`window`] - `TabWindowManager` and moves between windows
//! - [`persistence`] - Metadata and tab files, save coordination, legacy
//!   migration and closed-window cleanup
//! - [`simulation`] - Seeded random exercise of the tab model
//! - [`config`] - Settings loaded from `settings.toml`
//! - [`tracing`] - Structured logging setup

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod model;
pub mod persistence;
pub mod simulation;
pub mod tab;
pub mod tracing;
pub mod window;

pub use config::{
    LoggingSettings, OperationWeights, PersistenceSettings, SettingsManager, SimulationSettings,
    TabSettings,
};
pub use error::{
    ConfigError, ConfigResult, MigrationError, PersistenceError, PersistenceResult, TabError,
    TabKeeperError, TabResult,
};
pub use model::{
    ArchivedTabCreator, ClosureParams, ClosureTarget, ClosureTracker, GroupRegistry,
    LiveTabCreator, ModelRequest, ModelRequests, SharedClosureObserver, SharedMutationObserver,
    TabClosureObserver, TabCollection, TabCreationRequest, TabCreator, TabGroupVisualData,
    TabModelSelector, TabMutationObserver,
};
pub use persistence::{
    LegacyLayoutMigration, MigrationOutcome, PersistedMetadata, PersistenceCoordinator,
    PersistenceEvent, RestoreSummary, StateLayout, TabPersistentStore, TabState, TabStateStore,
    cleanup_instance_state,
};
pub use simulation::{
    SimOp, SimulationConfig, SimulationError, SimulationReport, Simulator, run_simulation,
};
pub use tab::{
    InstanceId, ProfileMode, Tab, TabCreationState, TabGroupColor, TabGroupId, TabId,
    TabIdAllocator, TabLaunchType, TabSelectionType,
};
pub use window::{DEFAULT_MAX_WINDOWS, TabWindowManager};
