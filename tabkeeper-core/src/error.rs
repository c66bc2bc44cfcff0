//! Error types for TabKeeper
//!
//! Each subsystem has its own `thiserror` enum and result alias. Invalid tab
//! or group ids passed to model mutations are not errors (they are no-ops);
//! the enums here cover persistence, configuration and the few model calls
//! that require an existing target.

use std::path::PathBuf;

use thiserror::Error;

use crate::tab::{InstanceId, TabGroupId, TabId};

/// Errors raised by the tab model
#[derive(Debug, Error)]
pub enum TabError {
    /// The requested tab group does not exist
    #[error("tab group not found: {0}")]
    GroupNotFound(TabGroupId),

    /// The requested tab does not exist in any collection
    #[error("tab not found: {0}")]
    TabNotFound(TabId),

    /// The selector was used before its collections were supplied
    #[error("tab model selector is not initialized")]
    NotInitialized,

    /// The selector was initialized twice
    #[error("tab model selector is already initialized")]
    AlreadyInitialized,

    /// A collection was supplied for the wrong browsing mode
    #[error("collection mode mismatch: expected {expected}, got {actual}")]
    ModeMismatch {
        /// Mode the slot requires
        expected: String,
        /// Mode of the supplied collection
        actual: String,
    },

    /// No more windows can be opened
    #[error("window limit reached ({0} windows)")]
    WindowLimitReached(usize),

    /// The requested window index is already taken
    #[error("window index already in use: {0}")]
    WindowIndexInUse(InstanceId),

    /// The requested window does not exist
    #[error("window not found: {0}")]
    WindowNotFound(InstanceId),
}

/// Result type for tab model operations
pub type TabResult<T> = Result<T, TabError>;

/// Errors raised while reading or writing persisted tab state
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(serde_json::Error),

    /// Deserialization error
    #[error("Deserialization error in {path}: {source}")]
    Deserialization {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying parser error
        source: serde_json::Error,
    },

    /// Version mismatch
    #[error("Incompatible state format version: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: u32,
        /// Actual version found
        actual: u32,
    },

    /// A background worker has shut down
    #[error("persistence worker stopped")]
    WorkerStopped,

    /// No state directory is configured and none could be determined
    #[error("could not determine tab state directory")]
    NoStateDir,

    /// The tab model rejected a restore step
    #[error(transparent)]
    Model(#[from] TabError),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors raised by the legacy layout migration
#[derive(Debug, Error)]
pub enum MigrationError {
    /// I/O error while scanning or moving files
    #[error("I/O error during migration: {0}")]
    Io(#[from] std::io::Error),

    /// The migration record could not be read or written
    #[error("migration record error: {0}")]
    Record(#[from] serde_json::Error),

    /// The blocking migration task panicked or was cancelled
    #[error("migration task failed: {0}")]
    TaskFailed(String),
}

/// Errors raised while loading or saving settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be serialized
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No configuration directory could be determined
    #[error("could not determine configuration directory")]
    NoConfigDir,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Umbrella error for callers that span several subsystems
#[derive(Debug, Error)]
pub enum TabKeeperError {
    /// Tab model error
    #[error(transparent)]
    Tab(#[from] TabError),

    /// Persistence error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Migration error
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Simulation invariant violation
    #[error(transparent)]
    Simulation(#[from] crate::simulation::SimulationError),
}
