//! CLI error types and exit codes.

use tabkeeper_core::{ConfigError, MigrationError, PersistenceError, SimulationError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, state files, or other failures
    pub const GENERAL_ERROR: i32 = 1;
    /// A simulation step broke a tab model invariant
    pub const INVARIANT_VIOLATION: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted state could not be read or written
    #[error("State error: {0}")]
    State(String),

    /// Metadata for the requested window does not exist
    #[error("No persisted state for window {0}")]
    WindowNotFound(u32),

    /// Legacy layout migration failed
    #[error("Migration error: {0}")]
    Migration(String),

    /// The simulation could not run
    #[error("Simulation error: {0}")]
    Simulation(String),

    /// The simulation found a broken invariant
    #[error("{0}")]
    InvariantViolated(String),

    /// Output could not be produced
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PersistenceError> for CliError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Io(e) => Self::Io(e),
            other => Self::State(other.to_string()),
        }
    }
}

impl From<MigrationError> for CliError {
    fn from(err: MigrationError) -> Self {
        Self::Migration(err.to_string())
    }
}

impl From<SimulationError> for CliError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::InvariantViolated { .. } => Self::InvariantViolated(err.to_string()),
            other => Self::Simulation(other.to_string()),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error
    /// - 2: Invariant violation found by `simulate`
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvariantViolated(_) => exit_codes::INVARIANT_VIOLATION,
            Self::Config(_)
            | Self::State(_)
            | Self::WindowNotFound(_)
            | Self::Migration(_)
            | Self::Simulation(_)
            | Self::Output(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
