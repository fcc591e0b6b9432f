//! Error types for world construction, actions and configuration.

use crate::cell::CellId;
use thiserror::Error;

/// Errors raised by the simulation engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// The configuration cannot produce a valid world.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// No cell with this id exists in the world.
    #[error("unknown cell {0}")]
    UnknownCell(CellId),
    /// The cell exists but is dead and may no longer act.
    #[error("cell {0} is dead")]
    DeadCell(CellId),
    /// Moves must be a single cardinal step or a null move.
    #[error("step ({dx}, {dy}) is not a single cardinal step")]
    InvalidStep { dx: i32, dy: i32 },
    /// The driver supplied a different number of policies than cells.
    #[error("expected {expected} policies, got {found}")]
    PolicyCount { expected: usize, found: usize },
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::Configuration(e.to_string())
    }
}
