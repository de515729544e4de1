//! CLI error types

use secant_core::types::{ConfigError, EngineError};
use thiserror::Error;

use crate::config::SettingsError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be resolved.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Solver configuration rejected by the engine.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session misuse reported by the engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A command-line value that could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialisation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
