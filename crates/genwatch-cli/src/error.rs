//! CLI error types.

use genwatch_alerts::AlertError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The snapshot file could not be parsed.
    #[error("invalid snapshot input: {0}")]
    Input(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// The alert engine or one of its stores failed.
    #[error(transparent)]
    Alert(#[from] AlertError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
