//! CLI configuration.
//!
//! The engine settings (`[rules]`, `[store]`) and the logging settings
//! (`[log]`) share one TOML file.

use std::path::Path;

use genwatch_alerts::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Engine settings.
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

impl CliConfig {
    /// Load configuration from a file, or use defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CliError::Config(format!("invalid TOML: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.engine
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if self.log.filter.trim().is_empty() {
            return Err(CliError::Config("log.filter cannot be empty".to_string()));
        }
        Ok(())
    }
}
