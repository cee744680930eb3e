//! Engine configuration.
//!
//! Configuration for the alert engine, including:
//! - Rule thresholds and which built-in rules are enabled
//! - Capacity limits of the in-memory stores

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AlertError, Result};
use crate::rules::DEFAULT_FUEL_LOW_THRESHOLD;

/// Configuration of the built-in rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Fuel level (percent) below which `FUEL_LOW` fires.
    pub fuel_low_threshold_percent: f64,
    /// Whether the `FUEL_LOW` rule is evaluated.
    pub fuel_low: bool,
    /// Whether the `NO_POWER` rule is evaluated.
    pub no_power: bool,
    /// Whether the `DUAL_POWER` rule is evaluated.
    pub dual_power: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            fuel_low_threshold_percent: DEFAULT_FUEL_LOW_THRESHOLD,
            fuel_low: true,
            no_power: true,
            dual_power: true,
        }
    }
}

impl RulesConfig {
    /// Validate the rule configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the fuel threshold is not a finite percentage.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.fuel_low_threshold_percent;
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(AlertError::InvalidConfig {
                reason: format!(
                    "fuel_low_threshold_percent must be within 0..=100, got {threshold}"
                ),
            });
        }
        Ok(())
    }
}

/// Capacity limits of the in-memory stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of alert records kept, active ones included.
    pub max_alert_history: usize,
    /// Maximum number of snapshots kept.
    pub max_snapshots: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_alert_history: 10_000,
            max_snapshots: 10_000,
        }
    }
}

impl StoreConfig {
    /// Validate the store configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_alert_history == 0 {
            return Err(AlertError::InvalidConfig {
                reason: "max_alert_history must be greater than zero".to_string(),
            });
        }
        if self.max_snapshots == 0 {
            return Err(AlertError::InvalidConfig {
                reason: "max_snapshots must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rule table settings.
    #[serde(default)]
    pub rules: RulesConfig,
    /// Store capacities.
    #[serde(default)]
    pub store: StoreConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AlertError::InvalidConfig {
                reason: format!(
                    "failed to read config file '{}': {}",
                    path.as_ref().display(),
                    e
                ),
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| AlertError::InvalidConfig {
            reason: format!("invalid TOML: {e}"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.rules.validate()?;
        self.store.validate()
    }
}
