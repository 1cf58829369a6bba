//! Forecast run configuration.
//!
//! Settings can be built in code or read from a TOML file:
//!
//! ```toml
//! [forecast]
//! section_capacity = 30
//! sort_by_term = false
//! failure_policy = "abort"
//!
//! [trend]
//! epochs = 100
//! learning_rate = 0.01
//! limit_step = true
//! ```
//!
//! Every section and key is optional; missing values take the defaults above.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithms::forecast::FailurePolicy;
use crate::algorithms::trend::TrendParams;
use crate::core::domain::SectionCapacity;
use crate::core::error::{ForecastError, ForecastOutcome};

/// Configuration for one forecast run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default)]
    pub forecast: ForecastSettings,
    #[serde(default)]
    pub trend: TrendParams,
}

/// Run-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSettings {
    #[serde(default)]
    pub section_capacity: SectionCapacity,
    /// Reorder each course's observations by term label before training.
    #[serde(default)]
    pub sort_by_term: bool,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl ForecastConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(ForecastConfig)` if the file was read, parsed and validated
    /// * `Err(ForecastError::InvalidConfiguration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> ForecastOutcome<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ForecastError::InvalidConfiguration(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ForecastOutcome<Self> {
        let config: ForecastConfig = toml::from_str(content).map_err(|e| {
            ForecastError::InvalidConfiguration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `forecast.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// Returns `Ok(None)` when no file exists in any of them.
    pub fn from_default_location() -> ForecastOutcome<Option<Self>> {
        let search_paths = [
            PathBuf::from("forecast.toml"),
            PathBuf::from("rust_backend/forecast.toml"),
            PathBuf::from("../forecast.toml"),
        ];

        match search_paths.iter().find(|path| path.exists()) {
            Some(path) => Self::from_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// Check the settings that cannot be enforced by their types.
    pub fn validate(&self) -> ForecastOutcome<()> {
        if self.trend.epochs == 0 {
            return Err(ForecastError::InvalidConfiguration(
                "trend.epochs must be at least 1".to_string(),
            ));
        }

        let rate = self.trend.learning_rate;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ForecastError::InvalidConfiguration(format!(
                "trend.learning_rate must be a positive finite number, got {}",
                rate
            )));
        }

        Ok(())
    }

    pub fn section_capacity(&self) -> SectionCapacity {
        self.forecast.section_capacity
    }
}
