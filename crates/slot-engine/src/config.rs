//! Engine configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::recurrence::{ExpansionLimits, DEFAULT_MAX_OCCURRENCES, DEFAULT_MAX_SPAN_DAYS};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub expansion: ExpansionConfig,

    #[serde(default)]
    pub booking: BookingConfig,
}

/// Bounds on recurrence expansion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionConfig {
    #[serde(default = "default_max_occurrences")]
    pub max_occurrences: u16,

    #[serde(default = "default_max_span_days")]
    pub max_span_days: i64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_occurrences: default_max_occurrences(),
            max_span_days: default_max_span_days(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_reject_past")]
    pub reject_past: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            reject_past: default_reject_past(),
        }
    }
}

fn default_max_occurrences() -> u16 {
    DEFAULT_MAX_OCCURRENCES
}

fn default_max_span_days() -> i64 {
    DEFAULT_MAX_SPAN_DAYS
}

fn default_reject_past() -> bool {
    true
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let expansion = &self.expansion;
        if expansion.max_occurrences == 0 || expansion.max_occurrences == u16::MAX {
            return Err(EngineError::Config(format!(
                "expansion.max_occurrences must be between 1 and {}",
                u16::MAX - 1
            )));
        }
        if expansion.max_span_days <= 0 {
            return Err(EngineError::Config(
                "expansion.max_span_days must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn expansion_limits(&self) -> ExpansionLimits {
        ExpansionLimits {
            max_occurrences: self.expansion.max_occurrences,
            max_span: Duration::days(self.expansion.max_span_days),
        }
    }
}
