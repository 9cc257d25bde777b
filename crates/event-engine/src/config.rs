//! Configuration loading for the event engine.
//!
//! Engine settings are loaded from a TOML configuration file. Every section
//! has defaults, so partial files are fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Default admission cap for simultaneously active events.
pub const MAX_CONCURRENT_EVENTS: usize = 3;

/// Default number of entries returned by history queries.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Admission and query limits
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_concurrent_events == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_concurrent_events must be at least 1".to_string(),
            ));
        }
        if self.scheduler.min_lead_minutes == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.min_lead_minutes must be at least 1".to_string(),
            ));
        }
        if self.scheduler.min_lead_minutes > self.scheduler.max_lead_minutes {
            return Err(ConfigError::Invalid(format!(
                "scheduler.min_lead_minutes ({}) exceeds max_lead_minutes ({})",
                self.scheduler.min_lead_minutes, self.scheduler.max_lead_minutes
            )));
        }
        Ok(())
    }
}

/// Admission and query limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum simultaneously active events
    pub max_concurrent_events: usize,
    /// Default limit for history queries
    pub history_query_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_events: MAX_CONCURRENT_EVENTS,
            history_query_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Smallest offset between world time and a scheduled start
    pub min_lead_minutes: u64,
    /// Largest offset between world time and a scheduled start
    pub max_lead_minutes: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_lead_minutes: 5,
            max_lead_minutes: 60,
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Live world event engine configuration

[limits]
max_concurrent_events = 3
history_query_limit = 20

[scheduler]
min_lead_minutes = 5
max_lead_minutes = 60
"#
    .to_string()
}
