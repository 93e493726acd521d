//! Fault injector configuration
//!
//! Loaded from a JSON file; every field has a default, so `{}` is a valid
//! configuration.
//!
//! ```json
//! {
//!   "max_slots": 16,
//!   "poll_interval_ms": 1000,
//!   "wait_timeout_secs": 600,
//!   "infinite_loop_max_iterations": 3600,
//!   "empty_registry_fast_path": true,
//!   "extra_fault_names": ["my_extension_hook"],
//!   "server": { "host": "127.0.0.1", "port": 7878 }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fault::points;
use crate::http_server::HttpServerConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration JSON
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "FI_CONFIG_READ_FAILED",
            ConfigError::Parse(_) => "FI_CONFIG_PARSE_FAILED",
            ConfigError::Invalid(_) => "FI_CONFIG_INVALID",
        }
    }
}

/// Registry and control-server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultInjectorConfig {
    /// Maximum number of simultaneously armed faults
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,

    /// Interval of every polling loop (suspend, infinite loop, wait)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Default budget for wait-until-triggered
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Polls an infinite-loop fault makes before giving up
    #[serde(default = "default_infinite_loop_max_iterations")]
    pub infinite_loop_max_iterations: u32,

    /// Skip the lock when no fault is armed (may miss a concurrently armed fault once)
    #[serde(default = "default_true")]
    pub empty_registry_fast_path: bool,

    /// Fault names accepted in addition to the built-in points
    #[serde(default)]
    pub extra_fault_names: Vec<String>,

    /// Control server binding
    #[serde(default)]
    pub server: HttpServerConfig,
}

fn default_max_slots() -> usize {
    16
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_wait_timeout_secs() -> u64 {
    600
} // 10 minutes
fn default_infinite_loop_max_iterations() -> u32 {
    3600
} // one hour at the default interval
fn default_true() -> bool {
    true
}

impl Default for FaultInjectorConfig {
    fn default() -> Self {
        Self {
            max_slots: default_max_slots(),
            poll_interval_ms: default_poll_interval_ms(),
            wait_timeout_secs: default_wait_timeout_secs(),
            infinite_loop_max_iterations: default_infinite_loop_max_iterations(),
            empty_registry_fast_path: default_true(),
            extra_fault_names: Vec::new(),
            server: HttpServerConfig::default(),
        }
    }
}

impl FaultInjectorConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: FaultInjectorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and extra fault names
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_slots == 0 {
            return Err(ConfigError::Invalid("max_slots must be > 0".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be > 0".into()));
        }
        for name in &self.extra_fault_names {
            if !points::is_well_formed(name) {
                return Err(ConfigError::Invalid(format!(
                    "extra fault name '{}' must be lowercase letters, digits and underscores",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    /// Whether `name` may be armed or addressed by a control command
    pub fn is_known_fault(&self, name: &str) -> bool {
        points::all().contains(&name) || self.extra_fault_names.iter().any(|n| n == name)
    }
}
