//! Mapper configuration
//!
//! Built once at startup and passed explicitly; there are no process-wide
//! defaults to mutate.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::ExtractMode;
use crate::observability::Severity;
use crate::store::ClientConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How strictly Update guards optimistic concurrency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Reject only when both id and rev are empty; the store enforces the rest
    #[default]
    AllowPartial,
    /// Reject when either id or rev is empty
    RequireIdAndRev,
}

/// Mapper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrmConfig {
    /// Server address (default: "http://localhost:5984/")
    #[serde(default = "default_host")]
    pub host: String,

    /// Store driver (default: "memory")
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Database name (required)
    pub db_name: String,

    /// Reserved-field requirements (default: lenient)
    #[serde(default)]
    pub extract_mode: ExtractMode,

    /// Update precondition (default: allow_partial)
    #[serde(default)]
    pub update_policy: UpdatePolicy,

    /// Minimum log severity (default: info)
    #[serde(default)]
    pub log_level: Severity,
}

fn default_host() -> String {
    ClientConfig::default().host
}

fn default_driver() -> String {
    ClientConfig::default().driver
}

impl OrmConfig {
    /// Config for `db_name` with every other field at its default
    pub fn new(db_name: impl Into<String>) -> Self {
        Self {
            host: default_host(),
            driver: default_driver(),
            db_name: db_name.into(),
            extract_mode: ExtractMode::default(),
            update_policy: UpdatePolicy::default(),
            log_level: Severity::default(),
        }
    }

    pub fn with_extract_mode(mut self, mode: ExtractMode) -> Self {
        self.extract_mode = mode;
        self
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    pub fn with_log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: OrmConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.db_name.trim().is_empty() {
            return Err(ConfigError::Invalid("db_name must not be empty".to_string()));
        }
        if self.driver.trim().is_empty() {
            return Err(ConfigError::Invalid("driver must not be empty".to_string()));
        }
        Ok(())
    }

    /// Connection part of the configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            host: self.host.clone(),
            driver: self.driver.clone(),
        }
    }
}
