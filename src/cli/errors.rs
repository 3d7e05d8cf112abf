//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::orm::{ConfigError, OrmError};

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file could not be loaded
    #[error("CORM_CLI_CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),

    /// Database could not be opened
    #[error("CORM_CLI_CONNECT_FAILED: {0}")]
    Connect(#[from] OrmError),

    /// stdin/stdout failure
    #[error("CORM_CLI_IO_ERROR: {0}")]
    Io(#[from] io::Error),

    /// Response could not be serialized
    #[error("CORM_CLI_IO_ERROR: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CORM_CLI_CONFIG_ERROR",
            CliError::Connect(_) => "CORM_CLI_CONNECT_FAILED",
            CliError::Io(_) | CliError::Json(_) => "CORM_CLI_IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = CliError::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(err.code(), "CORM_CLI_IO_ERROR");
        assert!(err.to_string().starts_with("CORM_CLI_IO_ERROR: "));
    }

    #[test]
    fn test_config_error_code() {
        let err = CliError::from(ConfigError::Invalid("db_name must not be empty".into()));
        assert_eq!(err.code(), "CORM_CLI_CONFIG_ERROR");
        assert!(err.to_string().contains("db_name"));
    }
}
