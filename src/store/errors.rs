//! Document store errors
//!
//! Error codes:
//! - CORM_STORE_NOT_FOUND
//! - CORM_STORE_CONFLICT
//! - CORM_STORE_BAD_REQUEST
//! - CORM_STORE_CANCELLED
//! - CORM_STORE_DEADLINE_EXCEEDED
//! - CORM_STORE_UNSUPPORTED_DRIVER
//! - CORM_STORE_INVALID_DATABASE_NAME
//! - CORM_STORE_INTERNAL

use thiserror::Error;

/// Result type for store primitives
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a document store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No live document under this id
    #[error("document not found: {id}")]
    NotFound { id: String },

    /// Supplied revision does not match the current one
    #[error("document update conflict: {id}")]
    Conflict { id: String },

    /// Malformed request (empty id, non-object body, ...)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller cancelled the call context
    #[error("operation cancelled")]
    Cancelled,

    /// The call context deadline passed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// No driver registered under this name
    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),

    /// Database name rejected
    #[error("invalid database name: '{0}'")]
    InvalidDatabaseName(String),

    /// Store-internal failure
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "CORM_STORE_NOT_FOUND",
            StoreError::Conflict { .. } => "CORM_STORE_CONFLICT",
            StoreError::BadRequest(_) => "CORM_STORE_BAD_REQUEST",
            StoreError::Cancelled => "CORM_STORE_CANCELLED",
            StoreError::DeadlineExceeded => "CORM_STORE_DEADLINE_EXCEEDED",
            StoreError::UnsupportedDriver(_) => "CORM_STORE_UNSUPPORTED_DRIVER",
            StoreError::InvalidDatabaseName(_) => "CORM_STORE_INVALID_DATABASE_NAME",
            StoreError::Internal(_) => "CORM_STORE_INTERNAL",
        }
    }

    /// True for errors raised by the caller's own call context
    pub fn is_context_error(&self) -> bool {
        matches!(self, StoreError::Cancelled | StoreError::DeadlineExceeded)
    }
}
