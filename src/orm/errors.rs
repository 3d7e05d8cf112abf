//! Mapper error types
//!
//! Every failure is returned to the immediate caller; nothing is retried
//! or swallowed. Store errors are translated to the stable kinds below
//! where the mapper inspects them and passed through as `Store` otherwise.

use thiserror::Error;

use super::config::ConfigError;
use crate::document::DocumentError;
use crate::store::StoreError;

/// Result type for mapper operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Mapper errors
#[derive(Debug, Error)]
pub enum OrmError {
    /// Record shape is missing or mistypes a reserved field
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// `Type` is set but names another logical type
    #[error("doc.Type '{declared}' does not match `{type_name}` document")]
    TypeMismatch { declared: String, type_name: String },

    /// Save targeted an id that already exists
    #[error("doc.Id: {id} for `{type_name}` document already created")]
    DuplicateId { id: String, type_name: String },

    /// Operation needs a document id
    #[error("doc.Id is required")]
    MissingId,

    /// Update needs a document id or revision
    #[error("doc.Id and doc.Rev are required")]
    MissingIdOrRev,

    /// Read or delete target does not exist
    #[error("doc.Id not found: {id}")]
    DocumentNotFound { id: String },

    /// Store rejected a write for a stale revision
    #[error("revision conflict on document {id}")]
    RevisionConflict { id: String },

    /// Record could not be serialized into a document body
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored document does not fit the caller's record shape
    #[error("failed to decode document {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration rejected while connecting
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Untranslated store error
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrmError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            OrmError::Document(err) => err.code(),
            OrmError::TypeMismatch { .. } => "CORM_TYPE_MISMATCH",
            OrmError::DuplicateId { .. } => "CORM_DUPLICATE_ID",
            OrmError::MissingId => "CORM_MISSING_ID",
            OrmError::MissingIdOrRev => "CORM_MISSING_ID_OR_REV",
            OrmError::DocumentNotFound { .. } => "CORM_DOCUMENT_NOT_FOUND",
            OrmError::RevisionConflict { .. } => "CORM_REVISION_CONFLICT",
            OrmError::Encode(_) => "CORM_ENCODE_FAILED",
            OrmError::Decode { .. } => "CORM_DECODE_FAILED",
            OrmError::Config(_) => "CORM_CONFIG_INVALID",
            OrmError::Store(err) => err.code(),
        }
    }

    /// True when re-reading and retrying with a fresh revision can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrmError::RevisionConflict { .. })
    }

    /// True for failures detected before any store call
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            OrmError::Document(_)
                | OrmError::TypeMismatch { .. }
                | OrmError::MissingId
                | OrmError::MissingIdOrRev
                | OrmError::Encode(_)
        )
    }
}
