//! Document extraction errors
//!
//! Error codes:
//! - CORM_MISSING_RESERVED_FIELD (REJECT)
//! - CORM_INVALID_RESERVED_FIELD (REJECT)
//! - CORM_NOT_AN_OBJECT (REJECT)

use thiserror::Error;

use super::ReservedField;

/// Result type for document extraction
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors raised while reading reserved metadata from a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The record shape does not carry one or more reserved fields
    #[error("{} required for `{type_name}` document", join_fields(.fields))]
    MissingReservedField {
        type_name: String,
        fields: Vec<ReservedField>,
    },

    /// A reserved field is present but is not a string
    #[error("doc.{field} of `{type_name}` document must be a string, found {found}")]
    InvalidReservedField {
        type_name: String,
        field: ReservedField,
        found: &'static str,
    },

    /// A schemaless record was built from something other than a JSON object
    #[error("`{type_name}` document must be a JSON object, found {found}")]
    NotAnObject {
        type_name: String,
        found: &'static str,
    },
}

impl DocumentError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::MissingReservedField { .. } => "CORM_MISSING_RESERVED_FIELD",
            DocumentError::InvalidReservedField { .. } => "CORM_INVALID_RESERVED_FIELD",
            DocumentError::NotAnObject { .. } => "CORM_NOT_AN_OBJECT",
        }
    }
}

fn join_fields(fields: &[ReservedField]) -> String {
    let names: Vec<String> = fields.iter().map(|f| format!("doc.{}", f)).collect();
    match names.len() {
        0 => String::new(),
        1 => format!("{} is", names[0]),
        n => format!("{} and {} are", names[..n - 1].join(", "), names[n - 1]),
    }
}
