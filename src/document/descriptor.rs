//! Document descriptor extraction

use serde::{Deserialize, Serialize};

use super::errors::{DocumentError, DocumentResult};
use super::{Document, ReservedField};

/// Which reserved fields a record must carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMode {
    /// `Id`, `Rev` and `Type` are all required
    Strict,
    /// `Id` and `Rev` are required, `Type` defaults to empty
    #[default]
    Lenient,
}

/// Normalized metadata of a record, produced fresh for every operation.
///
/// Unset fields are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub type_name: String,
    pub id: String,
    pub rev: String,
    pub declared_type: String,
}

impl Descriptor {
    /// True when a non-empty `Type` disagrees with the logical type name
    pub fn type_mismatch(&self) -> bool {
        !self.declared_type.is_empty() && self.declared_type != self.type_name
    }
}

/// Extract the descriptor of a record.
///
/// Pure read: calling it twice on an unmodified record yields equal results.
pub fn extract<D: Document + ?Sized>(record: &D, mode: ExtractMode) -> DocumentResult<Descriptor> {
    let id = record.id();
    let rev = record.rev();
    let declared_type = record.doc_type();

    let mut missing = Vec::new();
    if id.is_none() {
        missing.push(ReservedField::Id);
    }
    if rev.is_none() {
        missing.push(ReservedField::Rev);
    }
    if mode == ExtractMode::Strict && declared_type.is_none() {
        missing.push(ReservedField::Type);
    }

    if !missing.is_empty() {
        return Err(DocumentError::MissingReservedField {
            type_name: record.type_name().to_string(),
            fields: missing,
        });
    }

    Ok(Descriptor {
        type_name: record.type_name().to_string(),
        id: id.unwrap_or_default().to_string(),
        rev: rev.unwrap_or_default().to_string(),
        declared_type: declared_type.unwrap_or_default().to_string(),
    })
}
