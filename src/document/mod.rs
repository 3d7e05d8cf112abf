//! Document metadata extraction
//!
//! Every record handed to the mapper carries three reserved fields:
//! - `Id`: unique document identifier, assigned by the store when empty
//! - `Rev`: opaque revision token, replaced after every mutation
//! - `Type`: optional discriminator that must match the record's logical type
//!
//! Records expose these through the [`Document`] trait instead of runtime
//! field inspection. Plain structs get an impl from [`impl_document!`];
//! schemaless records use [`DynamicDocument`].

mod descriptor;
mod dynamic;
mod errors;

pub use descriptor::{extract, Descriptor, ExtractMode};
pub use dynamic::DynamicDocument;
pub use errors::{DocumentError, DocumentResult};

use std::fmt;

use serde::{Deserialize, Serialize};

/// JSON key of the identifier in a stored document
pub const ID_KEY: &str = "_id";

/// JSON key of the revision token in a stored document
pub const REV_KEY: &str = "_rev";

/// JSON key of the type discriminator in a schemaless document
pub const TYPE_KEY: &str = "type";

/// The reserved metadata fields of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReservedField {
    Id,
    Rev,
    Type,
}

impl ReservedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservedField::Id => "Id",
            ReservedField::Rev => "Rev",
            ReservedField::Type => "Type",
        }
    }
}

impl fmt::Display for ReservedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accessor contract for records persisted through the mapper.
///
/// Getters return `None` when the record shape does not carry the field
/// at all, and `Some("")` when the field exists but is unset. Extraction
/// relies on that distinction to report missing fields.
pub trait Document: Serialize {
    /// Logical type name of the record (e.g. `"Product"`)
    fn type_name(&self) -> &str;

    /// Document identifier
    fn id(&self) -> Option<&str>;

    /// Revision token
    fn rev(&self) -> Option<&str>;

    /// Type discriminator. Records without a `Type` field keep the default.
    fn doc_type(&self) -> Option<&str> {
        None
    }

    /// Store an identifier assigned by the store
    fn set_id(&mut self, id: String);

    /// Store a revision returned by the store
    fn set_rev(&mut self, rev: String);
}

/// Implements [`Document`] for a struct with `String` metadata fields.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Product {
///     #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
///     id: String,
///     #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
///     rev: String,
///     name: String,
/// }
///
/// corm::impl_document!(Product, id, rev);
/// ```
///
/// A fourth argument names the struct's `Type` field.
///
/// The id and rev fields must serialize as `_id` and `_rev`, which is what
/// the store reads and returns. Without the renames the stored body holds
/// the struct's own `id`/`rev` keys next to `_id`/`_rev`, and reads do not
/// fill the struct's id or rev back in.
#[macro_export]
macro_rules! impl_document {
    ($ty:ident, $id:ident, $rev:ident) => {
        impl $crate::document::Document for $ty {
            fn type_name(&self) -> &str {
                stringify!($ty)
            }

            fn id(&self) -> Option<&str> {
                Some(&self.$id)
            }

            fn rev(&self) -> Option<&str> {
                Some(&self.$rev)
            }

            fn set_id(&mut self, id: String) {
                self.$id = id;
            }

            fn set_rev(&mut self, rev: String) {
                self.$rev = rev;
            }
        }
    };
    ($ty:ident, $id:ident, $rev:ident, $doc_type:ident) => {
        impl $crate::document::Document for $ty {
            fn type_name(&self) -> &str {
                stringify!($ty)
            }

            fn id(&self) -> Option<&str> {
                Some(&self.$id)
            }

            fn rev(&self) -> Option<&str> {
                Some(&self.$rev)
            }

            fn doc_type(&self) -> Option<&str> {
                Some(&self.$doc_type)
            }

            fn set_id(&mut self, id: String) {
                self.$id = id;
            }

            fn set_rev(&mut self, rev: String) {
                self.$rev = rev;
            }
        }
    };
}
