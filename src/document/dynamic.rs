//! Schemaless records
//!
//! A `DynamicDocument` pairs a logical type name with a JSON object.
//! Reserved fields live under `_id`, `_rev` and `type`; any of them may be
//! absent, which is what strict extraction reports on.

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::{DocumentError, DocumentResult};
use super::{Document, ReservedField, ID_KEY, REV_KEY, TYPE_KEY};

/// A record with no static shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicDocument {
    #[serde(skip)]
    type_name: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl DynamicDocument {
    /// Create an empty record of the given logical type
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Map::new(),
        }
    }

    /// Wrap a JSON value.
    ///
    /// The value must be an object, and any reserved key it carries must
    /// hold a string.
    pub fn from_value(type_name: impl Into<String>, value: Value) -> DocumentResult<Self> {
        let type_name = type_name.into();
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(DocumentError::NotAnObject {
                    type_name,
                    found: json_kind(&other),
                })
            }
        };

        for (key, value) in &fields {
            check_field(&type_name, key, value)?;
        }

        Ok(Self { type_name, fields })
    }

    /// Set a field. Reserved keys only accept strings.
    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> DocumentResult<Self> {
        let key = key.into();
        let value = value.into();
        check_field(&self.type_name, &key, &value)?;
        self.fields.insert(key, value);
        Ok(self)
    }

    /// Insert empty `_id` and `_rev` when the record does not carry them,
    /// so a fresh record can go through extraction and be saved.
    pub fn with_reserved_defaults(mut self) -> Self {
        for key in [ID_KEY, REV_KEY] {
            self.fields
                .entry(key.to_string())
                .or_insert_with(|| Value::String(String::new()));
        }
        self
    }

    /// Read a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl Document for DynamicDocument {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn id(&self) -> Option<&str> {
        self.str_field(ID_KEY)
    }

    fn rev(&self) -> Option<&str> {
        self.str_field(REV_KEY)
    }

    fn doc_type(&self) -> Option<&str> {
        self.str_field(TYPE_KEY)
    }

    fn set_id(&mut self, id: String) {
        self.fields.insert(ID_KEY.to_string(), Value::String(id));
    }

    fn set_rev(&mut self, rev: String) {
        self.fields.insert(REV_KEY.to_string(), Value::String(rev));
    }
}

/// Reject a non-string value under a reserved key
fn check_field(type_name: &str, key: &str, value: &Value) -> DocumentResult<()> {
    let field = match key {
        ID_KEY => ReservedField::Id,
        REV_KEY => ReservedField::Rev,
        TYPE_KEY => ReservedField::Type,
        _ => return Ok(()),
    };
    if value.is_string() {
        return Ok(());
    }
    Err(DocumentError::InvalidReservedField {
        type_name: type_name.to_string(),
        field,
        found: json_kind(value),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
