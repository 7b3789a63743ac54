//! Friendly field types and the duck-typed field specs callers write.

use crate::error::SchemaError;
use serde::Deserialize;
use serde_json::Value;

/// Friendly type names accepted in a field map, with their PostgreSQL
/// renditions. The storage type is used both for DDL and for bind casts
/// (`$n::type`) so raw form strings coerce inside the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    String,
    Text,
    Markdown,
    Number,
    Integer,
    Boolean,
    Date,
    /// Escape hatch: any non-string, non-options spec value. Stored as JSONB.
    Object,
}

impl FieldType {
    pub fn from_name(field: &str, name: &str) -> Result<FieldType, SchemaError> {
        Ok(match name {
            "string" => FieldType::String,
            "text" => FieldType::Text,
            "markdown" => FieldType::Markdown,
            "number" => FieldType::Number,
            "integer" => FieldType::Integer,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "object" => FieldType::Object,
            _ => {
                return Err(SchemaError::UnknownType {
                    field: field.to_string(),
                    type_name: name.to_string(),
                })
            }
        })
    }

    pub fn pg_type(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Text | FieldType::Markdown => "text",
            FieldType::Number => "double precision",
            FieldType::Integer => "bigint",
            FieldType::Boolean => "boolean",
            FieldType::Date => "timestamptz",
            FieldType::Object => "jsonb",
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, FieldType::Date)
    }
}

/// One entry of a caller-supplied field map, before resolution. Callers write
/// either a bare type name, an options object carrying `type`, or any other
/// JSON value (kept opaque, stored as JSONB).
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Name(String),
    Options {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        default: Option<String>,
        #[serde(default)]
        protected: bool,
    },
    Opaque(Value),
}

/// A field after type resolution: everything the router and store need at
/// request time.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<String>,
    /// Excluded from mass-assignment even though persistent. Set per-field in
    /// the spec options; underscore-prefixed names are protected implicitly.
    pub protected: bool,
}

impl FieldInfo {
    /// Eligible for mass-assignment from submitted form data.
    pub fn assignable(&self) -> bool {
        !self.protected && !self.name.starts_with('_')
    }
}
