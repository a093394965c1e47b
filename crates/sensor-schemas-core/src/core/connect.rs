// crates/sensor-schemas-core/src/core/connect.rs
// ============================================================================
// Module: Connector Schema Model
// Description: Intermediate schema representation used by source connectors.
// Purpose: Convert schemas to the connector model and back to detect lossy constructs.
// Dependencies: crate::core::schema, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The connector model knows structs, arrays, string-keyed maps and
//! primitives, each of which may be optional. Avro constructs map onto it as
//! follows:
//! - `[null, T]` becomes an optional `T`;
//! - enums become strings parameterized with their name and symbols;
//! - fixed types become bytes parameterized with their name and size;
//! - any other union becomes a generic union struct of optional members.
//!
//! Converting back is exact for everything the model represents faithfully.
//! Unions with a trailing `null` or several non-null branches do not survive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::schema::EnumSchema;
use crate::core::schema::Field;
use crate::core::schema::FixedSchema;
use crate::core::schema::Name;
use crate::core::schema::RecordSchema;
use crate::core::schema::Schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Struct name of generic unions.
pub const UNION_STRUCT: &str = "io.confluent.connect.avro.Union";
/// Parameter holding the enum name.
const ENUM_PARAMETER: &str = "io.confluent.connect.avro.Enum";
/// Parameter holding the enum default symbol.
const ENUM_DEFAULT_PARAMETER: &str = "io.confluent.connect.avro.Enum.default";
/// Parameter holding the fixed size.
const FIXED_SIZE_PARAMETER: &str = "connect.fixed.size";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Connector conversion errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// Construct has no connector equivalent.
    #[error("unsupported connect conversion: {0}")]
    Unsupported(String),
}

/// Field of a connector struct.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectField {
    /// Field name.
    pub name: String,
    /// Field documentation.
    pub doc: Option<String>,
    /// Field schema.
    pub schema: ConnectSchema,
}

/// Kind of a connector schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectKind {
    /// Boolean.
    Boolean,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Byte sequence.
    Bytes,
    /// String.
    String,
    /// Array of items.
    Array(Box<ConnectSchema>),
    /// String-keyed map.
    Map(Box<ConnectSchema>),
    /// Struct with ordered fields.
    Struct(Vec<ConnectField>),
}

/// Connector schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectSchema {
    /// Structural kind.
    pub kind: ConnectKind,
    /// Whether null values are allowed.
    pub optional: bool,
    /// Schema name for structs and parameterized types.
    pub name: Option<String>,
    /// Documentation.
    pub doc: Option<String>,
    /// Default value.
    pub default: Option<Value>,
    /// Ordered parameters.
    pub parameters: Vec<(String, String)>,
}

impl ConnectSchema {
    /// Creates a required schema without name or parameters.
    const fn plain(kind: ConnectKind) -> Self {
        Self {
            kind,
            optional: false,
            name: None,
            doc: None,
            default: None,
            parameters: Vec::new(),
        }
    }

    /// Looks up a parameter value.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// SECTION: Conversion
// ============================================================================

/// Converts an Avro schema to the connector model.
///
/// # Errors
///
/// Returns [`ConnectError`] for standalone null schemas and recursive references.
pub fn to_connect(schema: &Schema) -> Result<ConnectSchema, ConnectError> {
    let kind = match schema {
        Schema::Null => {
            return Err(ConnectError::Unsupported("standalone null schema".to_string()));
        }
        Schema::Reference(name) => {
            return Err(ConnectError::Unsupported(format!("recursive reference to {name}")));
        }
        Schema::Boolean => ConnectKind::Boolean,
        Schema::Int => ConnectKind::Int32,
        Schema::Long => ConnectKind::Int64,
        Schema::Float => ConnectKind::Float32,
        Schema::Double => ConnectKind::Float64,
        Schema::Bytes => ConnectKind::Bytes,
        Schema::String => ConnectKind::String,
        Schema::Array(items) => ConnectKind::Array(Box::new(to_connect(items)?)),
        Schema::Map(values) => ConnectKind::Map(Box::new(to_connect(values)?)),
        Schema::Union(branches) => return union_to_connect(branches),
        Schema::Record(record) => {
            let mut fields = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let mut converted = to_connect(&field.schema)?;
                converted.default.clone_from(&field.default);
                fields.push(ConnectField {
                    name: field.name.clone(),
                    doc: field.doc.clone(),
                    schema: converted,
                });
            }
            return Ok(ConnectSchema {
                name: Some(record.name.full_name()),
                doc: record.doc.clone(),
                ..ConnectSchema::plain(ConnectKind::Struct(fields))
            });
        }
        Schema::Enum(enumeration) => {
            let full_name = enumeration.name.full_name();
            let mut parameters = vec![(ENUM_PARAMETER.to_string(), full_name.clone())];
            parameters.extend(
                enumeration
                    .symbols
                    .iter()
                    .map(|symbol| (format!("{ENUM_PARAMETER}.{symbol}"), symbol.clone())),
            );
            if let Some(default) = &enumeration.default {
                parameters.push((ENUM_DEFAULT_PARAMETER.to_string(), default.clone()));
            }
            return Ok(ConnectSchema {
                name: Some(full_name),
                doc: enumeration.doc.clone(),
                parameters,
                ..ConnectSchema::plain(ConnectKind::String)
            });
        }
        Schema::Fixed(fixed) => {
            return Ok(ConnectSchema {
                name: Some(fixed.name.full_name()),
                doc: fixed.doc.clone(),
                parameters: vec![(FIXED_SIZE_PARAMETER.to_string(), fixed.size.to_string())],
                ..ConnectSchema::plain(ConnectKind::Bytes)
            });
        }
    };
    Ok(ConnectSchema::plain(kind))
}

/// Converts a union to an optional schema or a generic union struct.
fn union_to_connect(branches: &[Schema]) -> Result<ConnectSchema, ConnectError> {
    if let [Schema::Null, single] = branches {
        let mut converted = to_connect(single)?;
        converted.optional = true;
        return Ok(converted);
    }
    let nullable = branches.iter().any(|branch| matches!(branch, Schema::Null));
    let mut fields = Vec::with_capacity(branches.len());
    for branch in branches.iter().filter(|branch| !matches!(branch, Schema::Null)) {
        let mut converted = to_connect(branch)?;
        converted.optional = true;
        fields.push(ConnectField {
            name: branch.full_name(),
            doc: None,
            schema: converted,
        });
    }
    Ok(ConnectSchema {
        optional: nullable,
        name: Some(UNION_STRUCT.to_string()),
        ..ConnectSchema::plain(ConnectKind::Struct(fields))
    })
}

/// Converts a connector schema back to Avro.
///
/// # Errors
///
/// Returns [`ConnectError`] when the result would not be a valid Avro schema,
/// such as a union nested directly in a union.
pub fn from_connect(schema: &ConnectSchema) -> Result<Schema, ConnectError> {
    let converted = match &schema.kind {
        ConnectKind::Boolean => Schema::Boolean,
        ConnectKind::Int32 => Schema::Int,
        ConnectKind::Int64 => Schema::Long,
        ConnectKind::Float32 => Schema::Float,
        ConnectKind::Float64 => Schema::Double,
        ConnectKind::Bytes => match schema.parameter(FIXED_SIZE_PARAMETER) {
            Some(size) => {
                let size = size.parse::<u64>().map_err(|err| {
                    ConnectError::Unsupported(format!("invalid fixed size {size}: {err}"))
                })?;
                Schema::Fixed(FixedSchema {
                    name: Name::qualified(schema.name.as_deref().unwrap_or_default(), None),
                    doc: schema.doc.clone(),
                    size,
                })
            }
            None => Schema::Bytes,
        },
        ConnectKind::String => match schema.parameter(ENUM_PARAMETER) {
            Some(name) => {
                let prefix = format!("{ENUM_PARAMETER}.");
                let symbols = schema
                    .parameters
                    .iter()
                    .filter(|(key, _)| key.starts_with(&prefix) && key != ENUM_DEFAULT_PARAMETER)
                    .map(|(_, symbol)| symbol.clone())
                    .collect();
                Schema::Enum(EnumSchema {
                    name: Name::qualified(name, None),
                    doc: schema.doc.clone(),
                    symbols,
                    default: schema.parameter(ENUM_DEFAULT_PARAMETER).map(str::to_string),
                })
            }
            None => Schema::String,
        },
        ConnectKind::Array(items) => Schema::Array(Box::new(from_connect(items)?)),
        ConnectKind::Map(values) => Schema::Map(Box::new(from_connect(values)?)),
        ConnectKind::Struct(fields) if schema.name.as_deref() == Some(UNION_STRUCT) => {
            let mut branches = Vec::with_capacity(fields.len() + 1);
            if schema.optional {
                branches.push(Schema::Null);
            }
            for field in fields {
                let branch = from_connect(&field.schema)?;
                if matches!(branch, Schema::Union(_)) {
                    return Err(ConnectError::Unsupported("nested union".to_string()));
                }
                branches.push(branch);
            }
            return Ok(Schema::Union(branches));
        }
        ConnectKind::Struct(fields) => {
            let mut converted = Vec::with_capacity(fields.len());
            for field in fields {
                converted.push(Field {
                    name: field.name.clone(),
                    doc: field.doc.clone(),
                    schema: from_connect(&field.schema)?,
                    default: field.schema.default.clone(),
                });
            }
            Schema::Record(RecordSchema {
                name: Name::qualified(schema.name.as_deref().unwrap_or_default(), None),
                doc: schema.doc.clone(),
                fields: converted,
            })
        }
    };
    if schema.optional {
        Ok(Schema::Union(vec![Schema::Null, converted]))
    } else {
        Ok(converted)
    }
}
