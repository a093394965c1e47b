// crates/sensor-schemas-core/src/core/avro.rs
// ============================================================================
// Module: Avro Schema Parser
// Description: Parses Avro JSON schema text against an explicit type dictionary.
// Purpose: Turn `.avsc` documents into structural schema values.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The parser accepts the Avro JSON form: primitive names, named type
//! references, unions as arrays, and objects for records, enums, fixed types,
//! arrays and maps. Name references that are not defined in the document
//! itself are looked up in a caller-supplied [`TypeDictionary`]; the
//! dictionary never receives definitions from the parser.
//!
//! Security posture: input is untrusted text; every structural error is
//! reported instead of panicking, and recursion depth is bounded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::Map;
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

/// Maximum nesting depth accepted by the parser.
pub const MAX_SCHEMA_DEPTH: usize = 64;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Named types available to the parser, keyed by full name.
pub type TypeDictionary = BTreeMap<String, Schema>;

/// Schema parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaParseError {
    /// Input is not valid JSON.
    #[error("schema json error: {0}")]
    Json(String),
    /// Input is JSON but not a valid schema.
    #[error("invalid schema: {0}")]
    Invalid(String),
    /// A referenced named type is not known.
    #[error("undefined name: {0}")]
    UndefinedName(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Parses Avro schema text.
///
/// # Errors
///
/// Returns [`SchemaParseError`] when the text is not JSON, is structurally
/// invalid, or references a name absent from both the document and `types`.
pub fn parse_schema(text: &str, types: &TypeDictionary) -> Result<Schema, SchemaParseError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| SchemaParseError::Json(err.to_string()))?;
    parse_value(&value, types)
}

/// Parses an already decoded Avro JSON value.
///
/// # Errors
///
/// Returns [`SchemaParseError`] when the value is not a valid schema.
pub fn parse_value(value: &Value, types: &TypeDictionary) -> Result<Schema, SchemaParseError> {
    let mut parser = Parser {
        types,
        defined: BTreeMap::new(),
        pending: BTreeSet::new(),
    };
    parser.parse(value, None, 0)
}

/// Returns true when `value` is a valid Avro name.
///
/// ```
/// use sensor_schemas_core::avro::is_valid_name;
/// assert!(is_valid_name("ObservationKey"));
/// assert!(!is_valid_name("9lives"));
/// ```
#[must_use]
pub fn is_valid_name(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns true when `default` is an acceptable default value for `schema`.
///
/// Union defaults must match the first branch.
#[must_use]
pub fn is_valid_default(schema: &Schema, default: &Value) -> bool {
    match (schema, default) {
        (Schema::Null, Value::Null) | (Schema::Boolean, Value::Bool(_)) => true,
        (Schema::Int, Value::Number(n)) => {
            n.as_i64().is_some_and(|v| i32::try_from(v).is_ok())
        }
        (Schema::Long, Value::Number(n)) => n.is_i64() || n.is_u64(),
        (Schema::Float | Schema::Double, Value::Number(_))
        | (Schema::Bytes | Schema::String | Schema::Fixed(_), Value::String(_))
        | (Schema::Reference(_), _) => true,
        (Schema::Enum(enumeration), Value::String(symbol)) => {
            enumeration.symbols.contains(symbol)
        }
        (Schema::Array(items), Value::Array(values)) => {
            values.iter().all(|value| is_valid_default(items, value))
        }
        (Schema::Map(values), Value::Object(entries)) => {
            entries.values().all(|value| is_valid_default(values, value))
        }
        (Schema::Record(record), Value::Object(entries)) => record.fields.iter().all(|field| {
            entries.get(&field.name).map_or(field.default.is_some(), |value| {
                is_valid_default(&field.schema, value)
            })
        }),
        (Schema::Union(branches), value) => {
            branches.first().is_some_and(|branch| is_valid_default(branch, value))
        }
        _ => false,
    }
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Parsing state for a single document.
struct Parser<'a> {
    /// Externally resolved named types.
    types: &'a TypeDictionary,
    /// Named types completed within this document.
    defined: BTreeMap<String, Schema>,
    /// Named types whose definition is in progress.
    pending: BTreeSet<String>,
}

impl Parser<'_> {
    /// Parses a schema value with the given enclosing namespace.
    fn parse(
        &mut self,
        value: &Value,
        namespace: Option<&str>,
        depth: usize,
    ) -> Result<Schema, SchemaParseError> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(invalid("schema nesting exceeds maximum depth"));
        }
        match value {
            Value::String(name) => self.resolve(name, namespace),
            Value::Array(branches) => {
                let mut parsed = Vec::with_capacity(branches.len());
                for branch in branches {
                    let schema = self.parse(branch, namespace, depth + 1)?;
                    if parsed.iter().any(|existing| same_union_branch(existing, &schema)) {
                        return Err(invalid(&format!("duplicate in union: {}", schema.full_name())));
                    }
                    parsed.push(schema);
                }
                Ok(Schema::Union(parsed))
            }
            Value::Object(object) => self.parse_object(object, namespace, depth),
            other => Err(invalid(&format!("schema must be a string, array or object, not {other}"))),
        }
    }

    /// Parses an object-form schema.
    fn parse_object(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
        depth: usize,
    ) -> Result<Schema, SchemaParseError> {
        let kind = object.get("type").ok_or_else(|| invalid("no type"))?;
        let Value::String(kind) = kind else {
            return self.parse(kind, namespace, depth + 1);
        };
        match kind.as_str() {
            "record" | "error" => self.parse_record(object, namespace, depth),
            "enum" => self.parse_enum(object, namespace),
            "fixed" => self.parse_fixed(object, namespace),
            "array" => {
                let items = object.get("items").ok_or_else(|| invalid("array has no items"))?;
                Ok(Schema::Array(Box::new(self.parse(items, namespace, depth + 1)?)))
            }
            "map" => {
                let values = object.get("values").ok_or_else(|| invalid("map has no values"))?;
                Ok(Schema::Map(Box::new(self.parse(values, namespace, depth + 1)?)))
            }
            other => self.resolve(other, namespace),
        }
    }

    /// Resolves a primitive or named type reference.
    fn resolve(&self, name: &str, namespace: Option<&str>) -> Result<Schema, SchemaParseError> {
        if let Some(primitive) = primitive(name) {
            return Ok(primitive);
        }
        let mut candidates = Vec::with_capacity(2);
        if !name.contains('.')
            && let Some(namespace) = namespace
        {
            candidates.push(format!("{namespace}.{name}"));
        }
        candidates.push(name.to_string());
        for candidate in &candidates {
            if self.pending.contains(candidate) {
                return Ok(Schema::Reference(Name::qualified(candidate, None)));
            }
            if let Some(schema) = self.defined.get(candidate).or_else(|| self.types.get(candidate))
            {
                return Ok(schema.clone());
            }
        }
        Err(SchemaParseError::UndefinedName(name.to_string()))
    }

    /// Reads and validates the name of a named type.
    fn declare(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<Name, SchemaParseError> {
        let raw = required_str(object, "name")?;
        let explicit = optional_str(object, "namespace")?;
        let name = if raw.contains('.') {
            Name::qualified(raw, None)
        } else {
            Name::new(raw, explicit.or(namespace).map(str::to_string))
        };
        if !is_valid_name(name.name()) {
            return Err(invalid(&format!("illegal name: {}", name.name())));
        }
        if let Some(namespace) = name.namespace()
            && !namespace.split('.').all(is_valid_name)
        {
            return Err(invalid(&format!("illegal namespace: {namespace}")));
        }
        let full_name = name.full_name();
        if primitive(name.name()).is_some() && name.namespace().is_none() {
            return Err(invalid(&format!("schemas may not be named after primitives: {full_name}")));
        }
        if self.defined.contains_key(&full_name) || self.pending.contains(&full_name) {
            return Err(invalid(&format!("can't redefine: {full_name}")));
        }
        Ok(name)
    }

    /// Parses a record definition.
    fn parse_record(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
        depth: usize,
    ) -> Result<Schema, SchemaParseError> {
        let name = self.declare(object, namespace)?;
        let full_name = name.full_name();
        let doc = optional_str(object, "doc")?.map(str::to_string);
        let Some(Value::Array(raw_fields)) = object.get("fields") else {
            return Err(invalid(&format!("record has no fields: {full_name}")));
        };
        self.pending.insert(full_name.clone());
        let mut fields: Vec<Field> = Vec::with_capacity(raw_fields.len());
        for raw in raw_fields {
            let Value::Object(raw) = raw else {
                return Err(invalid(&format!("field of {full_name} is not an object")));
            };
            let field_name = required_str(raw, "name")?;
            if !is_valid_name(field_name) {
                return Err(invalid(&format!("illegal field name: {field_name}")));
            }
            if fields.iter().any(|field| field.name == field_name) {
                return Err(invalid(&format!("duplicate field {field_name} in record {full_name}")));
            }
            let field_type = raw
                .get("type")
                .ok_or_else(|| invalid(&format!("no type for field {field_name}")))?;
            let schema = self.parse(field_type, name.namespace(), depth + 1)?;
            let default = raw.get("default").cloned();
            if let Some(default) = &default
                && !is_valid_default(&schema, default)
            {
                return Err(invalid(&format!(
                    "invalid default for field {field_name}: {default} not a {}",
                    schema.full_name()
                )));
            }
            fields.push(Field {
                name: field_name.to_string(),
                doc: optional_str(raw, "doc")?.map(str::to_string),
                schema,
                default,
            });
        }
        self.pending.remove(&full_name);
        let schema = Schema::Record(RecordSchema {
            name,
            doc,
            fields,
        });
        self.defined.insert(full_name, schema.clone());
        Ok(schema)
    }

    /// Parses an enum definition.
    fn parse_enum(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaParseError> {
        let name = self.declare(object, namespace)?;
        let full_name = name.full_name();
        let Some(Value::Array(raw_symbols)) = object.get("symbols") else {
            return Err(invalid(&format!("enum has no symbols: {full_name}")));
        };
        let mut symbols: Vec<String> = Vec::with_capacity(raw_symbols.len());
        for raw in raw_symbols {
            let Value::String(symbol) = raw else {
                return Err(invalid(&format!("enum symbol of {full_name} is not a string")));
            };
            if !is_valid_name(symbol) {
                return Err(invalid(&format!("illegal enum symbol: {symbol}")));
            }
            if symbols.contains(symbol) {
                return Err(invalid(&format!("duplicate enum symbol: {symbol}")));
            }
            symbols.push(symbol.clone());
        }
        let default = optional_str(object, "default")?.map(str::to_string);
        if let Some(default) = &default
            && !symbols.contains(default)
        {
            return Err(invalid(&format!("enum default {default} is not a symbol of {full_name}")));
        }
        let schema = Schema::Enum(EnumSchema {
            name,
            doc: optional_str(object, "doc")?.map(str::to_string),
            symbols,
            default,
        });
        self.defined.insert(full_name, schema.clone());
        Ok(schema)
    }

    /// Parses a fixed definition.
    fn parse_fixed(
        &mut self,
        object: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> Result<Schema, SchemaParseError> {
        let name = self.declare(object, namespace)?;
        let full_name = name.full_name();
        let size = object
            .get("size")
            .and_then(Value::as_u64)
            .ok_or_else(|| invalid(&format!("invalid or missing fixed size: {full_name}")))?;
        let schema = Schema::Fixed(FixedSchema {
            name,
            doc: optional_str(object, "doc")?.map(str::to_string),
            size,
        });
        self.defined.insert(full_name, schema.clone());
        Ok(schema)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a primitive type name to its schema.
fn primitive(name: &str) -> Option<Schema> {
    Some(match name {
        "null" => Schema::Null,
        "boolean" => Schema::Boolean,
        "int" => Schema::Int,
        "long" => Schema::Long,
        "float" => Schema::Float,
        "double" => Schema::Double,
        "bytes" => Schema::Bytes,
        "string" => Schema::String,
        _ => return None,
    })
}

/// Returns true when two union branches would be ambiguous.
fn same_union_branch(left: &Schema, right: &Schema) -> bool {
    match (left.named(), right.named()) {
        (Some(left), Some(right)) => left.full_name() == right.full_name(),
        (None, None) => {
            left.schema_type() == right.schema_type() && !matches!(left, Schema::Union(_))
        }
        _ => false,
    }
}

/// Reads a required string attribute.
fn required_str<'v>(object: &'v Map<String, Value>, key: &str) -> Result<&'v str, SchemaParseError> {
    match object.get(key) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(invalid(&format!("{key} must be a string"))),
        None => Err(invalid(&format!("no {key} in schema"))),
    }
}

/// Reads an optional string attribute; JSON null counts as absent.
fn optional_str<'v>(
    object: &'v Map<String, Value>,
    key: &str,
) -> Result<Option<&'v str>, SchemaParseError> {
    match object.get(key) {
        Some(Value::String(value)) => Ok(Some(value)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(invalid(&format!("{key} must be a string"))),
    }
}

/// Builds an invalid-schema error.
fn invalid(message: &str) -> SchemaParseError {
    SchemaParseError::Invalid(message.to_string())
}
