// crates/sensor-schemas-core/src/core/schema.rs
// ============================================================================
// Module: Schema Model
// Description: Structural model of Avro record, enum and primitive schemas.
// Purpose: Provide immutable schema values with structural equality and JSON output.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`Schema`] is an immutable tree describing a record, enumeration, fixed
//! type, container or primitive. Named types referenced from other files are
//! inlined at parse time; recursive references to a type that is still being
//! defined stay as [`Schema::Reference`].
//!
//! ## Invariants
//! - Equality is structural: names, fields, types and defaults are compared,
//!   documentation is not.
//! - JSON output writes each named type once; later uses emit its full name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Names
// ============================================================================

/// Name of a named schema type, with an optional namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    /// Simple name.
    name: String,
    /// Dot-separated namespace, `None` for the null namespace.
    namespace: Option<String>,
}

impl Name {
    /// Creates a new name. An empty namespace is treated as the null namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()),
        }
    }

    /// Parses a possibly qualified name, falling back to `enclosing` for the namespace.
    #[must_use]
    pub fn qualified(value: &str, enclosing: Option<&str>) -> Self {
        match value.rsplit_once('.') {
            Some((namespace, name)) => Self::new(name, Some(namespace.to_string())),
            None => Self::new(value, enclosing.map(str::to_string)),
        }
    }

    /// Returns the simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the fully-qualified name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

// ============================================================================
// SECTION: Schema Types
// ============================================================================

/// Kind of a schema, used in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    /// `null`.
    Null,
    /// `boolean`.
    Boolean,
    /// `int`.
    Int,
    /// `long`.
    Long,
    /// `float`.
    Float,
    /// `double`.
    Double,
    /// `bytes`.
    Bytes,
    /// `string`.
    String,
    /// `array`.
    Array,
    /// `map`.
    Map,
    /// Union of schemas.
    Union,
    /// `record`.
    Record,
    /// `enum`.
    Enum,
    /// `fixed`.
    Fixed,
    /// Reference to a named type under definition.
    Reference,
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Null => "NULL",
            Self::Boolean => "BOOLEAN",
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Bytes => "BYTES",
            Self::String => "STRING",
            Self::Array => "ARRAY",
            Self::Map => "MAP",
            Self::Union => "UNION",
            Self::Record => "RECORD",
            Self::Enum => "ENUM",
            Self::Fixed => "FIXED",
            Self::Reference => "REFERENCE",
        };
        f.write_str(label)
    }
}

/// Record field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field documentation.
    pub doc: Option<String>,
    /// Field type.
    pub schema: Schema,
    /// Default value as JSON.
    pub default: Option<Value>,
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.schema == other.schema && self.default == other.default
    }
}

/// Record schema.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    /// Record name.
    pub name: Name,
    /// Record documentation.
    pub doc: Option<String>,
    /// Ordered record fields.
    pub fields: Vec<Field>,
}

impl PartialEq for RecordSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

/// Enumeration schema.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    /// Enumeration name.
    pub name: Name,
    /// Enumeration documentation.
    pub doc: Option<String>,
    /// Ordered symbols.
    pub symbols: Vec<String>,
    /// Symbol used by readers for unknown values.
    pub default: Option<String>,
}

impl PartialEq for EnumSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.symbols == other.symbols && self.default == other.default
    }
}

/// Fixed-size binary schema.
#[derive(Debug, Clone)]
pub struct FixedSchema {
    /// Fixed type name.
    pub name: Name,
    /// Fixed type documentation.
    pub doc: Option<String>,
    /// Size in bytes.
    pub size: u64,
}

impl PartialEq for FixedSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.size == other.size
    }
}

/// Avro schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// `null`.
    Null,
    /// `boolean`.
    Boolean,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// Byte sequence.
    Bytes,
    /// UTF-8 string.
    String,
    /// Array with the given item schema.
    Array(Box<Schema>),
    /// String-keyed map with the given value schema.
    Map(Box<Schema>),
    /// Union of branches.
    Union(Vec<Schema>),
    /// Record.
    Record(RecordSchema),
    /// Enumeration.
    Enum(EnumSchema),
    /// Fixed-size bytes.
    Fixed(FixedSchema),
    /// Reference to a named type still being defined (recursion).
    Reference(Name),
}

impl Schema {
    /// Returns the kind of this schema.
    #[must_use]
    pub const fn schema_type(&self) -> SchemaType {
        match self {
            Self::Null => SchemaType::Null,
            Self::Boolean => SchemaType::Boolean,
            Self::Int => SchemaType::Int,
            Self::Long => SchemaType::Long,
            Self::Float => SchemaType::Float,
            Self::Double => SchemaType::Double,
            Self::Bytes => SchemaType::Bytes,
            Self::String => SchemaType::String,
            Self::Array(_) => SchemaType::Array,
            Self::Map(_) => SchemaType::Map,
            Self::Union(_) => SchemaType::Union,
            Self::Record(_) => SchemaType::Record,
            Self::Enum(_) => SchemaType::Enum,
            Self::Fixed(_) => SchemaType::Fixed,
            Self::Reference(_) => SchemaType::Reference,
        }
    }

    /// Returns the name of a named type.
    #[must_use]
    pub const fn named(&self) -> Option<&Name> {
        match self {
            Self::Record(record) => Some(&record.name),
            Self::Enum(enumeration) => Some(&enumeration.name),
            Self::Fixed(fixed) => Some(&fixed.name),
            Self::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the full name; primitive and container types use their type label.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.named().map_or_else(|| primitive_name(self).to_string(), Name::full_name)
    }

    /// Returns the simple name of a named type.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.named().map(Name::name)
    }

    /// Returns the namespace of a named type.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.named().and_then(Name::namespace)
    }

    /// Returns the documentation of a named type.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        match self {
            Self::Record(record) => record.doc.as_deref(),
            Self::Enum(enumeration) => enumeration.doc.as_deref(),
            Self::Fixed(fixed) => fixed.doc.as_deref(),
            _ => None,
        }
    }

    /// Returns the record fields, or an empty slice for other types.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        match self {
            Self::Record(record) => &record.fields,
            _ => &[],
        }
    }

    /// Looks up a record field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|field| field.name == name)
    }

    /// Returns the enum symbols, or an empty slice for other types.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        match self {
            Self::Enum(enumeration) => &enumeration.symbols,
            _ => &[],
        }
    }

    /// Returns the union branches, or an empty slice for other types.
    #[must_use]
    pub fn branches(&self) -> &[Self] {
        match self {
            Self::Union(branches) => branches,
            _ => &[],
        }
    }

    /// Serializes the schema to its Avro JSON form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut written = BTreeSet::new();
        write_json(self, None, &mut written)
    }

    /// Serializes the schema to indented Avro JSON text.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

/// Returns the Avro type label for primitive and container schemas.
const fn primitive_name(schema: &Schema) -> &'static str {
    match schema {
        Schema::Null => "null",
        Schema::Boolean => "boolean",
        Schema::Int => "int",
        Schema::Long => "long",
        Schema::Float => "float",
        Schema::Double => "double",
        Schema::Bytes => "bytes",
        Schema::String => "string",
        Schema::Array(_) => "array",
        Schema::Map(_) => "map",
        Schema::Union(_) => "union",
        Schema::Record(_) => "record",
        Schema::Enum(_) => "enum",
        Schema::Fixed(_) => "fixed",
        Schema::Reference(_) => "reference",
    }
}

/// Writes the header (`type`, `name`, `namespace`, `doc`) of a named type.
fn named_header(
    kind: &str,
    name: &Name,
    doc: Option<&str>,
    enclosing: Option<&str>,
) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("type".to_string(), Value::String(kind.to_string()));
    object.insert("name".to_string(), Value::String(name.name().to_string()));
    if name.namespace() != enclosing {
        object.insert(
            "namespace".to_string(),
            Value::String(name.namespace().unwrap_or_default().to_string()),
        );
    }
    if let Some(doc) = doc {
        object.insert("doc".to_string(), Value::String(doc.to_string()));
    }
    object
}

/// Serializes `schema`, emitting named types already written as name references.
fn write_json(schema: &Schema, enclosing: Option<&str>, written: &mut BTreeSet<String>) -> Value {
    if let Some(name) = schema.named() {
        let full_name = name.full_name();
        if matches!(schema, Schema::Reference(_)) || written.contains(&full_name) {
            return Value::String(full_name);
        }
        written.insert(full_name);
    }
    match schema {
        Schema::Array(items) => {
            let mut object = Map::new();
            object.insert("type".to_string(), Value::String("array".to_string()));
            object.insert("items".to_string(), write_json(items, enclosing, written));
            Value::Object(object)
        }
        Schema::Map(values) => {
            let mut object = Map::new();
            object.insert("type".to_string(), Value::String("map".to_string()));
            object.insert("values".to_string(), write_json(values, enclosing, written));
            Value::Object(object)
        }
        Schema::Union(branches) => Value::Array(
            branches.iter().map(|branch| write_json(branch, enclosing, written)).collect(),
        ),
        Schema::Record(record) => {
            let mut object =
                named_header("record", &record.name, record.doc.as_deref(), enclosing);
            let namespace = record.name.namespace();
            let fields = record
                .fields
                .iter()
                .map(|field| {
                    let mut entry = Map::new();
                    entry.insert("name".to_string(), Value::String(field.name.clone()));
                    entry.insert("type".to_string(), write_json(&field.schema, namespace, written));
                    if let Some(doc) = &field.doc {
                        entry.insert("doc".to_string(), Value::String(doc.clone()));
                    }
                    if let Some(default) = &field.default {
                        entry.insert("default".to_string(), default.clone());
                    }
                    Value::Object(entry)
                })
                .collect();
            object.insert("fields".to_string(), Value::Array(fields));
            Value::Object(object)
        }
        Schema::Enum(enumeration) => {
            let mut object =
                named_header("enum", &enumeration.name, enumeration.doc.as_deref(), enclosing);
            object.insert(
                "symbols".to_string(),
                Value::Array(enumeration.symbols.iter().cloned().map(Value::String).collect()),
            );
            if let Some(default) = &enumeration.default {
                object.insert("default".to_string(), Value::String(default.clone()));
            }
            Value::Object(object)
        }
        Schema::Fixed(fixed) => {
            let mut object = named_header("fixed", &fixed.name, fixed.doc.as_deref(), enclosing);
            object.insert("size".to_string(), Value::from(fixed.size));
            Value::Object(object)
        }
        primitive => Value::String(primitive_name(primitive).to_string()),
    }
}
