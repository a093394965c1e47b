// crates/sensor-schemas-core/src/runtime/rules.rs
// ============================================================================
// Module: Schema Rules
// Description: Naming, documentation, field and scope rules over schemas.
// Purpose: Enforce the structural contract of collected-data schemas.
// Dependencies: crate::{core, interfaces}, regex, thiserror
// ============================================================================

//! ## Overview
//! [`SchemaRules`] builds [`Rule`] values over [`Schema`]. Rules are pure
//! except for the uniqueness table, which records the first definition seen
//! for every full name and is shared by all rules built from one instance.
//!
//! Composition:
//! - `record` runs uniqueness, round trip, namespace (top level only), name,
//!   documentation and the field rules;
//! - `enumeration` runs uniqueness, namespace (top level only), symbols,
//!   documentation and name;
//! - scope sets add the `time`, `timeCompleted` and `timeReceived` checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::core::connect::from_connect;
use crate::core::connect::to_connect;
use crate::core::schema::Field;
use crate::core::schema::Schema;
use crate::core::scope::Scope;
use crate::interfaces::NoExemptions;
use crate::interfaces::ValidationExemptions;
use crate::runtime::validator::Rule;
use crate::runtime::validator::Violation;
use crate::runtime::validator::all;
use crate::runtime::validator::check;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lowercase, period-separated namespaces without digits.
pub const NAMESPACE_PATTERN: &str = r"^[a-z]+(\.[a-z]+)*$";
/// UpperCamelCase record names.
pub const RECORD_NAME_PATTERN: &str = r"^([A-Z]([a-z]*[0-9]*))+[A-Z]?$";
/// Uppercase enum symbols separated by underscores.
pub const ENUM_SYMBOL_PATTERN: &str = r"^[A-Z][A-Z0-9_]*$";
/// lowerCamelCase field names.
pub const FIELD_NAME_PATTERN: &str =
    r"^[a-z][a-z0-9]*([a-z0-9][A-Z][a-z0-9]+)?([A-Z][a-z0-9]+)*[A-Z]?$";

/// Enum symbol that must be the default when present.
pub const UNKNOWN: &str = "UNKNOWN";
/// Time of measurement.
pub const TIME: &str = "time";
/// Time an active measurement was completed.
pub const TIME_COMPLETED: &str = "timeCompleted";
/// Time a passive measurement was received.
pub const TIME_RECEIVED: &str = "timeReceived";

/// Shared guidance appended to documentation messages.
const DOC_GUIDANCE: &str = "The documentation should report what is being measured, how, and \
                            what units or ranges are applicable. Abbreviations and acronyms in \
                            the documentation should be written out.";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rule construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A naming pattern failed to compile.
    #[error("invalid rule pattern: {0}")]
    Pattern(String),
}

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Compiled naming patterns.
#[derive(Debug, Clone)]
pub struct NamingPatterns {
    /// Namespace pattern.
    pub namespace: Regex,
    /// Record name pattern.
    pub record_name: Regex,
    /// Enum symbol pattern.
    pub enum_symbol: Regex,
    /// Field name pattern.
    pub field_name: Regex,
}

impl NamingPatterns {
    /// Compiles the naming patterns.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Pattern`] when a pattern fails to compile.
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self {
            namespace: compile(NAMESPACE_PATTERN)?,
            record_name: compile(RECORD_NAME_PATTERN)?,
            enum_symbol: compile(ENUM_SYMBOL_PATTERN)?,
            field_name: compile(FIELD_NAME_PATTERN)?,
        })
    }
}

/// Compiles one pattern.
fn compile(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|err| RuleError::Pattern(format!("{pattern}: {err}")))
}

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Prefixes a message with the schema it concerns.
fn schema_message(schema: &Schema, text: &str) -> String {
    format!("Schema {} is invalid. {text}", schema.full_name())
}

/// Prefixes a message with the field and schema it concerns.
fn field_message(schema: &Schema, field: &Field, text: &str) -> String {
    format!("Field {} in schema {} is invalid. {text}", field.name, schema.full_name())
}

/// Checks a documentation string; `message` adds the subject prefix.
pub fn documentation_violations(
    doc: Option<&str>,
    message: impl Fn(&str) -> String,
) -> Vec<Violation> {
    let Some(doc) = doc.filter(|doc| !doc.is_empty()) else {
        return vec![Violation::new(message(&format!(
            "Property \"doc\" is missing. Documentation is mandatory for all fields. \
             {DOC_GUIDANCE} The sentence must end with a period '.'. Please add \"doc\" property."
        )))];
    };
    let mut violations = Vec::new();
    if !doc.ends_with('.') {
        violations.push(Violation::new(message(&format!(
            "Documentation is not terminated with a period. {DOC_GUIDANCE} Please end the \
             sentence with a period '.'."
        ))));
    }
    if !doc.chars().next().is_some_and(char::is_uppercase) {
        violations.push(Violation::new(message(&format!(
            "Documentation does not start with a capital letter. {DOC_GUIDANCE} Please end the \
             sentence with a period '.'."
        ))));
    }
    violations
}

/// Returns true when the record declares `name` with type `double`.
fn has_double_field(schema: &Schema, name: &str) -> bool {
    schema.field(name).is_some_and(|field| field.schema == Schema::Double)
}

// ============================================================================
// SECTION: Schema Rules
// ============================================================================

/// Rule factory with a shared uniqueness table.
pub struct SchemaRules {
    /// Compiled naming patterns.
    patterns: NamingPatterns,
    /// First definition seen for each full name.
    validated: Mutex<BTreeMap<String, Schema>>,
    /// Naming-check exemptions.
    exemptions: Arc<dyn ValidationExemptions + Send + Sync>,
}

impl std::fmt::Debug for SchemaRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRules").field("patterns", &self.patterns).finish_non_exhaustive()
    }
}

impl SchemaRules {
    /// Creates rules with the given exemptions.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the naming patterns fail to compile.
    pub fn new(exemptions: Arc<dyn ValidationExemptions + Send + Sync>) -> Result<Self, RuleError> {
        Ok(Self {
            patterns: NamingPatterns::new()?,
            validated: Mutex::new(BTreeMap::new()),
            exemptions,
        })
    }

    /// Creates rules without exemptions.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the naming patterns fail to compile.
    pub fn without_exemptions() -> Result<Self, RuleError> {
        Self::new(Arc::new(NoExemptions))
    }

    /// Returns the naming patterns.
    #[must_use]
    pub const fn patterns(&self) -> &NamingPatterns {
        &self.patterns
    }

    /// Returns the exemption table.
    #[must_use]
    pub fn exemptions(&self) -> &(dyn ValidationExemptions + Send + Sync) {
        self.exemptions.as_ref()
    }

    /// Returns a snapshot of the uniqueness table.
    #[must_use]
    pub fn validated_schemas(&self) -> BTreeMap<String, Schema> {
        self.validated.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    // ------------------------------------------------------------------------
    // Single rules
    // ------------------------------------------------------------------------

    /// First definition of a name wins; later different definitions are violations.
    #[must_use]
    pub fn uniqueness(&self) -> Rule<'_, Schema> {
        Rule::new("uniqueness", move |schema: &Schema| {
            let mut table = self.validated.lock().unwrap_or_else(PoisonError::into_inner);
            let existing = table.entry(schema.full_name()).or_insert_with(|| schema.clone());
            check(existing == schema, || {
                schema_message(
                    schema,
                    "Schema is already defined elsewhere with a different definition.",
                )
            })
        })
    }

    /// The schema survives conversion to the connector model and back.
    #[must_use]
    pub fn round_trip(&self) -> Rule<'_, Schema> {
        Rule::new("round_trip", |schema: &Schema| {
            let converted = to_connect(schema).and_then(|connect| from_connect(&connect));
            match converted {
                Err(_) => vec![Violation::new(schema_message(
                    schema,
                    "Failed to convert schema back to itself",
                ))],
                Ok(back) => check(&back == schema, || {
                    schema_message(
                        schema,
                        &format!("Schema changed by validation: {schema} is not equal to {back}"),
                    )
                }),
            }
        })
    }

    /// Namespace is present and lowercase, period-separated, without digits.
    #[must_use]
    pub fn namespace(&self) -> Rule<'_, Schema> {
        Rule::predicate(
            "namespace",
            move |schema: &Schema| {
                schema.namespace().is_some_and(|namespace| self.patterns.namespace.is_match(namespace))
            },
            |schema: &Schema| {
                schema_message(
                    schema,
                    "Namespace cannot be null and must fully lowercase, period-separated, \
                     without numeric characters.",
                )
            },
        )
    }

    /// Name is UpperCamelCase.
    #[must_use]
    pub fn name(&self) -> Rule<'_, Schema> {
        Rule::predicate(
            "name",
            move |schema: &Schema| {
                schema.name().is_some_and(|name| self.patterns.record_name.is_match(name))
            },
            |schema: &Schema| schema_message(schema, "Record names must be camel case."),
        )
    }

    /// Schema documentation is present, capitalized and terminated.
    #[must_use]
    pub fn documentation(&self) -> Rule<'_, Schema> {
        Rule::new("documentation", |schema: &Schema| {
            documentation_violations(schema.doc(), |text| schema_message(schema, text))
        })
    }

    /// Enum symbols are present and uppercase.
    #[must_use]
    pub fn symbols(&self) -> Rule<'_, Schema> {
        Rule::new("symbols", move |schema: &Schema| {
            let symbols = schema.symbols();
            if symbols.is_empty() {
                return vec![Violation::new(schema_message(
                    schema,
                    "Avro Enumerator must have symbol list.",
                ))];
            }
            symbols
                .iter()
                .filter(|symbol| !self.patterns.enum_symbol.is_match(symbol))
                .map(|symbol| {
                    Violation::new(schema_message(
                        schema,
                        &format!(
                            "Symbol {symbol} does not use valid syntax. Enumerator items should \
                             be written in uppercase characters separated by underscores."
                        ),
                    ))
                })
                .collect()
        })
    }

    /// Declares a `time` field of type double.
    #[must_use]
    pub fn time(&self) -> Rule<'_, Schema> {
        Rule::predicate(
            "time",
            |schema: &Schema| has_double_field(schema, TIME),
            |schema: &Schema| {
                schema_message(
                    schema,
                    "Any schema representing collected data must have a \"time\" field with \
                     type \"double\".",
                )
            },
        )
    }

    /// Declares a `timeCompleted` field of type double.
    #[must_use]
    pub fn time_completed(&self) -> Rule<'_, Schema> {
        Rule::predicate(
            "time_completed",
            |schema: &Schema| has_double_field(schema, TIME_COMPLETED),
            |schema: &Schema| {
                schema_message(
                    schema,
                    "Any ACTIVE schema must have a \"timeCompleted\" field with type \"double\".",
                )
            },
        )
    }

    /// Does not declare `timeCompleted`.
    #[must_use]
    pub fn not_time_completed(&self) -> Rule<'_, Schema> {
        Rule::predicate(
            "not_time_completed",
            |schema: &Schema| schema.field(TIME_COMPLETED).is_none(),
            |schema: &Schema| {
                schema_message(schema, "\"timeCompleted\" is allow only in ACTIVE schemas.")
            },
        )
    }

    /// Declares a `timeReceived` field of type double.
    #[must_use]
    pub fn time_received(&self) -> Rule<'_, Schema> {
        Rule::predicate(
            "time_received",
            |schema: &Schema| has_double_field(schema, TIME_RECEIVED),
            |schema: &Schema| {
                schema_message(
                    schema,
                    "Any PASSIVE schema must have a \"timeReceived\" field with type \"double\".",
                )
            },
        )
    }

    /// Does not declare `timeReceived`.
    #[must_use]
    pub fn not_time_received(&self) -> Rule<'_, Schema> {
        Rule::predicate(
            "not_time_received",
            |schema: &Schema| schema.field(TIME_RECEIVED).is_none(),
            |schema: &Schema| {
                schema_message(schema, "\"timeReceived\" is allow only in PASSIVE schemas.")
            },
        )
    }

    /// Applies the field rules to every field of a record.
    #[must_use]
    pub fn fields(&self) -> Rule<'_, Schema> {
        Rule::new("fields", move |schema: &Schema| {
            let Schema::Record(record) = schema else {
                return vec![Violation::new(format!(
                    "Default validation can be applied only to an Avro RECORD, not to {} of \
                     schema {}.",
                    schema.schema_type(),
                    schema.full_name()
                ))];
            };
            if record.fields.is_empty() {
                return vec![Violation::new(format!(
                    "Schema {} does not contain any fields.",
                    schema.full_name()
                ))];
            }
            record.fields.iter().flat_map(|field| self.field_violations(schema, field)).collect()
        })
    }

    // ------------------------------------------------------------------------
    // Field rules
    // ------------------------------------------------------------------------

    /// Runs every field rule on one field.
    #[must_use]
    pub fn field_violations(&self, schema: &Schema, field: &Field) -> Vec<Violation> {
        let mut violations = self.field_types(schema, field);
        if !self.exemptions.skip_field_name(&schema.full_name(), &field.name) {
            violations.extend(self.field_name(schema, field));
        }
        violations.extend(field_default(schema, field));
        violations.extend(documentation_violations(field.doc.as_deref(), |text| {
            field_message(schema, field, text)
        }));
        violations
    }

    /// Validates nested records, enums and union members.
    #[must_use]
    pub fn field_types(&self, schema: &Schema, field: &Field) -> Vec<Violation> {
        match &field.schema {
            Schema::Union(branches) => branches
                .iter()
                .flat_map(|branch| match branch {
                    Schema::Union(_) => {
                        vec![Violation::new(field_message(schema, field, "Cannot have a nested union."))]
                    }
                    Schema::Record(_) => self.record(false).check(branch),
                    Schema::Enum(_) => self.enumeration(false).check(branch),
                    _ => Vec::new(),
                })
                .collect(),
            nested @ Schema::Record(_) => self.record(false).check(nested),
            nested @ Schema::Enum(_) => self.enumeration(false).check(nested),
            _ => Vec::new(),
        }
    }

    /// Field name is lowerCamelCase.
    #[must_use]
    pub fn field_name(&self, schema: &Schema, field: &Field) -> Vec<Violation> {
        check(self.patterns.field_name.is_match(&field.name), || {
            field_message(
                schema,
                field,
                "Field name does not respect lowerCamelCase name convention. Please avoid \
                 abbreviations and write out the field name instead.",
            )
        })
    }

    // ------------------------------------------------------------------------
    // Compositions
    // ------------------------------------------------------------------------

    /// Record rules; the namespace check applies to top-level records only.
    #[must_use]
    pub fn record(&self, top_level: bool) -> Rule<'_, Schema> {
        let mut rules = vec![self.uniqueness(), self.round_trip()];
        if top_level {
            rules.push(self.namespace());
        }
        rules.extend([self.name(), self.documentation(), self.fields()]);
        all("record", rules)
    }

    /// Enum rules; the namespace check applies to top-level enums only.
    #[must_use]
    pub fn enumeration(&self, top_level: bool) -> Rule<'_, Schema> {
        let mut rules = vec![self.uniqueness()];
        if top_level {
            rules.push(self.namespace());
        }
        rules.extend([self.symbols(), self.documentation(), self.name()]);
        all("enum", rules)
    }

    /// Active records: `time` and `timeCompleted`, never `timeReceived`.
    #[must_use]
    pub fn active(&self) -> Rule<'_, Schema> {
        self.record(true)
            .and(self.time())
            .and(self.time_completed())
            .and(self.not_time_received())
    }

    /// Monitor records: `time` only.
    #[must_use]
    pub fn monitor(&self) -> Rule<'_, Schema> {
        self.record(true).and(self.time())
    }

    /// Passive records: `time` and `timeReceived`, never `timeCompleted`.
    #[must_use]
    pub fn passive(&self) -> Rule<'_, Schema> {
        self.record(true)
            .and(self.time())
            .and(self.time_received())
            .and(self.not_time_completed())
    }

    /// Scope-specific record rules; scopes without extra checks use the record rules.
    #[must_use]
    pub fn for_scope(&self, scope: Scope) -> Rule<'_, Schema> {
        match scope {
            Scope::Active => self.active(),
            Scope::Monitor => self.monitor(),
            Scope::Passive => self.passive(),
            _ => self.record(true),
        }
    }
}

/// Enum fields with `UNKNOWN` default to it, nullable fields default to null,
/// and other fields have no default.
fn field_default(schema: &Schema, field: &Field) -> Vec<Violation> {
    match &field.schema {
        Schema::Enum(enumeration) => {
            let unknown = Value::String(UNKNOWN.to_string());
            check(
                !enumeration.symbols.iter().any(|symbol| symbol == UNKNOWN)
                    || field.default.as_ref() == Some(&unknown),
                || {
                    let default = match &field.default {
                        Some(Value::String(symbol)) => symbol.clone(),
                        Some(other) => other.to_string(),
                        None => "null".to_string(),
                    };
                    field_message(
                        schema,
                        field,
                        &format!(
                            "Default is \"{default}\". Any Avro enum type that has an \
                             \"UNKNOWN\" symbol must set its default value to \"UNKNOWN\"."
                        ),
                    )
                },
            )
        }
        Schema::Union(branches) => check(
            !branches.contains(&Schema::Null) || field.default == Some(Value::Null),
            || {
                field_message(
                    schema,
                    field,
                    "Default is not null. Any nullable Avro field must specify have its default \
                     value set to null.",
                )
            },
        ),
        other => check(field.default.is_none(), || {
            let default = field.default.as_ref().map_or_else(|| "null".to_string(), Value::to_string);
            field_message(
                schema,
                field,
                &format!(
                    "Default of type {} is set to {default}. The only acceptable default values \
                     are the \"UNKNOWN\" enum symbol and null.",
                    other.schema_type()
                ),
            )
        }),
    }
}
