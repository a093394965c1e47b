// crates/sensor-schemas-core/src/runtime/engine.rs
// ============================================================================
// Module: Schema Validation Engine
// Description: Location rules and validation drivers over resolved catalogs.
// Purpose: Apply schema rules to every catalog entry or every catalogued topic.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`SchemaValidator`] binds [`SchemaRules`] to a schema root so that each
//! [`SchemaMetadata`] can also be checked against its location: the
//! namespace must mirror the directory and the name must mirror the file
//! name. Two drivers produce full reports:
//! - [`SchemaValidator::analyse_files`] checks every resolved schema and
//!   reports every unresolved file;
//! - [`SchemaValidator::analyse_source_catalogue`] checks the key and value
//!   schemas of catalogued topics with the scope-specific rules.
//!
//! Violations accumulate; none of them aborts validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::metadata::SchemaMetadata;
use crate::core::naming::PROJECT_GROUP;
use crate::core::naming::snake_to_camel_case;
use crate::core::schema::Schema;
use crate::core::scope::Scope;
use crate::interfaces::ValidationExemptions;
use crate::runtime::catalogue::SourceCatalogue;
use crate::runtime::resolver::SchemaCatalogue;
use crate::runtime::rules::RuleError;
use crate::runtime::rules::SchemaRules;
use crate::runtime::validator::Rule;
use crate::runtime::validator::Violation;
use crate::runtime::validator::check;

// ============================================================================
// SECTION: Location Helpers
// ============================================================================

/// Computes the namespace expected for a schema file.
///
/// The namespace is the project group, the scope directory and every
/// directory between the scope directory and the file.
///
/// # Errors
///
/// Returns a message when `path` does not lie below the scope directory.
pub fn expected_namespace(schema_root: &Path, path: &Path, scope: Scope) -> Result<String, String> {
    let scope_root = scope.path(schema_root);
    let relative = path
        .strip_prefix(&scope_root)
        .map_err(|_| format!("Path {} is not part of root {}", path.display(), schema_root.display()))?;
    let mut namespace = format!("{PROJECT_GROUP}.{}", scope.directory());
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            if let Component::Normal(directory) = component {
                namespace.push('.');
                namespace.push_str(&directory.to_string_lossy());
            }
        }
    }
    Ok(namespace)
}

/// Computes the record name expected for a schema file.
#[must_use]
pub fn expected_record_name(path: &Path) -> String {
    path.file_name()
        .map(|name| snake_to_camel_case(&name.to_string_lossy()))
        .unwrap_or_default()
}

/// Prefixes a message with the schema and path it concerns.
fn metadata_message(metadata: &SchemaMetadata, text: &str) -> String {
    format!(
        "Schema {} at {} is invalid. {text}",
        metadata.schema.full_name(),
        metadata.path.display()
    )
}

// ============================================================================
// SECTION: Schema Validator
// ============================================================================

/// Validation engine for one schema root.
#[derive(Debug)]
pub struct SchemaValidator {
    /// Schema rules with the uniqueness table.
    rules: SchemaRules,
    /// Directory holding the scope subdirectories.
    schema_root: PathBuf,
}

impl SchemaValidator {
    /// Creates a validator for `schema_root`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the naming patterns fail to compile.
    pub fn new(
        schema_root: impl Into<PathBuf>,
        exemptions: Arc<dyn ValidationExemptions + Send + Sync>,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            rules: SchemaRules::new(exemptions)?,
            schema_root: schema_root.into(),
        })
    }

    /// Returns the schema rules.
    #[must_use]
    pub const fn rules(&self) -> &SchemaRules {
        &self.rules
    }

    /// Returns every schema seen by the uniqueness rule.
    #[must_use]
    pub fn validated_schemas(&self) -> BTreeMap<String, Schema> {
        self.rules.validated_schemas()
    }

    /// Namespace mirrors the directory; name mirrors the file name unless exempted.
    #[must_use]
    pub fn location(&self) -> Rule<'_, SchemaMetadata> {
        Rule::new("location", move |metadata: &SchemaMetadata| {
            let mut violations =
                match expected_namespace(&self.schema_root, &metadata.path, metadata.scope) {
                    Ok(expected) => check(
                        metadata
                            .schema
                            .namespace()
                            .is_some_and(|namespace| namespace.eq_ignore_ascii_case(&expected)),
                        || {
                            metadata_message(
                                metadata,
                                &format!(
                                    "Namespace cannot be null and must fully lowercase dot \
                                     separated without numeric. In this case the expected value \
                                     is \"{expected}\"."
                                ),
                            )
                        },
                    ),
                    Err(message) => vec![Violation::new(message)],
                };
            let full_name = metadata.schema.full_name();
            if !self.rules.exemptions().skip_record_name(&full_name) {
                let expected = expected_record_name(&metadata.path);
                violations.extend(check(
                    metadata.schema.name().is_some_and(|name| name.eq_ignore_ascii_case(&expected)),
                    || {
                        metadata_message(
                            metadata,
                            &format!(
                                "Record name should match file name. Expected record name is \
                                 \"{expected}\"."
                            ),
                        )
                    },
                ));
            }
            violations
        })
    }

    /// Location rules plus the enum, scope or record rules for the schema.
    #[must_use]
    pub fn metadata(&self, scope_specific: bool) -> Rule<'_, SchemaMetadata> {
        self.location().and(Rule::new("schema", move |metadata: &SchemaMetadata| {
            let rule = match (&metadata.schema, scope_specific) {
                (Schema::Enum(_), _) => self.rules.enumeration(true),
                (_, true) => self.rules.for_scope(metadata.scope),
                (_, false) => self.rules.record(true),
            };
            rule.check(&metadata.schema)
        }))
    }

    /// Validates one schema unless its file is excluded.
    #[must_use]
    pub fn validate(&self, metadata: &SchemaMetadata, scope_specific: bool) -> Vec<Violation> {
        let relative = metadata.relative_path(&self.schema_root).unwrap_or(&metadata.path);
        if self.rules.exemptions().skip_file(relative) {
            return Vec::new();
        }
        self.metadata(scope_specific).check(metadata)
    }

    /// Reports unresolved files and validates every resolved schema of the scope.
    #[must_use]
    pub fn analyse_files(&self, catalogue: &SchemaCatalogue, scope: Option<Scope>) -> Vec<Violation> {
        let mut violations: Vec<Violation> = catalogue
            .unresolved()
            .iter()
            .filter(|failed| scope.is_none_or(|scope| failed.scope == scope))
            .filter(|failed| {
                let relative = failed.path.strip_prefix(&self.schema_root).unwrap_or(&failed.path);
                !self.rules.exemptions().skip_file(relative)
            })
            .map(|failed| {
                Violation::new(format!(
                    "Cannot parse schema {}: {}",
                    failed.path.display(),
                    failed.reason
                ))
            })
            .collect();
        for metadata in catalogue.in_scope(scope) {
            violations.extend(self.validate(metadata, false));
        }
        distinct(violations)
    }

    /// Validates the key and value schemas of catalogued topics with scope rules.
    ///
    /// Topics whose schemas did not resolve are reported as violations.
    #[must_use]
    pub fn analyse_source_catalogue(
        &self,
        scope: Option<Scope>,
        catalogue: &SourceCatalogue,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut schemas: BTreeMap<String, SchemaMetadata> = BTreeMap::new();
        for binding in catalogue.topic_bindings(scope) {
            match binding {
                Ok(topic) => {
                    for metadata in [topic.key, topic.value] {
                        schemas.entry(metadata.schema.full_name()).or_insert(metadata);
                    }
                }
                Err(err) => violations.push(Violation::new(err.to_string())),
            }
        }
        for metadata in schemas.values() {
            violations.extend(self.validate(metadata, true));
        }
        distinct(violations)
    }
}

/// Removes repeated violations, keeping first occurrences in order.
fn distinct(violations: Vec<Violation>) -> Vec<Violation> {
    let mut seen = BTreeSet::new();
    violations.into_iter().filter(|violation| seen.insert(violation.clone())).collect()
}
