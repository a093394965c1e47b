// crates/sensor-schemas-core/src/runtime/resolver.rs
// ============================================================================
// Module: Schema Resolver
// Description: Fixed-point resolution of interdependent schema files.
// Purpose: Build a cross-referenced catalog of schemas from a directory tree.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Schema files reference each other by name, in no declared order. The
//! resolver parses every unresolved file once per pass against a frozen
//! dictionary of everything resolved in earlier passes, and stops as soon as
//! a pass resolves nothing new. Files are visited in sorted path order so
//! the outcome is deterministic, and a dependency cycle simply leaves its
//! members unresolved.
//!
//! ## Invariants
//! - Full names are unique in the catalog. A second, different definition of
//!   a name is fatal; an identical one is accepted and keeps the first entry.
//! - Only top-level schemas enter the dictionary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use tracing::info;

use crate::core::avro::TypeDictionary;
use crate::core::avro::parse_schema;
use crate::core::metadata::FailedSchemaMetadata;
use crate::core::metadata::SchemaMetadata;
use crate::core::scope::COMMONS_PATH;
use crate::core::scope::Scope;
use crate::interfaces::AcceptAll;
use crate::interfaces::PathFilter;
use crate::runtime::catalogue::CatalogueError;
use crate::runtime::catalogue::SchemaRole;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Extension of schema files, compared case-insensitively.
pub const SCHEMA_EXTENSION: &str = "avsc";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A scope directory could not be listed.
    #[error("schema resolver io error: {0}")]
    Io(String),
    /// A full name was defined twice with different definitions.
    #[error("duplicate inconsistent schema: {name} in {first} and {second}")]
    Duplicate {
        /// Full schema name.
        name: String,
        /// File that defined the name first.
        first: String,
        /// File with the conflicting definition.
        second: String,
    },
}

// ============================================================================
// SECTION: Catalogue
// ============================================================================

/// Resolved schemas keyed by full name, plus files that failed to resolve.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalogue {
    /// Directory holding the scope subdirectories.
    schema_root: PathBuf,
    /// Resolved schemas.
    schemas: BTreeMap<String, SchemaMetadata>,
    /// Files that never resolved.
    unresolved: Vec<FailedSchemaMetadata>,
}

impl SchemaCatalogue {
    /// Returns the directory holding the scope subdirectories.
    #[must_use]
    pub fn schema_root(&self) -> &Path {
        &self.schema_root
    }

    /// Returns every resolved schema keyed by full name.
    #[must_use]
    pub const fn schemas(&self) -> &BTreeMap<String, SchemaMetadata> {
        &self.schemas
    }

    /// Looks up a schema by full name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&SchemaMetadata> {
        self.schemas.get(full_name)
    }

    /// Returns the files that could not be resolved.
    #[must_use]
    pub fn unresolved(&self) -> &[FailedSchemaMetadata] {
        &self.unresolved
    }

    /// Returns the number of resolved schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true when nothing resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterates over resolved schemas of the given scope, or all when `None`.
    pub fn in_scope(&self, scope: Option<Scope>) -> impl Iterator<Item = &SchemaMetadata> {
        self.schemas
            .values()
            .filter(move |metadata| scope.is_none_or(|scope| metadata.scope == scope))
    }

    /// Looks up the key and value schemas of a topic.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::SchemaNotFound`] naming the missing type and the topic.
    pub fn topic_schemas(
        &self,
        key: &str,
        value: &str,
        topic: &str,
    ) -> Result<(&SchemaMetadata, &SchemaMetadata), CatalogueError> {
        let key_metadata = self.get(key).ok_or_else(|| CatalogueError::SchemaNotFound {
            role: SchemaRole::Key,
            schema: key.to_string(),
            topic: topic.to_string(),
        })?;
        let value_metadata = self.get(value).ok_or_else(|| CatalogueError::SchemaNotFound {
            role: SchemaRole::Value,
            schema: value.to_string(),
            topic: topic.to_string(),
        })?;
        Ok((key_metadata, value_metadata))
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Schema file or inline schema awaiting resolution.
struct Candidate {
    /// Scope of the candidate.
    scope: Scope,
    /// Source path.
    path: PathBuf,
    /// Schema text, or the read error.
    text: Result<String, String>,
}

/// Builder for a schema resolution run.
pub struct SchemaResolver {
    /// Directory holding the scope subdirectories.
    schema_root: PathBuf,
    /// Scopes to resolve.
    scopes: Vec<Scope>,
    /// Filter on paths relative to the schema root.
    filter: Box<dyn PathFilter>,
    /// Inline schemas per scope, keyed by virtual path.
    inline: Vec<(Scope, PathBuf, String)>,
}

impl SchemaResolver {
    /// Creates a resolver over `schema_root` covering every scope.
    #[must_use]
    pub fn new(schema_root: impl Into<PathBuf>) -> Self {
        Self {
            schema_root: schema_root.into(),
            scopes: Scope::ALL.to_vec(),
            filter: Box::new(AcceptAll),
            inline: Vec::new(),
        }
    }

    /// Creates a resolver over the `commons` directory of a repository.
    #[must_use]
    pub fn for_repository(root: &Path) -> Self {
        Self::new(root.join(COMMONS_PATH))
    }

    /// Restricts resolution to one scope when `scope` is set.
    #[must_use]
    pub fn with_scope(mut self, scope: Option<Scope>) -> Self {
        if let Some(scope) = scope {
            self.scopes = vec![scope];
        }
        self
    }

    /// Applies a path filter to candidate files.
    #[must_use]
    pub fn with_filter(mut self, filter: Box<dyn PathFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Adds an inline schema for `scope` under a path relative to the scope directory.
    #[must_use]
    pub fn with_inline_schema(
        mut self,
        scope: Scope,
        relative: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Self {
        let path = scope.path(&self.schema_root).join(relative);
        self.inline.push((scope, path, text.into()));
        self
    }

    /// Resolves all candidate files into a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Duplicate`] when a name is defined twice with
    /// different definitions, or [`ResolveError::Io`] when a scope directory
    /// cannot be listed.
    pub fn resolve(&self) -> Result<SchemaCatalogue, ResolveError> {
        let mut pending = self.candidates()?;
        pending.sort_by(|a, b| a.path.cmp(&b.path));
        let mut schemas: BTreeMap<String, SchemaMetadata> = BTreeMap::new();
        let mut reasons: BTreeMap<PathBuf, String> = BTreeMap::new();

        while !pending.is_empty() {
            let types: TypeDictionary = schemas
                .iter()
                .map(|(name, metadata)| (name.clone(), metadata.schema.clone()))
                .collect();
            let before = pending.len();
            let mut remaining = Vec::with_capacity(before);
            for candidate in pending {
                let parsed = candidate
                    .text
                    .as_ref()
                    .map_err(Clone::clone)
                    .and_then(|text| parse_schema(text, &types).map_err(|err| err.to_string()))
                    .and_then(|schema| {
                        if schema.named().is_some() {
                            Ok(schema)
                        } else {
                            Err(format!("top-level {} schema is not a named type", schema.full_name()))
                        }
                    });
                match parsed {
                    Ok(schema) => {
                        let name = schema.full_name();
                        if let Some(existing) = schemas.get(&name) {
                            if existing.schema != schema {
                                return Err(ResolveError::Duplicate {
                                    name,
                                    first: existing.path.display().to_string(),
                                    second: candidate.path.display().to_string(),
                                });
                            }
                            debug!(schema = %name, path = %candidate.path.display(), "identical schema redeclared");
                        } else {
                            schemas.insert(
                                name,
                                SchemaMetadata::new(schema, candidate.scope, candidate.path),
                            );
                        }
                    }
                    Err(reason) => {
                        debug!(path = %candidate.path.display(), error = %reason, "schema not resolved in this pass");
                        reasons.insert(candidate.path.clone(), reason);
                        remaining.push(candidate);
                    }
                }
            }
            let progressed = remaining.len() < before;
            pending = remaining;
            if !progressed {
                break;
            }
        }

        let unresolved = pending
            .into_iter()
            .map(|candidate| FailedSchemaMetadata {
                scope: candidate.scope,
                reason: reasons.remove(&candidate.path).unwrap_or_default(),
                path: candidate.path,
            })
            .collect::<Vec<_>>();
        info!(resolved = schemas.len(), unresolved = unresolved.len(), "schema resolution complete");
        Ok(SchemaCatalogue {
            schema_root: self.schema_root.clone(),
            schemas,
            unresolved,
        })
    }

    /// Collects schema files and inline schemas of the configured scopes.
    fn candidates(&self) -> Result<Vec<Candidate>, ResolveError> {
        let mut candidates = Vec::new();
        for scope in &self.scopes {
            let directory = scope.path(&self.schema_root);
            if !directory.is_dir() {
                info!(scope = %scope, path = %directory.display(), "scope directory not found");
                continue;
            }
            let mut files = Vec::new();
            collect_files(&directory, &mut files)
                .map_err(|err| ResolveError::Io(format!("{}: {err}", directory.display())))?;
            for path in files {
                if !has_schema_extension(&path) {
                    continue;
                }
                let relative = path.strip_prefix(&self.schema_root).unwrap_or(&path);
                if !self.filter.accepts(relative) {
                    debug!(path = %relative.display(), "schema file filtered out");
                    continue;
                }
                let text = fs::read_to_string(&path).map_err(|err| err.to_string());
                candidates.push(Candidate {
                    scope: *scope,
                    path,
                    text,
                });
            }
        }
        for (scope, path, text) in &self.inline {
            if self.scopes.contains(scope) {
                candidates.push(Candidate {
                    scope: *scope,
                    path: path.clone(),
                    text: Ok(text.clone()),
                });
            }
        }
        Ok(candidates)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when the file extension is `avsc`, ignoring case.
fn has_schema_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(SCHEMA_EXTENSION))
}

/// Recursively collects regular files below `directory`.
pub(crate) fn collect_files(directory: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}
