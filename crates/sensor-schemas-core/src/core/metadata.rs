// crates/sensor-schemas-core/src/core/metadata.rs
// ============================================================================
// Module: Schema Metadata
// Description: Resolved schemas bound to their scope and source file.
// Purpose: Carry provenance of each catalog entry into validation and lookup.
// Dependencies: crate::core::{schema, scope}
// ============================================================================

//! ## Overview
//! [`SchemaMetadata`] is created once per resolved file and never mutated.
//! [`FailedSchemaMetadata`] records files that never resolved, together with
//! the last parse error observed for them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use crate::core::schema::Schema;
use crate::core::scope::Scope;

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Resolved schema with its scope and source path.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaMetadata {
    /// Parsed schema.
    pub schema: Schema,
    /// Scope whose directory held the file.
    pub scope: Scope,
    /// Path of the source file.
    pub path: PathBuf,
}

impl SchemaMetadata {
    /// Creates metadata for a resolved schema.
    #[must_use]
    pub const fn new(schema: Schema, scope: Scope, path: PathBuf) -> Self {
        Self {
            schema,
            scope,
            path,
        }
    }

    /// Returns the path relative to `root`, or `None` when the file lies outside it.
    #[must_use]
    pub fn relative_path(&self, root: &Path) -> Option<&Path> {
        self.path.strip_prefix(root).ok()
    }
}

/// Schema file that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSchemaMetadata {
    /// Scope whose directory held the file.
    pub scope: Scope,
    /// Path of the source file.
    pub path: PathBuf,
    /// Last parse or read error for the file.
    pub reason: String,
}
