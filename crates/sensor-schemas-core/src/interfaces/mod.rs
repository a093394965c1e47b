// crates/sensor-schemas-core/src/interfaces/mod.rs
// ============================================================================
// Module: Sensor Schemas Interfaces
// Description: Contracts for path filtering, exemptions, registries and topic admins.
// Purpose: Keep configuration and network clients out of the core runtime.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The runtime reaches configuration and external systems only through these
//! traits. Path filters and exemption tables come from the configuration
//! crate; the schema registry and Kafka admin client are supplied by callers.
//! In-memory implementations of the external interfaces live in
//! [`crate::runtime::registration`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::schema::Schema;

// ============================================================================
// SECTION: Path Filter
// ============================================================================

/// Decides which files under a root take part in loading.
pub trait PathFilter {
    /// Returns true when `relative` (a path relative to the loader root) is included.
    fn accepts(&self, relative: &Path) -> bool;
}

/// Path filter that includes every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl PathFilter for AcceptAll {
    fn accepts(&self, _relative: &Path) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Validation Exemptions
// ============================================================================

/// Per-schema exemptions from naming checks.
pub trait ValidationExemptions {
    /// Returns true when the record-name check is disabled for the schema.
    fn skip_record_name(&self, full_name: &str) -> bool;

    /// Returns true when the field-name check is disabled for the field.
    fn skip_field_name(&self, full_name: &str, field: &str) -> bool;

    /// Returns true when the file at `relative` (relative to the schema root) is excluded.
    fn skip_file(&self, relative: &Path) -> bool;
}

/// Exemption table without entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExemptions;

impl ValidationExemptions for NoExemptions {
    fn skip_record_name(&self, _full_name: &str) -> bool {
        false
    }

    fn skip_field_name(&self, _full_name: &str, _field: &str) -> bool {
        false
    }

    fn skip_file(&self, _relative: &Path) -> bool {
        false
    }
}

// ============================================================================
// SECTION: Schema Registry
// ============================================================================

/// Schema registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry could not be reached.
    #[error("schema registry io error: {0}")]
    Io(String),
    /// Registry rejected the schema as incompatible.
    #[error("schema registry incompatible schema: {0}")]
    Incompatible(String),
}

/// Schema registry client.
pub trait SchemaRegistry {
    /// Registers `schema` under `subject` and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when registration fails.
    fn register(&self, subject: &str, schema: &Schema) -> Result<u32, RegistryError>;
}

// ============================================================================
// SECTION: Topic Admin
// ============================================================================

/// Topic to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
    /// Topic name.
    pub name: String,
    /// Partition count.
    pub partitions: u32,
    /// Replication factor.
    pub replication_factor: u16,
    /// Topic-level properties.
    pub properties: BTreeMap<String, String>,
}

/// Topic admin errors.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Broker could not be reached.
    #[error("topic admin io error: {0}")]
    Io(String),
    /// Broker rejected the request.
    #[error("topic admin rejected request: {0}")]
    Rejected(String),
}

/// Kafka admin client.
pub trait TopicAdmin {
    /// Lists existing topic names.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when the broker cannot be queried.
    fn list_topics(&self) -> Result<BTreeSet<String>, AdminError>;

    /// Creates the given topics.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when creation fails.
    fn create_topics(&self, topics: &[NewTopic]) -> Result<(), AdminError>;
}
