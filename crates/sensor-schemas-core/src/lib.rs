// crates/sensor-schemas-core/src/lib.rs
// ============================================================================
// Module: Sensor Schemas Core Library
// Description: Public API surface for the sensor schema catalogue.
// Purpose: Expose schema types, interfaces and runtime components.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Sensor schemas core resolves a tree of interdependent Avro schema files
//! into a catalog, expands declared topics into their aggregate outputs, and
//! validates every schema against naming, documentation and scope rules.
//! Configuration and network clients plug in through [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::AcceptAll;
pub use interfaces::AdminError;
pub use interfaces::NewTopic;
pub use interfaces::NoExemptions;
pub use interfaces::PathFilter;
pub use interfaces::RegistryError;
pub use interfaces::SchemaRegistry;
pub use interfaces::TopicAdmin;
pub use interfaces::ValidationExemptions;
pub use runtime::BoundTopic;
pub use runtime::CatalogueError;
pub use runtime::InMemorySchemaRegistry;
pub use runtime::InMemoryTopicAdmin;
pub use runtime::RegistrationError;
pub use runtime::RegistrationReport;
pub use runtime::ResolveError;
pub use runtime::Rule;
pub use runtime::RuleError;
pub use runtime::SchemaCatalogue;
pub use runtime::SchemaRegistrar;
pub use runtime::SchemaResolver;
pub use runtime::SchemaRole;
pub use runtime::SchemaRules;
pub use runtime::SchemaValidator;
pub use runtime::SourceCatalogue;
pub use runtime::SpecificationsValidator;
pub use runtime::TopicConfig;
pub use runtime::TopicDefaults;
pub use runtime::TopicRegistrar;
pub use runtime::Violation;
pub use runtime::format_violations;
