// crates/sensor-schemas-core/src/runtime/mod.rs
// ============================================================================
// Module: Sensor Schemas Runtime
// Description: Resolution, validation, cataloguing and registration.
// Purpose: Turn schema and specification trees into validated catalogues.
// Dependencies: crate::{core, interfaces}, regex, tracing
// ============================================================================

//! ## Overview
//! Runtime modules read the repository tree once, build immutable catalogues
//! and evaluate rules over them. Only the resolver and catalogue loaders
//! touch the filesystem.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalogue;
pub mod engine;
pub mod registration;
pub mod resolver;
pub mod rules;
pub mod specifications;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalogue::BoundTopic;
pub use catalogue::CatalogueError;
pub use catalogue::SchemaRole;
pub use catalogue::SourceCatalogue;
pub use engine::SchemaValidator;
pub use registration::InMemorySchemaRegistry;
pub use registration::InMemoryTopicAdmin;
pub use registration::RegistrationError;
pub use registration::RegistrationReport;
pub use registration::SchemaRegistrar;
pub use registration::TopicConfig;
pub use registration::TopicDefaults;
pub use registration::TopicRegistrar;
pub use resolver::ResolveError;
pub use resolver::SchemaCatalogue;
pub use resolver::SchemaResolver;
pub use rules::RuleError;
pub use rules::SchemaRules;
pub use specifications::SpecificationsValidator;
pub use validator::Rule;
pub use validator::Violation;
pub use validator::format_violations;
