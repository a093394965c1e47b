// crates/sensor-schemas-core/src/core/mod.rs
// ============================================================================
// Module: Sensor Schemas Core Types
// Description: Schema model, scopes, topic models and source specifications.
// Purpose: Provide immutable value types shared by the resolver, rules and catalogue.
// Dependencies: serde, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! Core types describe schemas and the sources that produce data with them.
//! They hold no I/O; loading and validation live in the runtime modules.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod avro;
pub mod connect;
pub mod metadata;
pub mod naming;
pub mod schema;
pub mod scope;
pub mod specification;
pub mod topic;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use avro::SchemaParseError;
pub use avro::TypeDictionary;
pub use avro::parse_schema;
pub use connect::ConnectError;
pub use connect::ConnectSchema;
pub use metadata::FailedSchemaMetadata;
pub use metadata::SchemaMetadata;
pub use naming::OBSERVATION_KEY;
pub use naming::PROJECT_GROUP;
pub use schema::EnumSchema;
pub use schema::Field;
pub use schema::FixedSchema;
pub use schema::Name;
pub use schema::RecordSchema;
pub use schema::Schema;
pub use schema::SchemaType;
pub use scope::COMMONS_PATH;
pub use scope::SPECIFICATIONS_PATH;
pub use scope::Scope;
pub use specification::DataProducer;
pub use specification::DataTopic;
pub use specification::SampleRate;
pub use specification::Source;
pub use specification::SpecificationError;
pub use topic::TimeWindow;
pub use topic::TopicMetadata;
pub use topic::TopicModel;
