// crates/sensor-schemas-core/src/runtime/registration.rs
// ============================================================================
// Module: Topic and Schema Registration
// Description: Plans topic creation and schema registration for a catalogue.
// Purpose: Drive Kafka admin and schema registry clients from catalogue data.
// Dependencies: crate::{core, interfaces, runtime::catalogue}, regex, serde, tracing
// ============================================================================

//! ## Overview
//! [`TopicRegistrar`] turns the catalogue topic names plus configured extra
//! topics into a sorted creation plan and creates only the topics a broker
//! does not already list. [`SchemaRegistrar`] registers key and value schemas
//! under the `<topic>-key` and `<topic>-value` subjects.
//!
//! The in-memory admin and registry in this module back tests and dry runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::core::naming::expand_class;
use crate::core::schema::Schema;
use crate::interfaces::AdminError;
use crate::interfaces::NewTopic;
use crate::interfaces::RegistryError;
use crate::interfaces::SchemaRegistry;
use crate::interfaces::TopicAdmin;
use crate::runtime::catalogue::SourceCatalogue;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Per-topic overrides and extra topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopicConfig {
    /// Whether the topic is created.
    pub enabled: bool,
    /// Partition count override.
    pub partitions: Option<u32>,
    /// Replication factor override.
    #[serde(alias = "replicationFactor")]
    pub replication_factor: Option<u16>,
    /// Key schema registered for the topic.
    #[serde(alias = "keySchema")]
    pub key_schema: Option<String>,
    /// Value schema registered for the topic.
    #[serde(alias = "valueSchema")]
    pub value_schema: Option<String>,
    /// Topic-level properties.
    pub properties: BTreeMap<String, String>,
    /// Whether the configured schemas are registered.
    #[serde(alias = "registerSchema")]
    pub register_schema: bool,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            partitions: None,
            replication_factor: None,
            key_schema: None,
            value_schema: None,
            properties: BTreeMap::new(),
            register_schema: true,
        }
    }
}

/// Defaults applied to planned topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicDefaults {
    /// Partition count.
    pub partitions: u32,
    /// Replication factor.
    pub replication_factor: u16,
}

impl Default for TopicDefaults {
    fn default() -> Self {
        Self {
            partitions: 3,
            replication_factor: 3,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Topic filter is not a valid pattern.
    #[error("invalid topic filter: {0}")]
    Pattern(String),
    /// Topic filter matched no topic.
    #[error("topic filter matched no topics: {0}")]
    NoMatch(String),
    /// Topic admin failed.
    #[error("topic admin failure: {0}")]
    Admin(String),
    /// Catalogue lookup failed.
    #[error("catalogue failure: {0}")]
    Catalogue(String),
}

impl From<AdminError> for RegistrationError {
    fn from(err: AdminError) -> Self {
        Self::Admin(err.to_string())
    }
}

// ============================================================================
// SECTION: Topic Registrar
// ============================================================================

/// Plans and creates Kafka topics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicRegistrar;

impl TopicRegistrar {
    /// Plans the topics to create.
    ///
    /// `filter` selects topics by exact name when one matches, otherwise it
    /// is used as a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Pattern`] for an invalid filter and
    /// [`RegistrationError::NoMatch`] when the filter selects nothing.
    pub fn plan(
        catalogue: &SourceCatalogue,
        topics: &BTreeMap<String, TopicConfig>,
        defaults: TopicDefaults,
        filter: Option<&str>,
    ) -> Result<Vec<NewTopic>, RegistrationError> {
        let mut names = catalogue.topic_names();
        names.extend(topics.keys().cloned());
        names.retain(|name| topics.get(name).is_none_or(|config| config.enabled));

        if let Some(filter) = filter {
            let pattern = if names.contains(filter) {
                format!("^{}$", regex::escape(filter))
            } else {
                filter.to_string()
            };
            let matcher =
                Regex::new(&pattern).map_err(|err| RegistrationError::Pattern(err.to_string()))?;
            names.retain(|name| matcher.is_match(name));
            if names.is_empty() {
                return Err(RegistrationError::NoMatch(filter.to_string()));
            }
        }

        Ok(names
            .into_iter()
            .map(|name| {
                let config = topics.get(&name);
                NewTopic {
                    partitions: config
                        .and_then(|config| config.partitions)
                        .unwrap_or(defaults.partitions),
                    replication_factor: config
                        .and_then(|config| config.replication_factor)
                        .unwrap_or(defaults.replication_factor),
                    properties: config.map(|config| config.properties.clone()).unwrap_or_default(),
                    name,
                }
            })
            .collect())
    }

    /// Creates planned topics that the broker does not list yet.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Admin`] when listing or creation fails.
    pub fn create_missing(
        admin: &dyn TopicAdmin,
        plan: &[NewTopic],
    ) -> Result<Vec<String>, RegistrationError> {
        let existing = admin.list_topics()?;
        let missing: Vec<NewTopic> =
            plan.iter().filter(|topic| !existing.contains(&topic.name)).cloned().collect();
        if missing.is_empty() {
            info!(planned = plan.len(), "all topics already exist");
            return Ok(Vec::new());
        }
        admin.create_topics(&missing)?;
        info!(created = missing.len(), planned = plan.len(), "created topics");
        Ok(missing.into_iter().map(|topic| topic.name).collect())
    }
}

// ============================================================================
// SECTION: Schema Registrar
// ============================================================================

/// Outcome of schema registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Registered subjects with their schema identifiers.
    pub registered: BTreeMap<String, u32>,
    /// Subjects that failed, with the failure message.
    pub failed: BTreeMap<String, String>,
}

impl RegistrationReport {
    /// Returns true when every subject registered.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registers topic schemas with a schema registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaRegistrar;

impl SchemaRegistrar {
    /// Registers key and value schemas of catalogue topics and configured topics.
    ///
    /// Catalogue topics register when their producer enables it; configured
    /// topics register when they name both schemas and enable registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Catalogue`] when a referenced schema did not resolve.
    pub fn register_catalogue(
        registry: &dyn SchemaRegistry,
        catalogue: &SourceCatalogue,
        topics: &BTreeMap<String, TopicConfig>,
    ) -> Result<RegistrationReport, RegistrationError> {
        let mut pairs: BTreeMap<String, (Schema, Schema)> = BTreeMap::new();
        for topic in catalogue.topics().map_err(|err| RegistrationError::Catalogue(err.to_string()))? {
            if topic.register_schema {
                pairs.entry(topic.name).or_insert((topic.key.schema, topic.value.schema));
            }
        }
        let schemas = catalogue.schema_catalogue();
        for (name, config) in topics {
            if !config.enabled || !config.register_schema {
                continue;
            }
            let (Some(key), Some(value)) = (&config.key_schema, &config.value_schema) else {
                continue;
            };
            let (key, value) = schemas
                .topic_schemas(&expand_class(key), &expand_class(value), name)
                .map_err(|err| RegistrationError::Catalogue(err.to_string()))?;
            pairs.insert(name.clone(), (key.schema.clone(), value.schema.clone()));
        }

        let mut report = RegistrationReport::default();
        for (topic, (key, value)) in &pairs {
            for (subject, schema) in [(format!("{topic}-key"), key), (format!("{topic}-value"), value)]
            {
                match registry.register(&subject, schema) {
                    Ok(id) => {
                        report.registered.insert(subject, id);
                    }
                    Err(err) => {
                        warn!(subject = %subject, error = %err, "schema registration failed");
                        report.failed.insert(subject, err.to_string());
                    }
                }
            }
        }
        info!(
            registered = report.registered.len(),
            failed = report.failed.len(),
            "schema registration complete"
        );
        Ok(report)
    }
}

// ============================================================================
// SECTION: In-Memory Implementations
// ============================================================================

/// In-memory topic admin for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTopicAdmin {
    /// Topics keyed by name.
    topics: Arc<Mutex<BTreeMap<String, NewTopic>>>,
}

impl InMemoryTopicAdmin {
    /// Creates an empty admin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an admin that already lists the given topics.
    #[must_use]
    pub fn with_existing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics = names
            .into_iter()
            .map(Into::into)
            .map(|name: String| {
                let topic = NewTopic {
                    name: name.clone(),
                    partitions: 1,
                    replication_factor: 1,
                    properties: BTreeMap::new(),
                };
                (name, topic)
            })
            .collect();
        Self {
            topics: Arc::new(Mutex::new(topics)),
        }
    }

    /// Returns a snapshot of all topics.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Io`] when the topic map is poisoned.
    pub fn topics(&self) -> Result<Vec<NewTopic>, AdminError> {
        let guard = self
            .topics
            .lock()
            .map_err(|_| AdminError::Io("topic admin mutex poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }
}

impl TopicAdmin for InMemoryTopicAdmin {
    fn list_topics(&self) -> Result<BTreeSet<String>, AdminError> {
        let guard = self
            .topics
            .lock()
            .map_err(|_| AdminError::Io("topic admin mutex poisoned".to_string()))?;
        Ok(guard.keys().cloned().collect())
    }

    fn create_topics(&self, topics: &[NewTopic]) -> Result<(), AdminError> {
        let mut guard = self
            .topics
            .lock()
            .map_err(|_| AdminError::Io("topic admin mutex poisoned".to_string()))?;
        for topic in topics {
            if guard.contains_key(&topic.name) {
                return Err(AdminError::Rejected(format!("topic already exists: {}", topic.name)));
            }
        }
        for topic in topics {
            guard.insert(topic.name.clone(), topic.clone());
        }
        Ok(())
    }
}

/// Registry contents and identifier counter.
#[derive(Debug, Default)]
struct RegistryState {
    /// Schema versions with identifiers, keyed by subject.
    subjects: BTreeMap<String, Vec<(u32, Schema)>>,
    /// Next identifier to assign.
    next_id: u32,
}

/// In-memory schema registry for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct InMemorySchemaRegistry {
    /// Registry state protected by a mutex.
    state: Arc<Mutex<RegistryState>>,
}

impl InMemorySchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registered subjects.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] when the registry is poisoned.
    pub fn subjects(&self) -> Result<Vec<String>, RegistryError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| RegistryError::Io("schema registry mutex poisoned".to_string()))?;
        Ok(guard.subjects.keys().cloned().collect())
    }

    /// Returns the latest schema of a subject.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] when the registry is poisoned.
    pub fn latest(&self, subject: &str) -> Result<Option<Schema>, RegistryError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| RegistryError::Io("schema registry mutex poisoned".to_string()))?;
        Ok(guard
            .subjects
            .get(subject)
            .and_then(|versions| versions.last())
            .map(|(_, schema)| schema.clone()))
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn register(&self, subject: &str, schema: &Schema) -> Result<u32, RegistryError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| RegistryError::Io("schema registry mutex poisoned".to_string()))?;
        if let Some((id, _)) = guard
            .subjects
            .get(subject)
            .and_then(|versions| versions.iter().find(|(_, existing)| existing == schema))
        {
            return Ok(*id);
        }
        guard.next_id += 1;
        let id = guard.next_id;
        guard.subjects.entry(subject.to_string()).or_default().push((id, schema.clone()));
        Ok(id)
    }
}
