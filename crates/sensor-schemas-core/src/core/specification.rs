// crates/sensor-schemas-core/src/core/specification.rs
// ============================================================================
// Module: Source Specifications
// Description: YAML data producer and data topic definitions.
// Purpose: Describe which topics each source writes and with which schemas.
// Dependencies: crate::core::{naming, scope, topic}, serde, serde_yaml
// ============================================================================

//! ## Overview
//! Each file under `specifications/<scope>` declares one [`DataProducer`]
//! in snake-case YAML. A producer bound to its scope is a [`Source`]; its
//! data topics map onto [`TopicModel`] values for expansion.
//!
//! Stream groups declare `input_topic` and `topic_base`, with `windowed`
//! selecting the timed aggregation windows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::naming::OBSERVATION_KEY;
use crate::core::naming::expand_class;
use crate::core::scope::Scope;
use crate::core::topic::OUTPUT_SUFFIX;
use crate::core::topic::TIMED_AGGREGATORS;
use crate::core::topic::TopicModel;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key schema of windowed stream outputs.
pub const AGGREGATE_KEY: &str = "org.radarcns.kafka.AggregateKey";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Specification loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecificationError {
    /// Specification file could not be read.
    #[error("specification io error: {0}")]
    Io(String),
    /// Specification file is not valid YAML for the scope.
    #[error("specification parse error: {0}")]
    Parse(String),
    /// Specification content is incomplete.
    #[error("invalid specification: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Data Topic
// ============================================================================

/// Expected sampling rate of a topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleRate {
    /// Interval between samples in seconds.
    pub interval: Option<f64>,
    /// Samples per second.
    pub frequency: Option<f64>,
    /// Rate varies at runtime.
    pub dynamic: bool,
    /// Rate can be configured by the user.
    pub configurable: bool,
}

/// Record field that a topic unit applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    /// Field name.
    pub name: String,
}

/// Topic produced by a data producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTopic {
    /// Producer-specific topic type, such as a sensor kind.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Topic documentation.
    pub doc: Option<String>,
    /// Topic name.
    pub topic: Option<String>,
    /// Key schema; abbreviated names start with `.`.
    pub key_schema: Option<String>,
    /// Value schema; abbreviated names start with `.`.
    pub value_schema: Option<String>,
    /// Expected sampling rate.
    pub sample_rate: Option<SampleRate>,
    /// Output unit.
    pub unit: Option<String>,
    /// Fields that the unit applies to.
    pub fields: Vec<DataField>,
    /// Application that provides the data.
    pub app_provider: Option<String>,
    /// Processing state of passive data.
    pub processing_state: Option<String>,
    /// Questionnaire definition location for active data.
    pub questionnaire_definition_url: Option<String>,
    /// Aggregator class applied to the topic.
    pub aggregator: Option<String>,
    /// Base name of aggregated outputs.
    pub base_output_topic: Option<String>,
    /// Input topic of a stream.
    pub input_topic: Option<String>,
    /// Base name of stream outputs.
    pub topic_base: Option<String>,
    /// Stream output uses the standard time windows.
    pub windowed: bool,
}

impl DataTopic {
    /// Returns the input topic name.
    #[must_use]
    pub fn input_topic(&self) -> Option<&str> {
        self.input_topic.as_deref().or(self.topic.as_deref())
    }

    /// Returns the expanded key schema name.
    #[must_use]
    pub fn key_schema(&self) -> String {
        match &self.key_schema {
            Some(key) => expand_class(key),
            None if self.windowed => AGGREGATE_KEY.to_string(),
            None => OBSERVATION_KEY.to_string(),
        }
    }

    /// Returns the expanded value schema name.
    #[must_use]
    pub fn value_schema(&self) -> Option<String> {
        self.value_schema.as_deref().map(expand_class)
    }

    /// Builds the topic model used for expansion.
    ///
    /// Unwindowed stream topics without an aggregator write to the explicit
    /// `topic` when an `input_topic` is also declared, and to
    /// `<base>_output` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::Invalid`] when the topic name or value
    /// schema is missing.
    pub fn topic_model(&self, scope: Scope) -> Result<TopicModel, SpecificationError> {
        let topic = self
            .input_topic()
            .ok_or_else(|| SpecificationError::Invalid("data topic has no topic name".to_string()))?;
        let value = self.value_schema().ok_or_else(|| {
            SpecificationError::Invalid(format!("data topic {topic} has no value schema"))
        })?;
        let aggregator = match (&self.aggregator, self.windowed) {
            (Some(aggregator), _) => Some(aggregator.as_str()),
            (None, true) => Some(TIMED_AGGREGATORS[0]),
            (None, false) => None,
        };
        let base_output = self.base_output_topic.clone().or_else(|| self.topic_base.clone());
        let model = TopicModel::new(topic, &self.key_schema(), &value, aggregator, base_output);
        if scope != Scope::Stream || aggregator.is_some() {
            return Ok(model);
        }
        let output = match (&self.input_topic, &self.topic) {
            (Some(_), Some(explicit)) => explicit.clone(),
            _ => format!("{}{OUTPUT_SUFFIX}", model.base_output()),
        };
        Ok(model.with_output_topic(output))
    }
}

// ============================================================================
// SECTION: Data Producer
// ============================================================================

/// Producer of one or more data topics, as declared in YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataProducer {
    /// Producer name.
    pub name: Option<String>,
    /// Producer documentation.
    pub doc: Option<String>,
    /// Free-form properties.
    pub properties: BTreeMap<String, String>,
    /// Free-form labels.
    pub labels: BTreeMap<String, String>,
    /// Whether schemas are registered during initialization.
    pub register_schema: Option<bool>,
    /// Device or service vendor.
    pub vendor: Option<String>,
    /// Device or service model.
    pub model: Option<String>,
    /// Device or service version.
    pub version: Option<String>,
    /// Application that provides the data.
    pub app_provider: Option<String>,
    /// Assessment type of active sources.
    pub assessment_type: Option<String>,
    /// Master stream class of stream groups.
    pub master: Option<String>,
    /// Produced topics.
    pub data: Vec<DataTopic>,
}

/// Data producer bound to its scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Scope whose directory held the specification.
    pub scope: Scope,
    /// Declared producer.
    pub producer: DataProducer,
}

impl Source {
    /// Parses a producer specification for `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] when the YAML does not describe a valid producer.
    pub fn from_yaml(text: &str, scope: Scope) -> Result<Self, SpecificationError> {
        let producer: DataProducer =
            serde_yaml::from_str(text).map_err(|err| SpecificationError::Parse(err.to_string()))?;
        let source = Self {
            scope,
            producer,
        };
        source.validate()?;
        Ok(source)
    }

    /// Checks the producer for required content.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::Invalid`] when the name is missing, a
    /// scope requiring data has none, or a topic lacks a name or value schema.
    pub fn validate(&self) -> Result<(), SpecificationError> {
        let name = self.name();
        if name.trim().is_empty() {
            return Err(SpecificationError::Invalid(format!("{} source has no name", self.scope)));
        }
        if self.producer.data.is_empty() && matches!(self.scope, Scope::Passive | Scope::Stream) {
            return Err(SpecificationError::Invalid(format!("source {name} declares no data")));
        }
        for topic in &self.producer.data {
            topic
                .topic_model(self.scope)
                .map_err(|err| SpecificationError::Invalid(format!("source {name}: {err}")))?;
        }
        Ok(())
    }

    /// Returns the producer name; passive sources default to `<vendor>_<model>`.
    #[must_use]
    pub fn name(&self) -> String {
        match (&self.producer.name, self.scope) {
            (Some(name), _) => name.clone(),
            (None, Scope::Passive) => format!(
                "{}_{}",
                self.producer.vendor.as_deref().unwrap_or_default(),
                self.producer.model.as_deref().unwrap_or_default()
            ),
            (None, _) => String::new(),
        }
    }

    /// Returns whether schemas of this source are registered during initialization.
    #[must_use]
    pub fn register_schema(&self) -> bool {
        self.producer
            .register_schema
            .unwrap_or(!matches!(self.scope, Scope::Stream | Scope::Connector))
    }

    /// Returns the topic models of every data topic.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] when a data topic is incomplete.
    pub fn topic_models(&self) -> Result<Vec<TopicModel>, SpecificationError> {
        self.producer.data.iter().map(|topic| topic.topic_model(self.scope)).collect()
    }

    /// Returns the expanded topic names of every data topic.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] when a data topic is incomplete.
    pub fn topic_names(&self) -> Result<BTreeSet<String>, SpecificationError> {
        let mut names = BTreeSet::new();
        for model in self.topic_models()? {
            names.extend(model.topic_names());
        }
        Ok(names)
    }
}
