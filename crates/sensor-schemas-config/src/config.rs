// crates/sensor-schemas-config/src/config.rs
// ============================================================================
// Module: Tool Configuration
// Description: Configuration loading and validation for the schema tools.
// Purpose: Provide strict, fail-closed YAML parsing with hard limits.
// Dependencies: serde, serde_yaml, sensor-schemas-core
// ============================================================================

//! ## Overview
//! The tool configuration carries Kafka client properties, per-topic overrides,
//! schema and source path filters, inline schemas per scope and an inline
//! exclusion configuration. Loading resolves the path from the argument or
//! `SENSOR_SCHEMAS_CONFIG`, enforces path and size limits, requires UTF-8 and
//! validates the result. Without a path the default configuration applies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use sensor_schemas_core::Scope;
use sensor_schemas_core::SchemaResolver;
use sensor_schemas_core::TopicConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::exclude::ExcludeConfig;
use crate::filter::GlobPathFilter;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Environment variable holding the tool configuration path.
pub(crate) const CONFIG_ENV_VAR: &str = "SENSOR_SCHEMAS_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum Kafka topic name length.
pub(crate) const MAX_TOPIC_NAME_LENGTH: usize = 249;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Configuration text is not valid YAML for the expected shape.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Configuration violates a constraint.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Tool Configuration
// ============================================================================

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Kafka client properties passed through to admin clients.
    pub kafka: BTreeMap<String, serde_yaml::Value>,
    /// Per-topic overrides and extra topics.
    pub topics: BTreeMap<String, TopicConfig>,
    /// Schema path filter and inline schemas.
    pub schemas: SchemaConfig,
    /// Specification path filter.
    pub sources: SourceConfig,
    /// Inline validation exclusions.
    pub exclude: ExcludeConfig,
}

impl ToolConfig {
    /// Loads the configuration from `path`, or from `SENSOR_SCHEMAS_CONFIG`,
    /// or returns the default configuration when neither is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            debug!("no tool configuration given, using defaults");
            return Ok(Self::default());
        };
        let text = read_config_text(&resolved)?;
        Self::parse(&text)
    }

    /// Parses and validates configuration YAML; empty text yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the YAML is malformed or invalid.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, topic) in &self.topics {
            validate_topic(name, topic)?;
        }
        self.schemas.validate()?;
        self.sources.validate()?;
        self.exclude.validate()
    }
}

/// Validates one topic entry.
fn validate_topic(name: &str, topic: &TopicConfig) -> Result<(), ConfigError> {
    if name.is_empty() || name.len() > MAX_TOPIC_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "topic name {name} must be 1 to {MAX_TOPIC_NAME_LENGTH} characters"
        )));
    }
    if name == "." || name == ".." {
        return Err(ConfigError::Invalid(format!("topic name {name} is reserved")));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(ConfigError::Invalid(format!("topic name {name} contains illegal characters")));
    }
    if topic.partitions == Some(0) {
        return Err(ConfigError::Invalid(format!("topics.{name}.partitions must be positive")));
    }
    if topic.replication_factor == Some(0) {
        return Err(ConfigError::Invalid(format!(
            "topics.{name}.replication_factor must be positive"
        )));
    }
    if topic.key_schema.is_some() != topic.value_schema.is_some() {
        return Err(ConfigError::Invalid(format!(
            "topics.{name} must set key_schema and value_schema together"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Schema Configuration
// ============================================================================

/// Schema path filter and inline schemas per scope.
///
/// Inline maps are keyed by a path relative to the scope directory, for
/// example `phone/phone_extra.avsc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Include globs relative to the schema root.
    pub include: Vec<String>,
    /// Exclude globs relative to the schema root.
    pub exclude: Vec<String>,
    /// Inline active schemas.
    pub active: BTreeMap<String, String>,
    /// Inline Kafka key schemas.
    pub kafka: BTreeMap<String, String>,
    /// Inline catalogue schemas.
    pub catalogue: BTreeMap<String, String>,
    /// Inline connector schemas.
    pub connector: BTreeMap<String, String>,
    /// Inline monitor schemas.
    pub monitor: BTreeMap<String, String>,
    /// Inline passive schemas.
    pub passive: BTreeMap<String, String>,
    /// Inline push schemas.
    pub push: BTreeMap<String, String>,
    /// Inline stream schemas.
    pub stream: BTreeMap<String, String>,
}

impl SchemaConfig {
    /// Returns the inline schemas of one scope.
    #[must_use]
    pub const fn inline(&self, scope: Scope) -> &BTreeMap<String, String> {
        match scope {
            Scope::Active => &self.active,
            Scope::Catalogue => &self.catalogue,
            Scope::Connector => &self.connector,
            Scope::KafkaKey => &self.kafka,
            Scope::Monitor => &self.monitor,
            Scope::Passive => &self.passive,
            Scope::Push => &self.push,
            Scope::Stream => &self.stream,
        }
    }

    /// Builds the schema path filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a glob fails to compile.
    pub fn path_filter(&self) -> Result<GlobPathFilter, ConfigError> {
        GlobPathFilter::new("schemas", &self.include, &self.exclude)
    }

    /// Applies the path filter and inline schemas to a resolver.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a glob fails to compile.
    pub fn apply(&self, resolver: SchemaResolver) -> Result<SchemaResolver, ConfigError> {
        let filter = self.path_filter()?;
        let mut resolver =
            if filter.is_unrestricted() { resolver } else { resolver.with_filter(Box::new(filter)) };
        for scope in Scope::ALL {
            for (relative, text) in self.inline(scope) {
                debug!(scope = %scope, path = %relative, "adding inline schema");
                resolver = resolver.with_inline_schema(scope, relative, text.clone());
            }
        }
        Ok(resolver)
    }

    /// Validates globs and inline schema paths.
    fn validate(&self) -> Result<(), ConfigError> {
        self.path_filter()?;
        for scope in Scope::ALL {
            for relative in self.inline(scope).keys() {
                let field = format!("schemas.{}.{relative}", scope.directory());
                validate_path_string(&field, relative)?;
                validate_relative(&field, relative)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Source Configuration
// ============================================================================

/// Specification path filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Include globs relative to the specifications root.
    pub include: Vec<String>,
    /// Exclude globs relative to the specifications root.
    pub exclude: Vec<String>,
}

impl SourceConfig {
    /// Builds the specification path filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a glob fails to compile.
    pub fn path_filter(&self) -> Result<GlobPathFilter, ConfigError> {
        GlobPathFilter::new("sources", &self.include, &self.exclude)
    }

    /// Validates globs.
    fn validate(&self) -> Result<(), ConfigError> {
        self.path_filter().map(|_| ())
    }
}

// ============================================================================
// SECTION: File Loading
// ============================================================================

/// Reads a configuration file within the path and size limits.
///
/// # Errors
///
/// Returns [`ConfigError`] when the path exceeds limits, the file cannot be
/// read, is too large or is not UTF-8.
pub(crate) fn read_config_text(path: &Path) -> Result<String, ConfigError> {
    validate_path(path)?;
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    String::from_utf8(bytes)
        .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))
}

/// Resolves the config path from the argument or environment.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    match env::var(CONFIG_ENV_VAR) {
        Ok(env_path) if !env_path.trim().is_empty() => {
            if env_path.len() > MAX_TOTAL_PATH_LENGTH {
                return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
            }
            Ok(Some(PathBuf::from(env_path)))
        }
        _ => Ok(None),
    }
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Rejects absolute paths and parent traversal.
fn validate_relative(field: &str, value: &str) -> Result<(), ConfigError> {
    let escapes = Path::new(value.trim()).components().any(|component| {
        matches!(component, Component::ParentDir | Component::RootDir | Component::Prefix(_))
    });
    if escapes {
        return Err(ConfigError::Invalid(format!("{field} must stay inside the scope directory")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
