// crates/sensor-schemas-config/src/exclude.rs
// ============================================================================
// Module: Validation Exclusions
// Description: Exclusion configuration for files and naming checks.
// Purpose: Let a repository exempt legacy schemas from specific rules.
// Dependencies: glob, regex, serde, serde_yaml, sensor-schemas-core
// ============================================================================

//! ## Overview
//! The exclusion configuration lists file globs that are skipped entirely and,
//! per schema or per `namespace.*` wildcard, naming checks that are disabled:
//!
//! ```yaml
//! files:
//!   - commons/**/README.md
//! validation:
//!   org.radarcns.passive.phone.PhoneCall:
//!     record_name_check: disable
//!     fields: [duration]
//!   org.radarcns.active.*:
//!     fields: [answers]
//! ```
//!
//! Lookups try the full schema name before the namespace wildcard.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use glob::Pattern;
use regex::Regex;
use sensor_schemas_core::COMMONS_PATH;
use sensor_schemas_core::ValidationExemptions;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::ConfigError;
use crate::config::read_config_text;
use crate::filter::MATCH_OPTIONS;
use crate::filter::compile_globs;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Valid schema keys and field names in the validation map.
pub const VALID_INPUT_PATTERN: &str = r"^[a-z][a-zA-Z0-9.*]*$";

/// Suffix of namespace-wide validation keys.
const WILDCARD_SUFFIX: &str = ".*";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Whether a naming check runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckToggle {
    /// Check runs.
    #[default]
    Enable,
    /// Check is skipped.
    Disable,
}

/// Exemptions for one schema or namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationExclusion {
    /// Record-name check toggle.
    pub record_name_check: CheckToggle,
    /// Field names exempt from the field-name check.
    pub fields: BTreeSet<String>,
}

/// Exclusion configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcludeConfig {
    /// File globs skipped by validation.
    pub files: Vec<String>,
    /// Naming-check exemptions keyed by full name or `namespace.*`.
    pub validation: BTreeMap<String, ValidationExclusion>,
}

impl ExcludeConfig {
    /// Loads and validates an exclusion file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_config_text(path)?;
        Self::parse(&text)
    }

    /// Parses and validates exclusion YAML.
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

    /// Validates keys, field names and globs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a key or field name is malformed
    /// or a glob fails to compile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = Regex::new(VALID_INPUT_PATTERN)
            .map_err(|err| ConfigError::Invalid(format!("{VALID_INPUT_PATTERN}: {err}")))?;
        for (key, exclusion) in &self.validation {
            if !valid.is_match(key) {
                return Err(ConfigError::Invalid(format!("validation key {key} is invalid")));
            }
            if let Some(field) = exclusion.fields.iter().find(|field| !valid.is_match(field)) {
                return Err(ConfigError::Invalid(format!(
                    "validation field {field} of {key} is invalid"
                )));
            }
        }
        compile_globs("files", &self.files)?;
        Ok(())
    }

    /// Adds the entries of `other`; disabled checks and exempt fields accumulate.
    pub fn merge(&mut self, other: Self) {
        for file in other.files {
            if !self.files.contains(&file) {
                self.files.push(file);
            }
        }
        for (key, exclusion) in other.validation {
            let entry = self.validation.entry(key).or_default();
            if exclusion.record_name_check == CheckToggle::Disable {
                entry.record_name_check = CheckToggle::Disable;
            }
            entry.fields.extend(exclusion.fields);
        }
    }

    /// Returns the exclusion for a schema, trying the full name before the
    /// namespace wildcard.
    #[must_use]
    pub fn lookup(&self, full_name: &str) -> Option<&ValidationExclusion> {
        self.validation.get(full_name).or_else(|| {
            let (namespace, _) = full_name.rsplit_once('.')?;
            self.validation.get(&format!("{namespace}{WILDCARD_SUFFIX}"))
        })
    }

    /// Compiles the configuration into an exemption table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails.
    pub fn exemptions(&self) -> Result<ExemptionTable, ConfigError> {
        self.validate()?;
        Ok(ExemptionTable {
            files: compile_globs("files", &self.files)?,
            config: self.clone(),
        })
    }
}

// ============================================================================
// SECTION: Exemption Table
// ============================================================================

/// Compiled exclusion configuration.
#[derive(Debug, Clone)]
pub struct ExemptionTable {
    /// Compiled file globs.
    files: Vec<Pattern>,
    /// Source configuration for name lookups.
    config: ExcludeConfig,
}

impl ValidationExemptions for ExemptionTable {
    fn skip_record_name(&self, full_name: &str) -> bool {
        self.config
            .lookup(full_name)
            .is_some_and(|exclusion| exclusion.record_name_check == CheckToggle::Disable)
    }

    fn skip_field_name(&self, full_name: &str, field: &str) -> bool {
        self.config.lookup(full_name).is_some_and(|exclusion| exclusion.fields.contains(field))
    }

    /// Globs match the path relative to the schema root, the same path below
    /// `commons/`, or the bare file name.
    fn skip_file(&self, relative: &Path) -> bool {
        let in_repository = Path::new(COMMONS_PATH).join(relative);
        let file_name = relative.file_name().map(Path::new);
        let skipped = self.files.iter().any(|pattern| {
            pattern.matches_path_with(relative, MATCH_OPTIONS)
                || pattern.matches_path_with(&in_repository, MATCH_OPTIONS)
                || file_name.is_some_and(|name| pattern.matches_path_with(name, MATCH_OPTIONS))
        });
        if skipped {
            debug!(path = %relative.display(), "file excluded from validation");
        }
        skipped
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
