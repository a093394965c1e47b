// crates/sensor-schemas-core/src/runtime/specifications.rs
// ============================================================================
// Module: Specification Validation
// Description: File-level checks on the source specification tree.
// Purpose: Report misnamed, unparsable or badly named specifications.
// Dependencies: crate::{core, interfaces, runtime}, regex, tracing
// ============================================================================

//! ## Overview
//! Every file under `specifications/<scope>` must be a `.yml` file that
//! parses as a producer of that scope, and every data topic it declares must
//! use a snake-case topic name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use regex::Regex;
use tracing::info;

use crate::core::naming::TOPIC_PATTERN;
use crate::core::scope::SPECIFICATIONS_PATH;
use crate::core::scope::Scope;
use crate::core::specification::Source;
use crate::interfaces::AcceptAll;
use crate::interfaces::PathFilter;
use crate::runtime::resolver::collect_files;
use crate::runtime::rules::RuleError;
use crate::runtime::validator::Violation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Required extension of specification files.
pub const YAML_EXTENSION: &str = "yml";

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validator for the specification tree of one repository.
pub struct SpecificationsValidator {
    /// Directory holding the scope subdirectories.
    specification_root: PathBuf,
    /// Filter on paths relative to the specification root.
    filter: Box<dyn PathFilter>,
    /// Compiled topic-name pattern.
    topic_pattern: Regex,
}

impl SpecificationsValidator {
    /// Creates a validator for the repository at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Pattern`] when the topic pattern fails to compile.
    pub fn new(root: &Path) -> Result<Self, RuleError> {
        let topic_pattern = Regex::new(TOPIC_PATTERN)
            .map_err(|err| RuleError::Pattern(format!("{TOPIC_PATTERN}: {err}")))?;
        Ok(Self {
            specification_root: root.join(SPECIFICATIONS_PATH),
            filter: Box::new(AcceptAll),
            topic_pattern,
        })
    }

    /// Applies a path filter to specification files.
    #[must_use]
    pub fn with_filter(mut self, filter: Box<dyn PathFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Returns true when `topic` is a valid topic name.
    #[must_use]
    pub fn is_valid_topic(&self, topic: &str) -> bool {
        self.topic_pattern.is_match(topic)
    }

    /// Validates the specifications of one scope, or of every source scope.
    #[must_use]
    pub fn validate(&self, scope: Option<Scope>) -> Vec<Violation> {
        let scopes = scope.map_or_else(|| Scope::SOURCES.to_vec(), |scope| vec![scope]);
        scopes.into_iter().flat_map(|scope| self.validate_scope(scope)).collect()
    }

    /// Validates the specifications of a single scope.
    fn validate_scope(&self, scope: Scope) -> Vec<Violation> {
        let directory = scope.path(&self.specification_root);
        if !directory.is_dir() {
            info!(scope = %scope, path = %directory.display(), "specification directory not found");
            return Vec::new();
        }
        let mut files = Vec::new();
        if let Err(err) = collect_files(&directory, &mut files) {
            return vec![Violation::new(format!(
                "Failed to list specifications in {}: {err}",
                directory.display()
            ))];
        }
        files.sort();
        let mut violations = Vec::new();
        for path in files {
            let relative = path.strip_prefix(&self.specification_root).unwrap_or(&path);
            if !self.filter.accepts(relative) {
                continue;
            }
            let is_yaml = path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| extension == YAML_EXTENSION);
            if !is_yaml {
                violations.push(Violation::new(format!(
                    "Path {} does not have file extension {YAML_EXTENSION}",
                    path.display()
                )));
                continue;
            }
            let source = fs::read_to_string(&path)
                .map_err(|err| err.to_string())
                .and_then(|text| Source::from_yaml(&text, scope).map_err(|err| err.to_string()));
            match source {
                Ok(source) => violations.extend(self.topic_violations(&source, &path)),
                Err(err) => violations.push(Violation::new(format!(
                    "Failed to load configuration {}: {err}",
                    path.display()
                ))),
            }
        }
        violations
    }

    /// Reports data topics whose names are not snake case.
    fn topic_violations(&self, source: &Source, path: &Path) -> Vec<Violation> {
        source
            .producer
            .data
            .iter()
            .filter_map(|topic| topic.input_topic())
            .filter(|topic| !self.is_valid_topic(topic))
            .map(|topic| {
                Violation::new(format!(
                    "Topic {topic} in {} does not use valid syntax. Topic names should be written \
                     in snake case.",
                    path.display()
                ))
            })
            .collect()
    }
}
