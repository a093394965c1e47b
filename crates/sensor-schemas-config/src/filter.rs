// crates/sensor-schemas-config/src/filter.rs
// ============================================================================
// Module: Glob Path Filters
// Description: Include/exclude glob filters over loader-relative paths.
// Purpose: Narrow the schema and specification files a loader visits.
// Dependencies: glob, sensor-schemas-core
// ============================================================================

//! ## Overview
//! A filter with include globs accepts only matching paths and ignores its
//! exclude globs. Without include globs, exclude globs reject matching paths.
//! Without either, every path is accepted.
//!
//! `*` never crosses a directory separator; `**` as a whole component spans
//! any number of directories.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use glob::MatchOptions;
use glob::Pattern;
use sensor_schemas_core::PathFilter;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Matching
// ============================================================================

/// Glob match options shared by path filters and file exclusions.
pub(crate) const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiles glob patterns, naming the configuration field on failure.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for the first pattern that fails to compile.
pub(crate) fn compile_globs(field: &str, globs: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    globs
        .iter()
        .map(|glob| {
            Pattern::new(glob)
                .map_err(|err| ConfigError::Invalid(format!("{field} glob {glob} is invalid: {err}")))
        })
        .collect()
}

// ============================================================================
// SECTION: Filter
// ============================================================================

/// Selection mode of a filter.
#[derive(Debug, Clone)]
enum Mode {
    /// Accept every path.
    All,
    /// Accept paths matching any pattern.
    Include(Vec<Pattern>),
    /// Accept paths matching no pattern.
    Exclude(Vec<Pattern>),
}

/// Path filter built from include and exclude globs.
#[derive(Debug, Clone)]
pub struct GlobPathFilter {
    /// Selection mode.
    mode: Mode,
}

impl GlobPathFilter {
    /// Builds a filter; include globs take precedence over exclude globs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a glob fails to compile.
    pub fn new(field: &str, include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        let mode = if !include.is_empty() {
            Mode::Include(compile_globs(&format!("{field}.include"), include)?)
        } else if !exclude.is_empty() {
            Mode::Exclude(compile_globs(&format!("{field}.exclude"), exclude)?)
        } else {
            Mode::All
        };
        Ok(Self {
            mode,
        })
    }

    /// Returns true when the filter accepts every path.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        matches!(self.mode, Mode::All)
    }
}

impl PathFilter for GlobPathFilter {
    fn accepts(&self, relative: &Path) -> bool {
        match &self.mode {
            Mode::All => true,
            Mode::Include(patterns) => {
                patterns.iter().any(|pattern| pattern.matches_path_with(relative, MATCH_OPTIONS))
            }
            Mode::Exclude(patterns) => {
                !patterns.iter().any(|pattern| pattern.matches_path_with(relative, MATCH_OPTIONS))
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use std::path::Path;

    use sensor_schemas_core::PathFilter;

    use super::GlobPathFilter;

    #[test]
    fn include_wins_over_exclude() {
        let filter = GlobPathFilter::new(
            "schemas",
            &["passive/**/*.avsc".to_string()],
            &["passive/phone/*.avsc".to_string()],
        )
        .expect("filter");
        assert!(filter.accepts(Path::new("passive/phone/phone_light.avsc")));
        assert!(!filter.accepts(Path::new("active/questionnaire/questionnaire.avsc")));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let filter =
            GlobPathFilter::new("sources", &[], &["passive/*.yml".to_string()]).expect("filter");
        assert!(!filter.accepts(Path::new("passive/phone.yml")));
        assert!(filter.accepts(Path::new("passive/nested/phone.yml")));
        assert!(GlobPathFilter::new("sources", &[], &[]).expect("filter").is_unrestricted());
    }

    #[test]
    fn invalid_glob_names_the_field() {
        let err = GlobPathFilter::new("schemas", &["[".to_string()], &[]).expect_err("invalid");
        assert!(err.to_string().contains("schemas.include glob [ is invalid"), "{err}");
    }
}
