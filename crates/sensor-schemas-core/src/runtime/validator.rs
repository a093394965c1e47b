// crates/sensor-schemas-core/src/runtime/validator.rs
// ============================================================================
// Module: Validation Combinators
// Description: Tagged rule values and the accumulating AND combinator.
// Purpose: Compose validation checks that report every violation.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! A [`Rule`] is a named check from a subject to zero or more
//! [`Violation`]s. Rules combine with [`Rule::and`] and [`all`]; a combined
//! rule runs every member and concatenates their violations in order, so a
//! failing member never hides the ones after it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Violation {
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a violation with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Formats violations as a report, one `Validation FAILED` block per entry.
#[must_use]
pub fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("Validation FAILED:\n{violation}\n\n"))
        .collect()
}

/// Returns a single violation when `condition` is false.
#[must_use]
pub fn check(condition: bool, message: impl FnOnce() -> String) -> Vec<Violation> {
    if condition { Vec::new() } else { vec![Violation::new(message())] }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Boxed check function of a rule.
type Check<'a, T> = Box<dyn Fn(&T) -> Vec<Violation> + Send + Sync + 'a>;

/// Named validation check over subjects of type `T`.
pub struct Rule<'a, T: ?Sized> {
    /// Rule name, used for diagnostics.
    name: String,
    /// Check function.
    check: Check<'a, T>,
}

impl<'a, T: ?Sized + 'a> Rule<'a, T> {
    /// Creates a rule from a check function.
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&T) -> Vec<Violation> + Send + Sync + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }

    /// Creates a rule that raises `message` whenever `predicate` is false.
    pub fn predicate(
        name: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'a,
        message: impl Fn(&T) -> String + Send + Sync + 'a,
    ) -> Self {
        Self::new(name, move |subject: &T| check(predicate(subject), || message(subject)))
    }

    /// Rule that never reports a violation.
    #[must_use]
    pub fn valid() -> Self {
        Self::new("valid", |_: &T| Vec::new())
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the rule.
    #[must_use]
    pub fn check(&self, subject: &T) -> Vec<Violation> {
        (self.check)(subject)
    }

    /// Returns true when the rule reports no violations.
    #[must_use]
    pub fn is_valid(&self, subject: &T) -> bool {
        self.check(subject).is_empty()
    }

    /// Combines two rules; both always run.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let name = format!("{} & {}", self.name, other.name);
        Self::new(name, move |subject: &T| {
            let mut violations = self.check(subject);
            violations.extend(other.check(subject));
            violations
        })
    }
}

impl<T: ?Sized> fmt::Debug for Rule<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Combines rules so that all of them run in order.
#[must_use]
pub fn all<'a, T: ?Sized + 'a>(name: impl Into<String>, rules: Vec<Rule<'a, T>>) -> Rule<'a, T> {
    Rule::new(name, move |subject: &T| rules.iter().flat_map(|rule| rule.check(subject)).collect())
}
