// crates/sensor-schemas-core/src/core/scope.rs
// ============================================================================
// Module: Source Scopes
// Description: Closed set of source categories and their directory names.
// Purpose: Map each scope to its conventional subdirectory without side effects.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Scope`] names the category of a data source. Each scope owns one
//! subdirectory under the schema root (`commons/`) and the specification root
//! (`specifications/`). The mapping is a pure table; directory existence is
//! checked by the loaders that walk the tree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory below the repository root that holds schema files.
pub const COMMONS_PATH: &str = "commons";
/// Directory below the repository root that holds source specifications.
pub const SPECIFICATIONS_PATH: &str = "specifications";

// ============================================================================
// SECTION: Scope
// ============================================================================

/// Category of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Questionnaires and other actively collected data.
    Active,
    /// Shared catalogue types such as units and processing states.
    Catalogue,
    /// Data imported through source connectors.
    Connector,
    /// Kafka key records.
    #[serde(rename = "kafka-key", alias = "kafka")]
    KafkaKey,
    /// Monitoring data about the platform itself.
    Monitor,
    /// Passively collected sensor data.
    Passive,
    /// Data pushed by third-party services.
    Push,
    /// Outputs of stream processing.
    Stream,
}

/// Table of every scope with its subdirectory name.
const SCOPE_TABLE: &[(Scope, &str)] = &[
    (Scope::Active, "active"),
    (Scope::Catalogue, "catalogue"),
    (Scope::Connector, "connector"),
    (Scope::KafkaKey, "kafka"),
    (Scope::Monitor, "monitor"),
    (Scope::Passive, "passive"),
    (Scope::Push, "push"),
    (Scope::Stream, "stream"),
];

impl Scope {
    /// All scopes in table order.
    pub const ALL: [Self; 8] = [
        Self::Active,
        Self::Catalogue,
        Self::Connector,
        Self::KafkaKey,
        Self::Monitor,
        Self::Passive,
        Self::Push,
        Self::Stream,
    ];

    /// Scopes that carry source specifications.
    pub const SOURCES: [Self; 6] =
        [Self::Active, Self::Monitor, Self::Passive, Self::Connector, Self::Stream, Self::Push];

    /// Returns the conventional subdirectory name of the scope.
    #[must_use]
    pub fn directory(self) -> &'static str {
        SCOPE_TABLE
            .iter()
            .find(|(scope, _)| *scope == self)
            .map_or("", |(_, directory)| directory)
    }

    /// Resolves the scope directory below `root`.
    #[must_use]
    pub fn path(self, root: &Path) -> PathBuf {
        root.join(self.directory())
    }

    /// Looks up a scope by its directory name or label (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized == "kafka-key" || normalized == "kafka_key" {
            return Some(Self::KafkaKey);
        }
        SCOPE_TABLE
            .iter()
            .find(|(_, directory)| *directory == normalized)
            .map(|(scope, _)| *scope)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "ACTIVE",
            Self::Catalogue => "CATALOGUE",
            Self::Connector => "CONNECTOR",
            Self::KafkaKey => "KAFKA",
            Self::Monitor => "MONITOR",
            Self::Passive => "PASSIVE",
            Self::Push => "PUSH",
            Self::Stream => "STREAM",
        };
        f.write_str(label)
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| format!("unknown scope: {value}"))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
