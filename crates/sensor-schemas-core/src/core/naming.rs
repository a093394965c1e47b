// crates/sensor-schemas-core/src/core/naming.rs
// ============================================================================
// Module: Naming Conventions
// Description: Project group expansion and file-name conversions.
// Purpose: Centralize the string conventions shared by topics and rules.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! Class and schema names in specifications may be abbreviated with a leading
//! `.`, which expands to the project group. Schema files are named in
//! snake case and map to UpperCamelCase record names.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Project group used as the root namespace of all schemas.
pub const PROJECT_GROUP: &str = "org.radarcns";

/// Default key schema of a data topic.
pub const OBSERVATION_KEY: &str = "org.radarcns.kafka.ObservationKey";

/// Topic names: snake case with optional dashes.
pub const TOPIC_PATTERN: &str = r"^[A-Za-z][a-z0-9-]*(_[A-Za-z0-9-]+)*$";

// ============================================================================
// SECTION: Conversions
// ============================================================================

/// Expands a leading `.` to the project group.
///
/// ```
/// use sensor_schemas_core::naming::expand_class;
/// assert_eq!(expand_class(".kafka.ObservationKey"), "org.radarcns.kafka.ObservationKey");
/// assert_eq!(expand_class("com.example.Key"), "com.example.Key");
/// ```
#[must_use]
pub fn expand_class(value: &str) -> String {
    if value.starts_with('.') { format!("{PROJECT_GROUP}{value}") } else { value.to_string() }
}

/// Converts a snake-case file name to UpperCamelCase, stopping at the first `.`.
///
/// ```
/// use sensor_schemas_core::naming::snake_to_camel_case;
/// assert_eq!(snake_to_camel_case("empatica_e4_acceleration.avsc"), "EmpaticaE4Acceleration");
/// ```
#[must_use]
pub fn snake_to_camel_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut next_upper = true;
    for c in value.chars() {
        match c {
            '_' => next_upper = true,
            '.' => break,
            _ if next_upper => {
                result.extend(c.to_uppercase());
                next_upper = false;
            }
            _ => result.push(c),
        }
    }
    result
}
