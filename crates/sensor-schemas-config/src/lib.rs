// crates/sensor-schemas-config/src/lib.rs
// ============================================================================
// Module: Sensor Schemas Config Library
// Description: Tool configuration, validation exclusions and path filters.
// Purpose: Single source of truth for tool and exclusion YAML semantics.
// Dependencies: sensor-schemas-core, serde, serde_yaml, glob, regex
// ============================================================================

//! ## Overview
//! `sensor-schemas-config` loads the tool configuration (topic overrides,
//! schema and source path filters, inline schemas) and the validation
//! exclusion configuration. Loading is strict: unknown keys, invalid globs,
//! oversized files and malformed names fail instead of being ignored.
//!
//! The loaded types plug into the core runtime through its interfaces:
//! [`GlobPathFilter`] implements `PathFilter` and [`ExemptionTable`]
//! implements `ValidationExemptions`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod exclude;
pub mod filter;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use exclude::CheckToggle;
pub use exclude::ExcludeConfig;
pub use exclude::ExemptionTable;
pub use exclude::ValidationExclusion;
pub use filter::GlobPathFilter;
