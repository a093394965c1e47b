// crates/sensor-schemas-cli/src/lib.rs
// ============================================================================
// Module: Sensor Schemas CLI Library
// Description: Shared helpers for the sensor-schemas command-line interface.
// Purpose: Provide reusable components (i18n) for the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library houses the message catalog shared by the `sensor-schemas`
//! binary (`src/main.rs`) and its tests.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;

#[cfg(test)]
mod tests;
