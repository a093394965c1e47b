// crates/sensor-schemas-cli/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Exercises the translation catalog and placeholder substitution.
// Purpose: Ensure CLI user-facing strings route through stable i18n helpers.
// Dependencies: sensor-schemas-cli i18n module and the `t!` macro.
// ============================================================================

//! ## Overview
//! Translation substitutes placeholders, falls back to the key on misses, and
//! the [`t!`](sensor_schemas_cli::t) macro formats named arguments.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use sensor_schemas_cli::i18n::MessageArg;
use sensor_schemas_cli::i18n::translate;
use sensor_schemas_cli::t;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let args = vec![
        MessageArg::new("topic", "application_uptime"),
        MessageArg::new("key", "org.radarcns.kafka.ObservationKey"),
        MessageArg::new("value", "org.radarcns.monitor.application.ApplicationUptime"),
    ];
    assert_eq!(
        translate("validate.topics.line", args),
        "- application_uptime [org.radarcns.kafka.ObservationKey: \
         org.radarcns.monitor.application.ApplicationUptime]"
    );
}

/// Confirms missing keys fall back to the key string.
#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("missing.key", Vec::new()), "missing.key");
}

/// Confirms the macro formats named arguments.
#[test]
fn macro_formats_named_arguments() {
    assert_eq!(t!("validate.summary.failed", count = 3), "3 validation violations found.");
    assert_eq!(t!("list.source", scope = "PASSIVE", name = "android_phone"), "PASSIVE - android_phone");
}
