// crates/sensor-schemas-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and locale resolution.
// Purpose: Ensure flags map onto the intended command options.
// Dependencies: sensor-schemas-cli main helpers
// ============================================================================

//! ## Overview
//! Parses representative command lines and checks locale and log-filter
//! resolution without touching a repository.

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

use std::path::PathBuf;

use clap::Parser;
use sensor_schemas_cli::i18n::Locale;
use sensor_schemas_core::Scope;

use super::Cli;
use super::Commands;
use super::LangArg;
use super::exit_code;
use super::resolve_locale;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn validate_flags_parse() {
    let cli = Cli::try_parse_from([
        "sensor-schemas",
        "validate",
        "-S",
        "--full",
        "--scope",
        "passive",
        "--exclude-config",
        "exclude.yml",
        "repo",
    ])
    .expect("parse");
    let Some(Commands::Validate(command)) = cli.command else {
        panic!("expected validate command");
    };
    assert!(command.from_specification);
    assert!(command.full);
    assert!(!command.specifications);
    assert_eq!(command.scope, Some(Scope::Passive));
    assert_eq!(command.repository.root, PathBuf::from("repo"));
    assert_eq!(command.exclude_config, Some(PathBuf::from("exclude.yml")));
}

#[test]
fn invalid_scope_and_conflicting_flags_fail() {
    assert!(Cli::try_parse_from(["sensor-schemas", "validate", "--scope", "nowhere"]).is_err());
    assert!(Cli::try_parse_from(["sensor-schemas", "validate", "-v", "-q"]).is_err());
    assert!(Cli::try_parse_from(["sensor-schemas", "list", "--raw", "--stream"]).is_err());
    assert!(Cli::try_parse_from(["sensor-schemas", "topics", "--partitions", "0"]).is_err());
}

#[test]
fn list_and_topics_defaults() {
    let cli = Cli::try_parse_from(["sensor-schemas", "list", "-m", "PASSIVE - android_phone"])
        .expect("parse");
    let Some(Commands::List(list)) = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(list.r#match.as_deref(), Some("PASSIVE - android_phone"));
    assert_eq!(list.repository.root, PathBuf::from("."));

    let cli = Cli::try_parse_from(["sensor-schemas", "topics", "-c", "tool.yml"]).expect("parse");
    let Some(Commands::Topics(topics)) = cli.command else {
        panic!("expected topics command");
    };
    assert_eq!(topics.partitions, 3);
    assert_eq!(topics.replication_factor, 3);
    assert_eq!(topics.repository.config, Some(PathBuf::from("tool.yml")));
}

#[test]
fn locale_resolution_prefers_flag_over_env() {
    assert_eq!(resolve_locale(Some(LangArg::Ca), Some("en")).expect("flag"), Locale::Ca);
    assert_eq!(resolve_locale(None, Some("ca-ES")).expect("env"), Locale::Ca);
    assert_eq!(resolve_locale(None, Some("  ")).expect("blank"), Locale::En);
    assert_eq!(resolve_locale(None, None).expect("default"), Locale::En);
    let err = resolve_locale(None, Some("xx")).expect_err("invalid");
    assert!(err.to_string().contains("SENSOR_SCHEMAS_LANG"));
}

#[test]
fn exit_code_reflects_violations() {
    assert_eq!(exit_code(&[]), std::process::ExitCode::SUCCESS);
    let violations = [sensor_schemas_core::Violation::new("bad")];
    assert_eq!(exit_code(&violations), std::process::ExitCode::FAILURE);
}
