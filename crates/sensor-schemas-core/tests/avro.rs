// crates/sensor-schemas-core/tests/avro.rs
// ============================================================================
// Module: Avro Parser Tests
// Description: Schema parsing, name resolution and JSON serialization.
// Purpose: Validate parser errors and serialization fidelity.
// Dependencies: sensor-schemas-core, serde_json
// ============================================================================
//! ## Overview
//! Parsing resolves names against the document and a type dictionary;
//! serialized schemas parse back to equal schemas.

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

mod common;

use sensor_schemas_core::Schema;
use sensor_schemas_core::SchemaParseError;
use sensor_schemas_core::SchemaType;
use sensor_schemas_core::TypeDictionary;
use sensor_schemas_core::parse_schema;

fn dictionary() -> TypeDictionary {
    let state = parse_schema(common::BATTERY_STATE, &TypeDictionary::new()).expect("state");
    TypeDictionary::from([(state.full_name(), state)])
}

#[test]
fn references_resolve_through_the_dictionary() {
    let types = dictionary();
    let level = parse_schema(common::BATTERY_LEVEL, &types).expect("level");
    assert_eq!(level.schema_type(), SchemaType::Record);
    assert_eq!(level.namespace(), Some("org.radarcns.passive.phone"));
    let state = &level.field("state").expect("state").schema;
    assert_eq!(state.symbols(), ["CHARGING", "DISCHARGING", "UNKNOWN"]);

    let err = parse_schema(common::BATTERY_LEVEL, &TypeDictionary::new()).expect_err("undefined");
    assert_eq!(
        err,
        SchemaParseError::UndefinedName("org.radarcns.catalogue.BatteryState".to_string())
    );
}

#[test]
fn serialized_schema_parses_back_equal() {
    let types = dictionary();
    let level = parse_schema(common::BATTERY_LEVEL, &types).expect("level");
    let text = level.to_pretty_string();
    assert!(text.contains("\"symbols\""));
    let reparsed = parse_schema(&text, &TypeDictionary::new()).expect("reparse");
    assert_eq!(reparsed, level);
    assert_eq!(reparsed.to_string(), level.to_string());
}

#[test]
fn named_types_are_written_once() {
    let schema = parse_schema(
        r#"{"type":"record","name":"Pair","namespace":"org.radarcns.test","doc":"Pair.",
            "fields":[
              {"name":"left","type":{"type":"enum","name":"Side","symbols":["A","B"]}},
              {"name":"right","type":"Side"}
            ]}"#,
        &TypeDictionary::new(),
    )
    .expect("pair");
    let json = schema.to_json();
    assert_eq!(json["fields"][1]["type"], "org.radarcns.test.Side");
    assert_eq!(json["fields"][0]["type"]["type"], "enum");
    assert!(json["fields"][0]["type"].get("namespace").is_none());
    assert_eq!(schema.fields()[1].schema, schema.fields()[0].schema);
}

#[test]
fn structural_errors_are_reported() {
    let types = TypeDictionary::new();
    let cases = [
        "{ not json",
        r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int"},{"name":"a","type":"int"}]}"#,
        r#"{"type":"enum","name":"E","symbols":["A","A"]}"#,
        r#"{"type":"enum","name":"E","symbols":["A"],"default":"B"}"#,
        r#"{"type":"record","name":"R","fields":[{"name":"a","type":"int","default":"x"}]}"#,
        r#"["int","int"]"#,
        r#"{"type":"fixed","name":"F"}"#,
        r#"{"type":"record","name":"9R","fields":[]}"#,
        r#"{"type":"record","name":"int","fields":[]}"#,
    ];
    for case in cases {
        assert!(parse_schema(case, &types).is_err(), "accepted: {case}");
    }
    assert!(matches!(parse_schema("{ not json", &types), Err(SchemaParseError::Json(_))));
}

#[test]
fn union_defaults_match_the_first_branch() {
    let types = TypeDictionary::new();
    let record = |union: &str, default: &str| {
        format!(
            r#"{{"type":"record","name":"R","fields":[{{"name":"a","type":{union},"default":{default}}}]}}"#
        )
    };
    assert!(parse_schema(&record(r#"["null","double"]"#, "null"), &types).is_ok());
    assert!(parse_schema(&record(r#"["double","null"]"#, "1.5"), &types).is_ok());
    let err = parse_schema(&record(r#"["double","null"]"#, "null"), &types)
        .expect_err("null default after a double branch");
    assert!(err.to_string().contains("invalid default for field a"), "{err}");
    assert!(parse_schema(&record(r#"["null","string"]"#, r#""x""#), &types).is_err());
}

#[test]
fn logical_types_parse_as_their_base_type() {
    let schema = parse_schema(
        r#"{"type":"long","logicalType":"timestamp-millis"}"#,
        &TypeDictionary::new(),
    )
    .expect("logical");
    assert_eq!(schema, Schema::Long);
    assert_eq!(schema.full_name(), "long");
}

#[test]
fn deep_nesting_is_rejected() {
    let mut text = String::from("\"int\"");
    for _ in 0 .. 100 {
        text = format!(r#"{{"type":"array","items":{text}}}"#);
    }
    let err = parse_schema(&text, &TypeDictionary::new()).expect_err("too deep");
    assert!(matches!(err, SchemaParseError::Invalid(_)), "{err}");
}
