// crates/sensor-schemas-core/tests/resolver.rs
// ============================================================================
// Module: Schema Resolver Tests
// Description: Fixed-point resolution over on-disk schema trees.
// Purpose: Validate convergence, duplicate handling and failure collection.
// Dependencies: sensor-schemas-core, tempfile
// ============================================================================
//! ## Overview
//! Builds temporary `commons/` trees and checks that resolution converges
//! regardless of file order, that inconsistent duplicates are fatal, and that
//! unresolvable files are reported rather than raised.

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

use std::path::Path;

use common::write;
use sensor_schemas_core::CatalogueError;
use sensor_schemas_core::PathFilter;
use sensor_schemas_core::ResolveError;
use sensor_schemas_core::SchemaResolver;
use sensor_schemas_core::SchemaRole;
use sensor_schemas_core::Scope;

/// Record `a.A` depending on `b.B`, which depends on enum `c.C`.
fn chain(root: &Path) {
    write(
        root,
        "commons/passive/a_record.avsc",
        r#"{"type":"record","name":"ARecord","namespace":"org.radarcns.passive","doc":"A.",
            "fields":[{"name":"b","type":"org.radarcns.passive.BRecord","doc":"B."}]}"#,
    );
    write(
        root,
        "commons/passive/b_record.avsc",
        r#"{"type":"record","name":"BRecord","namespace":"org.radarcns.passive","doc":"B.",
            "fields":[{"name":"c","type":"org.radarcns.catalogue.CEnum","doc":"C."}]}"#,
    );
    write(
        root,
        "commons/catalogue/c_enum.avsc",
        r#"{"type":"enum","name":"CEnum","namespace":"org.radarcns.catalogue","doc":"C.",
            "symbols":["X","Y"]}"#,
    );
}

#[test]
fn acyclic_references_resolve_in_any_order() {
    let dir = common::repository();
    chain(dir.path());
    let catalogue = SchemaResolver::for_repository(dir.path()).resolve().expect("resolve");
    assert_eq!(catalogue.len(), 3);
    assert!(catalogue.unresolved().is_empty());
    let a = catalogue.get("org.radarcns.passive.ARecord").expect("a");
    assert_eq!(a.scope, Scope::Passive);
    let b = &a.schema.fields()[0].schema;
    assert_eq!(b.full_name(), "org.radarcns.passive.BRecord");
    assert_eq!(b.fields()[0].schema.symbols(), ["X", "Y"]);
}

#[test]
fn inconsistent_duplicate_is_fatal() {
    let dir = common::repository();
    let root = dir.path();
    write(
        root,
        "commons/passive/one/dup.avsc",
        r#"{"type":"record","name":"Dup","namespace":"org.radarcns.passive","doc":"D.",
            "fields":[{"name":"x","type":"int","doc":"X."}]}"#,
    );
    write(
        root,
        "commons/passive/two/dup.avsc",
        r#"{"type":"record","name":"Dup","namespace":"org.radarcns.passive","doc":"D.",
            "fields":[{"name":"x","type":"long","doc":"X."}]}"#,
    );
    let err = SchemaResolver::for_repository(root).resolve().expect_err("duplicate");
    match err {
        ResolveError::Duplicate {
            name, ..
        } => assert_eq!(name, "org.radarcns.passive.Dup"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn identical_duplicate_keeps_first_entry() {
    let dir = common::repository();
    let root = dir.path();
    let text = r#"{"type":"record","name":"Dup","namespace":"org.radarcns.passive","doc":"D.",
        "fields":[{"name":"x","type":"int","doc":"X."}]}"#;
    write(root, "commons/passive/one/dup.avsc", text);
    write(root, "commons/passive/two/dup.avsc", text);
    let catalogue = SchemaResolver::for_repository(root).resolve().expect("resolve");
    assert_eq!(catalogue.len(), 1);
    assert!(catalogue.unresolved().is_empty());
    let entry = catalogue.get("org.radarcns.passive.Dup").expect("dup");
    assert!(entry.path.ends_with("one/dup.avsc"));
}

#[test]
fn missing_reference_and_bad_json_are_unresolved() {
    let dir = common::repository();
    let root = dir.path();
    write(
        root,
        "commons/active/orphan.avsc",
        r#"{"type":"record","name":"Orphan","namespace":"org.radarcns.active","doc":"O.",
            "fields":[{"name":"x","type":"org.radarcns.active.Missing","doc":"X."}]}"#,
    );
    write(root, "commons/active/broken.avsc", "{ not json");
    let catalogue = SchemaResolver::for_repository(root).resolve().expect("resolve");
    assert!(catalogue.is_empty());
    assert_eq!(catalogue.unresolved().len(), 2);
    let orphan = catalogue
        .unresolved()
        .iter()
        .find(|failed| failed.path.ends_with("orphan.avsc"))
        .expect("orphan reported");
    assert!(orphan.reason.contains("org.radarcns.active.Missing"), "{}", orphan.reason);
}

#[test]
fn cycle_between_files_terminates_unresolved() {
    let dir = common::repository();
    let root = dir.path();
    write(
        root,
        "commons/passive/left.avsc",
        r#"{"type":"record","name":"Left","namespace":"org.radarcns.passive","doc":"L.",
            "fields":[{"name":"right","type":"org.radarcns.passive.Right","doc":"R."}]}"#,
    );
    write(
        root,
        "commons/passive/right.avsc",
        r#"{"type":"record","name":"Right","namespace":"org.radarcns.passive","doc":"R.",
            "fields":[{"name":"left","type":"org.radarcns.passive.Left","doc":"L."}]}"#,
    );
    let catalogue = SchemaResolver::for_repository(root).resolve().expect("resolve");
    assert!(catalogue.is_empty());
    assert_eq!(catalogue.unresolved().len(), 2);
}

#[test]
fn non_schema_files_and_missing_scopes_are_ignored() {
    let dir = common::repository();
    let root = dir.path();
    write(root, "commons/passive/readme.md", "# notes");
    write(
        root,
        "commons/passive/upper.AVSC",
        r#"{"type":"enum","name":"Upper","namespace":"org.radarcns.passive","doc":"U.",
            "symbols":["A"]}"#,
    );
    let catalogue = SchemaResolver::for_repository(root).resolve().expect("resolve");
    assert_eq!(catalogue.len(), 1);
    assert!(catalogue.get("org.radarcns.passive.Upper").is_some());
}

#[test]
fn scope_restriction_resolves_only_that_scope() {
    let dir = common::repository();
    chain(dir.path());
    let catalogue = SchemaResolver::for_repository(dir.path())
        .with_scope(Some(Scope::Catalogue))
        .resolve()
        .expect("resolve");
    assert_eq!(catalogue.len(), 1);
    assert!(catalogue.get("org.radarcns.catalogue.CEnum").is_some());
}

/// Filter rejecting everything below a `private` directory.
struct SkipPrivate;

impl PathFilter for SkipPrivate {
    fn accepts(&self, relative: &Path) -> bool {
        !relative.components().any(|component| component.as_os_str() == "private")
    }
}

#[test]
fn path_filter_and_inline_schemas_shape_candidates() {
    let dir = common::repository();
    let root = dir.path();
    write(
        root,
        "commons/passive/private/hidden.avsc",
        r#"{"type":"enum","name":"Hidden","namespace":"org.radarcns.passive.private","doc":"H.",
            "symbols":["A"]}"#,
    );
    let catalogue = SchemaResolver::for_repository(root)
        .with_filter(Box::new(SkipPrivate))
        .with_inline_schema(
            Scope::Passive,
            "inline.avsc",
            r#"{"type":"enum","name":"Inline","namespace":"org.radarcns.passive","doc":"I.",
                "symbols":["A"]}"#,
        )
        .resolve()
        .expect("resolve");
    assert_eq!(catalogue.len(), 1);
    let inline = catalogue.get("org.radarcns.passive.Inline").expect("inline");
    assert!(inline.path.ends_with("passive/inline.avsc"));
}

#[test]
fn topic_schema_lookup_names_missing_type_and_topic() {
    let dir = common::sample_repository();
    let catalogue = SchemaResolver::for_repository(dir.path()).resolve().expect("resolve");
    let (key, value) = catalogue
        .topic_schemas(
            "org.radarcns.kafka.ObservationKey",
            "org.radarcns.passive.phone.PhoneBatteryLevel",
            "android_phone_battery_level",
        )
        .expect("bound");
    assert_eq!(key.scope, Scope::KafkaKey);
    assert_eq!(value.scope, Scope::Passive);

    let err = catalogue
        .topic_schemas("org.radarcns.kafka.ObservationKey", "org.radarcns.Nope", "t")
        .expect_err("missing value");
    assert_eq!(
        err,
        CatalogueError::SchemaNotFound {
            role: SchemaRole::Value,
            schema: "org.radarcns.Nope".to_string(),
            topic: "t".to_string(),
        }
    );
    assert_eq!(err.to_string(), "Value schema org.radarcns.Nope for topic t not found.");

    let err = catalogue.topic_schemas("org.radarcns.Nope", "x", "t").expect_err("missing key");
    assert_eq!(err.to_string(), "Key schema org.radarcns.Nope for topic t not found.");
}
