// crates/sensor-schemas-core/tests/registration.rs
// ============================================================================
// Module: Registration Tests
// Description: Topic planning, topic creation and schema registration.
// Purpose: Validate registration against in-memory admin and registry.
// Dependencies: sensor-schemas-core, tempfile
// ============================================================================
//! ## Overview
//! Plans topics from the sample catalogue with configured overrides, creates
//! only missing topics, and registers key and value subjects.

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

use std::collections::BTreeMap;

use sensor_schemas_core::InMemorySchemaRegistry;
use sensor_schemas_core::InMemoryTopicAdmin;
use sensor_schemas_core::RegistrationError;
use sensor_schemas_core::SchemaRegistrar;
use sensor_schemas_core::SchemaRegistry;
use sensor_schemas_core::SchemaResolver;
use sensor_schemas_core::SourceCatalogue;
use sensor_schemas_core::TopicAdmin;
use sensor_schemas_core::TopicConfig;
use sensor_schemas_core::TopicDefaults;
use sensor_schemas_core::TopicRegistrar;

fn catalogue() -> (tempfile::TempDir, SourceCatalogue) {
    let dir = common::sample_repository();
    let schemas = SchemaResolver::for_repository(dir.path()).resolve().expect("resolve");
    let catalogue = SourceCatalogue::load(dir.path(), schemas).expect("load");
    (dir, catalogue)
}

#[test]
fn plan_applies_defaults_overrides_and_extra_topics() {
    let (_dir, catalogue) = catalogue();
    let mut topics = BTreeMap::new();
    topics.insert(
        "application_uptime".to_string(),
        TopicConfig {
            partitions: Some(1),
            properties: BTreeMap::from([("cleanup.policy".to_string(), "compact".to_string())]),
            ..TopicConfig::default()
        },
    );
    topics.insert("android_phone_battery_level_1week".to_string(), TopicConfig {
        enabled: false,
        ..TopicConfig::default()
    });
    topics.insert("extra_topic".to_string(), TopicConfig::default());

    let plan = TopicRegistrar::plan(&catalogue, &topics, TopicDefaults::default(), None)
        .expect("plan");
    assert_eq!(plan.len(), 16);
    assert!(plan.iter().all(|topic| topic.name != "android_phone_battery_level_1week"));
    let uptime = plan.iter().find(|topic| topic.name == "application_uptime").expect("uptime");
    assert_eq!(uptime.partitions, 1);
    assert_eq!(uptime.replication_factor, 3);
    assert_eq!(uptime.properties.get("cleanup.policy").map(String::as_str), Some("compact"));
    let extra = plan.iter().find(|topic| topic.name == "extra_topic").expect("extra");
    assert_eq!(extra.partitions, 3);
}

#[test]
fn plan_filter_selects_exact_name_or_pattern() {
    let (_dir, catalogue) = catalogue();
    let topics = BTreeMap::new();
    let defaults = TopicDefaults::default();

    let exact =
        TopicRegistrar::plan(&catalogue, &topics, defaults, Some("android_phone_battery_level"))
            .expect("exact");
    assert_eq!(exact.len(), 1);

    let filter = "^android_phone_battery_level_1(hour|day)$";
    let pattern =
        TopicRegistrar::plan(&catalogue, &topics, defaults, Some(filter)).expect("pattern");
    let names: Vec<&str> = pattern.iter().map(|topic| topic.name.as_str()).collect();
    assert_eq!(names, vec!["android_phone_battery_level_1day", "android_phone_battery_level_1hour"]);

    let none = TopicRegistrar::plan(&catalogue, &topics, defaults, Some("^nothing$"));
    assert_eq!(none, Err(RegistrationError::NoMatch("^nothing$".to_string())));
    let invalid = TopicRegistrar::plan(&catalogue, &topics, defaults, Some("("));
    assert!(matches!(invalid, Err(RegistrationError::Pattern(_))));
}

#[test]
fn create_missing_skips_existing_topics() {
    let (_dir, catalogue) = catalogue();
    let plan = TopicRegistrar::plan(
        &catalogue,
        &BTreeMap::new(),
        TopicDefaults::default(),
        Some("^(application_uptime|android_phone_battery_level)$"),
    )
    .expect("plan");
    let admin = InMemoryTopicAdmin::with_existing(["application_uptime"]);
    let created = TopicRegistrar::create_missing(&admin, &plan).expect("create");
    assert_eq!(created, vec!["android_phone_battery_level".to_string()]);
    assert_eq!(admin.list_topics().expect("list").len(), 2);

    let again = TopicRegistrar::create_missing(&admin, &plan).expect("create again");
    assert!(again.is_empty());

    let direct = admin.create_topics(&plan);
    assert!(direct.is_err());
}

#[test]
fn catalogue_schemas_register_under_key_and_value_subjects() {
    let (_dir, catalogue) = catalogue();
    let registry = InMemorySchemaRegistry::new();
    let mut topics = BTreeMap::new();
    topics.insert("phone_battery_copy".to_string(), TopicConfig {
        key_schema: Some(".kafka.ObservationKey".to_string()),
        value_schema: Some(".passive.phone.PhoneBatteryLevel".to_string()),
        ..TopicConfig::default()
    });
    topics.insert("unregistered".to_string(), TopicConfig {
        key_schema: Some(".kafka.ObservationKey".to_string()),
        value_schema: Some(".passive.phone.PhoneBatteryLevel".to_string()),
        register_schema: false,
        ..TopicConfig::default()
    });

    let report =
        SchemaRegistrar::register_catalogue(&registry, &catalogue, &topics).expect("register");
    assert!(report.is_success());
    assert_eq!(
        registry.subjects().expect("subjects"),
        vec![
            "android_phone_battery_level-key".to_string(),
            "android_phone_battery_level-value".to_string(),
            "application_uptime-key".to_string(),
            "application_uptime-value".to_string(),
            "phone_battery_copy-key".to_string(),
            "phone_battery_copy-value".to_string(),
        ]
    );
    let value = registry.latest("application_uptime-value").expect("latest").expect("schema");
    assert_eq!(value.full_name(), "org.radarcns.monitor.application.ApplicationUptime");

    let key = registry.latest("application_uptime-key").expect("latest").expect("schema");
    let id = registry.register("application_uptime-key", &key).expect("re-register");
    assert_eq!(report.registered.get("application_uptime-key"), Some(&id));
}

#[test]
fn configured_topic_with_unknown_schema_fails() {
    let (_dir, catalogue) = catalogue();
    let mut topics = BTreeMap::new();
    topics.insert("orphan".to_string(), TopicConfig {
        key_schema: Some(".kafka.ObservationKey".to_string()),
        value_schema: Some(".passive.Missing".to_string()),
        ..TopicConfig::default()
    });
    let registry = InMemorySchemaRegistry::new();
    let err = SchemaRegistrar::register_catalogue(&registry, &catalogue, &topics)
        .expect_err("missing schema");
    assert_eq!(
        err,
        RegistrationError::Catalogue(
            "Value schema org.radarcns.passive.Missing for topic orphan not found.".to_string()
        )
    );
}
