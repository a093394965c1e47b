// crates/sensor-schemas-core/tests/common/mod.rs
// ============================================================================
// Module: Test Fixtures
// Description: Shared schema texts and repository tree builders.
// Purpose: Keep integration tests focused on behavior rather than setup.
// Dependencies: tempfile
// ============================================================================

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared fixtures are used selectively by individual test binaries."
)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, contents).expect("write file");
}

/// Creates an empty repository directory.
pub fn repository() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

/// Observation key schema.
pub const OBSERVATION_KEY: &str = r#"{
  "namespace": "org.radarcns.kafka",
  "type": "record",
  "name": "ObservationKey",
  "doc": "Key of an observation.",
  "fields": [
    {"name": "projectId", "type": ["null", "string"], "doc": "Project identifier.", "default": null},
    {"name": "userId", "type": "string", "doc": "User identifier."},
    {"name": "sourceId", "type": "string", "doc": "Source identifier."}
  ]
}"#;

/// Battery state enum in the catalogue scope.
pub const BATTERY_STATE: &str = r#"{
  "namespace": "org.radarcns.catalogue",
  "type": "enum",
  "name": "BatteryState",
  "doc": "State of the battery.",
  "symbols": ["CHARGING", "DISCHARGING", "UNKNOWN"]
}"#;

/// Passive battery level record referencing the battery state enum.
pub const BATTERY_LEVEL: &str = r#"{
  "namespace": "org.radarcns.passive.phone",
  "type": "record",
  "name": "PhoneBatteryLevel",
  "doc": "Battery level of a phone.",
  "fields": [
    {"name": "time", "type": "double", "doc": "Device timestamp in UTC (s)."},
    {"name": "timeReceived", "type": "double", "doc": "Device receiver timestamp in UTC (s)."},
    {"name": "batteryLevel", "type": "float", "doc": "Battery level from 0 to 1."},
    {"name": "state", "type": "org.radarcns.catalogue.BatteryState", "doc": "Charging state.", "default": "UNKNOWN"}
  ]
}"#;

/// Monitor record with only the `time` field.
pub const MONITOR_STATUS: &str = r#"{
  "namespace": "org.radarcns.monitor.application",
  "type": "record",
  "name": "ApplicationUptime",
  "doc": "Uptime of the application.",
  "fields": [
    {"name": "time", "type": "double", "doc": "Device timestamp in UTC (s)."},
    {"name": "uptime", "type": "double", "doc": "Time since the application started (s)."}
  ]
}"#;

/// Writes a small consistent repository with schemas and one passive source.
pub fn sample_repository() -> TempDir {
    let dir = repository();
    let root = dir.path();
    write(root, "commons/kafka/observation_key.avsc", OBSERVATION_KEY);
    write(root, "commons/catalogue/battery_state.avsc", BATTERY_STATE);
    write(root, "commons/passive/phone/phone_battery_level.avsc", BATTERY_LEVEL);
    write(root, "commons/monitor/application/application_uptime.avsc", MONITOR_STATUS);
    write(
        root,
        "specifications/passive/phone.yml",
        "vendor: android\n\
         model: phone\n\
         doc: Phone sensors.\n\
         data:\n\
         \x20 - type: BATTERY\n\
         \x20   topic: android_phone_battery_level\n\
         \x20   value_schema: .passive.phone.PhoneBatteryLevel\n\
         \x20   aggregator: org.radarcns.kafka.aggregator.AggregatorDouble\n",
    );
    write(
        root,
        "specifications/monitor/application.yml",
        "name: application\n\
         doc: Application monitoring.\n\
         data:\n\
         \x20 - topic: application_uptime\n\
         \x20   value_schema: .monitor.application.ApplicationUptime\n",
    );
    dir
}
