// crates/sensor-schemas-core/tests/engine.rs
// ============================================================================
// Module: Validation Engine Tests
// Description: Location rules and whole-repository validation drivers.
// Purpose: Validate file-level and catalogue-level reports.
// Dependencies: sensor-schemas-core, tempfile
// ============================================================================
//! ## Overview
//! A consistent sample repository validates cleanly; misplaced, misnamed or
//! unparsable schemas yield one violation per problem.

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
use std::sync::Arc;

use common::write;
use sensor_schemas_core::COMMONS_PATH;
use sensor_schemas_core::NoExemptions;
use sensor_schemas_core::SchemaResolver;
use sensor_schemas_core::SchemaValidator;
use sensor_schemas_core::Scope;
use sensor_schemas_core::SourceCatalogue;
use sensor_schemas_core::ValidationExemptions;
use sensor_schemas_core::format_violations;
use sensor_schemas_core::runtime::engine::expected_namespace;
use sensor_schemas_core::runtime::engine::expected_record_name;

fn validator(root: &Path) -> SchemaValidator {
    SchemaValidator::new(root.join(COMMONS_PATH), Arc::new(NoExemptions)).expect("validator")
}

#[test]
fn expected_location_follows_directories() {
    let root = Path::new("/repo/commons");
    let path = root.join("passive/phone/phone_battery_level.avsc");
    assert_eq!(
        expected_namespace(root, &path, Scope::Passive).as_deref(),
        Ok("org.radarcns.passive.phone")
    );
    assert_eq!(expected_record_name(&path), "PhoneBatteryLevel");

    let outside = Path::new("/elsewhere/x.avsc");
    let err = expected_namespace(root, outside, Scope::Passive).expect_err("outside root");
    assert_eq!(err, "Path /elsewhere/x.avsc is not part of root /repo/commons");
}

#[test]
fn consistent_repository_has_no_violations() {
    let dir = common::sample_repository();
    let schemas = SchemaResolver::for_repository(dir.path()).resolve().expect("resolve");
    let violations = validator(dir.path()).analyse_files(&schemas, None);
    assert!(violations.is_empty(), "{}", format_violations(&violations));

    let catalogue = SourceCatalogue::load(dir.path(), schemas).expect("load");
    let violations = validator(dir.path()).analyse_source_catalogue(None, &catalogue);
    assert!(violations.is_empty(), "{}", format_violations(&violations));
}

#[test]
fn misplaced_schema_reports_namespace_and_name() {
    let dir = common::sample_repository();
    write(
        dir.path(),
        "commons/passive/phone/phone_light.avsc",
        r#"{"type":"record","name":"PhoneLux","namespace":"org.radarcns.passive.wrong",
            "doc":"Light.","fields":[{"name":"time","type":"double","doc":"Time."}]}"#,
    );
    let schemas = SchemaResolver::for_repository(dir.path()).resolve().expect("resolve");
    let violations = validator(dir.path()).analyse_files(&schemas, Some(Scope::Passive));
    assert_eq!(violations.len(), 2, "{}", format_violations(&violations));
    assert!(violations[0].message.starts_with("Schema org.radarcns.passive.wrong.PhoneLux at "));
    assert!(violations[0].message.contains("the expected value is \"org.radarcns.passive.phone\"."));
    assert!(violations[1].message.contains("Expected record name is \"PhoneLight\"."));
}

/// Exempts the record name check of one schema.
struct ExemptName;

impl ValidationExemptions for ExemptName {
    fn skip_record_name(&self, full_name: &str) -> bool {
        full_name == "org.radarcns.passive.phone.PhoneLux"
    }

    fn skip_field_name(&self, _full_name: &str, _field: &str) -> bool {
        false
    }

    fn skip_file(&self, relative: &Path) -> bool {
        relative.starts_with("passive/legacy")
    }
}

#[test]
fn exemptions_skip_name_checks_and_files() {
    let dir = common::sample_repository();
    write(
        dir.path(),
        "commons/passive/phone/phone_light.avsc",
        r#"{"type":"record","name":"PhoneLux","namespace":"org.radarcns.passive.phone",
            "doc":"Light.","fields":[{"name":"time","type":"double","doc":"Time."}]}"#,
    );
    write(dir.path(), "commons/passive/legacy/broken.avsc", "{");
    let schemas = SchemaResolver::for_repository(dir.path()).resolve().expect("resolve");
    assert_eq!(schemas.unresolved().len(), 1);
    let validator = SchemaValidator::new(dir.path().join(COMMONS_PATH), Arc::new(ExemptName))
        .expect("validator");
    let violations = validator.analyse_files(&schemas, None);
    assert!(violations.is_empty(), "{}", format_violations(&violations));
}

#[test]
fn unparsable_files_are_reported() {
    let dir = common::sample_repository();
    write(dir.path(), "commons/active/broken.avsc", "{ not json");
    let schemas = SchemaResolver::for_repository(dir.path()).resolve().expect("resolve");
    let validator = validator(dir.path());
    let violations = validator.analyse_files(&schemas, Some(Scope::Active));
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.starts_with("Cannot parse schema "));
    assert!(violations[0].message.contains("broken.avsc: "));
    assert!(validator.analyse_files(&schemas, Some(Scope::Monitor)).is_empty());
}

#[test]
fn catalogue_analysis_applies_scope_rules() {
    let dir = common::sample_repository();
    write(
        dir.path(),
        "commons/monitor/application/application_uptime.avsc",
        r#"{"type":"record","name":"ApplicationUptime","namespace":"org.radarcns.monitor.application",
            "doc":"Uptime of the application.","fields":[
              {"name":"uptime","type":"double","doc":"Time since the application started (s)."}
            ]}"#,
    );
    write(
        dir.path(),
        "specifications/active/survey.yml",
        "name: survey\n\
         data:\n\
         \x20 - topic: questionnaire_survey\n\
         \x20   value_schema: .active.questionnaire.Questionnaire\n",
    );
    let schemas = SchemaResolver::for_repository(dir.path()).resolve().expect("resolve");
    let catalogue = SourceCatalogue::load(dir.path(), schemas).expect("load");
    let validator = validator(dir.path());

    let violations = validator.analyse_source_catalogue(None, &catalogue);
    assert_eq!(violations.len(), 2, "{}", format_violations(&violations));
    assert_eq!(
        violations[0].message,
        "Value schema org.radarcns.active.questionnaire.Questionnaire for topic \
         questionnaire_survey not found."
    );
    assert!(violations[1].message.contains("must have a \"time\" field"));

    let passive_only = validator.analyse_source_catalogue(Some(Scope::Passive), &catalogue);
    assert!(passive_only.is_empty(), "{}", format_violations(&passive_only));

    let active_only = validator.analyse_source_catalogue(Some(Scope::Active), &catalogue);
    assert_eq!(active_only, vec![violations[0].clone()]);

    let monitor_only = validator.analyse_source_catalogue(Some(Scope::Monitor), &catalogue);
    assert_eq!(monitor_only.len(), 1, "{}", format_violations(&monitor_only));
    assert!(monitor_only[0].message.contains("must have a \"time\" field"));
}
