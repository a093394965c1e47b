// crates/sensor-schemas-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Path resolution, size limits and encoding checks on load.
// Purpose: Ensure configuration loading fails closed on hostile inputs.
// Dependencies: sensor-schemas-config, tempfile
// ============================================================================
//! ## Overview
//! Loading resolves the path from the argument, then `SENSOR_SCHEMAS_CONFIG`,
//! then falls back to defaults. Limits are enforced before parsing.

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

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;

use sensor_schemas_config::ConfigError;
use sensor_schemas_config::ExcludeConfig;
use sensor_schemas_config::ToolConfig;

const CONFIG_ENV_VAR: &str = "SENSOR_SCHEMAS_CONFIG";

mod env_mut {
    #![allow(unsafe_code, reason = "Tests mutate process env vars in a controlled scope.")]

    /// Sets an environment variable for the current process.
    pub fn set_var(key: &str, value: &str) {
        // SAFETY: Tests serialize environment mutation via a global lock.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    /// Removes an environment variable from the current process.
    pub fn remove_var(key: &str) {
        // SAFETY: Tests serialize environment mutation via a global lock.
        unsafe {
            std::env::remove_var(key);
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().expect("env lock poisoned")
}

struct EnvGuard {
    previous: Option<String>,
}

impl EnvGuard {
    fn new() -> Self {
        Self {
            previous: std::env::var(CONFIG_ENV_VAR).ok(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => env_mut::set_var(CONFIG_ENV_VAR, &value),
            None => env_mut::remove_var(CONFIG_ENV_VAR),
        }
    }
}

fn assert_invalid(result: Result<ToolConfig, ConfigError>, needle: &str) {
    match result {
        Err(ConfigError::Invalid(message)) => assert!(message.contains(needle), "{message}"),
        other => panic!("expected invalid config containing {needle}, got {other:?}"),
    }
}

#[test]
fn missing_path_and_env_yield_defaults() {
    let _lock = env_lock();
    let _guard = EnvGuard::new();
    env_mut::remove_var(CONFIG_ENV_VAR);
    let config = ToolConfig::load(None).expect("defaults");
    assert_eq!(config, ToolConfig::default());
    assert!(config.schemas.path_filter().expect("filter").is_unrestricted());
}

#[test]
fn env_var_supplies_the_path() {
    let _lock = env_lock();
    let _guard = EnvGuard::new();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tool.yml");
    fs::write(&path, "topics:\n  extra_topic:\n    partitions: 1\n").expect("write");
    env_mut::set_var(CONFIG_ENV_VAR, &path.display().to_string());
    let config = ToolConfig::load(None).expect("env config");
    assert_eq!(config.topics["extra_topic"].partitions, Some(1));

    env_mut::set_var(CONFIG_ENV_VAR, &"a".repeat(4097));
    assert_invalid(ToolConfig::load(None), "config path exceeds max length");
}

#[test]
fn path_limits_are_enforced() {
    let long = PathBuf::from("a".repeat(4097));
    assert_invalid(ToolConfig::load(Some(long.as_path())), "config path exceeds max length");
    let component = PathBuf::from(format!("dir/{}.yml", "c".repeat(256)));
    assert_invalid(ToolConfig::load(Some(component.as_path())), "config path component too long");
}

#[test]
fn oversized_and_non_utf8_files_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let large = dir.path().join("large.yml");
    fs::write(&large, vec![b'#'; 1024 * 1024 + 1]).expect("write");
    assert_invalid(ToolConfig::load(Some(large.as_path())), "config file exceeds size limit");

    let binary = dir.path().join("binary.yml");
    fs::write(&binary, [0xff, 0xfe, 0x00]).expect("write");
    assert_invalid(ToolConfig::load(Some(binary.as_path())), "config file must be utf-8");
    assert!(matches!(ExcludeConfig::load(&binary), Err(ConfigError::Invalid(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.yml");
    assert!(matches!(ToolConfig::load(Some(missing.as_path())), Err(ConfigError::Io(_))));
    assert!(matches!(ExcludeConfig::load(&missing), Err(ConfigError::Io(_))));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tool.yml");
    fs::write(&path, "topics: [unclosed\n").expect("write");
    assert!(matches!(ToolConfig::load(Some(path.as_path())), Err(ConfigError::Parse(_))));
    fs::write(&path, "unknown_section: {}\n").expect("write");
    assert!(matches!(ToolConfig::load(Some(path.as_path())), Err(ConfigError::Parse(_))));
}
