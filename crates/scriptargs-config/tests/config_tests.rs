//! Configuration loading and precedence tests

use pretty_assertions::assert_eq;
use rstest::rstest;
use scriptargs_config::{
    ConfigError, ConfigLoader, ModuleConfig, NumericStringPolicy, ReaderConfig, SignPolicy,
    CONFIG_FILE_NAME,
};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> PathBuf {
    let config_path = dir.join(CONFIG_FILE_NAME);
    fs::write(&config_path, content).unwrap();
    config_path
}

// ============================================================================
// Config Loading Tests
// ============================================================================

#[test]
fn test_load_from_subdirectory_finds_parent() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        r#"
[module]
name = "parent-module"
"#,
    );

    let nested = temp_dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let config = ConfigLoader::new()
        .without_env()
        .load_from_directory(&nested)
        .unwrap();

    assert_eq!(config.module_name(), "parent-module");
    assert_eq!(config.config_root(), Some(temp_dir.path()));
}

#[test]
fn test_load_from_specific_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(
        temp_dir.path(),
        r#"
[module]
name = "specific"
author = "Someone"

[reader]
numeric_strings = "error"
"#,
    );

    let config = ConfigLoader::new().without_env().load_from_file(&path).unwrap();

    assert_eq!(config.module_author(), "Someone");
    assert_eq!(config.reader.numeric_strings, NumericStringPolicy::Error);
    assert_eq!(config.reader.negative_unsigned, SignPolicy::Warn);
}

#[test]
fn test_missing_file_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let err = ModuleConfig::load_from_file(&temp_dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn test_invalid_toml_reports_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[module\nname = ");

    let err = ConfigLoader::new().without_env().load_from_file(&path).unwrap_err();
    match err {
        ConfigError::TomlParseError { file, .. } => assert_eq!(file, path),
        other => panic!("Expected TomlParseError, got {:?}", other),
    }
}

#[rstest]
#[case::empty_name("[module]\nname = \"\"\n")]
#[case::bad_version("[module]\nname = \"kv\"\nversion = \"v1\"\n")]
#[case::unknown_reader_key("[reader]\nverbose = true\n")]
#[case::unknown_policy("[reader]\nnegative_unsigned = \"panic\"\n")]
fn test_invalid_configs_rejected(#[case] content: &str) {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), content);

    assert!(ConfigLoader::new().without_env().load_from_file(&path).is_err());
}

#[test]
fn test_invalid_value_message() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[module]\nname = \"kv\"\nversion = \"x\"\n");

    let err = ConfigLoader::new().without_env().load_from_file(&path).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"Invalid value for 'module.version': expected dotted numeric version, got 'x'"
    );
}

// ============================================================================
// Environment Override Tests
// ============================================================================

#[test]
#[serial]
fn test_env_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        r#"
[reader]
numeric_strings = "warn"
negative_unsigned = "warn"
"#,
    );

    env::set_var("SCRIPTARGS_NUMERIC_STRINGS", "error");
    env::set_var("SCRIPTARGS_NEGATIVE_UNSIGNED", "ignore");
    let config = ConfigLoader::new().load_from_directory(temp_dir.path());
    env::remove_var("SCRIPTARGS_NUMERIC_STRINGS");
    env::remove_var("SCRIPTARGS_NEGATIVE_UNSIGNED");

    let config = config.unwrap();
    assert_eq!(
        config.reader,
        ReaderConfig {
            numeric_strings: NumericStringPolicy::Error,
            negative_unsigned: SignPolicy::Ignore,
            check_trailing: false,
        }
    );
}

#[test]
#[serial]
fn test_without_env_ignores_overrides() {
    let temp_dir = TempDir::new().unwrap();

    env::set_var("SCRIPTARGS_CHECK_TRAILING", "true");
    let config = ConfigLoader::new().without_env().load_from_directory(temp_dir.path());
    env::remove_var("SCRIPTARGS_CHECK_TRAILING");

    assert!(!config.unwrap().reader.check_trailing);
}
