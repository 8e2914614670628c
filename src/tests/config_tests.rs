//! Tests for the configuration module.
//!
//! This module contains tests for configuration loading, validation, and usage.

use crate::config::{
    get_global_config, init_global_config, ConfigLoader, LogConfig, MauiConfig, TreeSettings,
    Validate,
};
use crate::data_structures::maui_radix_tree::{RadixTreeMap, ValueStorageKind};
use crate::error::config::ConfigError;
use crate::tests::TestFixture;
use test_case::test_case;

/// Test that default configuration can be created and is valid.
#[test]
fn test_default_config_is_valid() {
    let config = MauiConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.tree.terminal_marker, '\u{0}');
    assert_eq!(config.tree.max_key_length, 32_767);
    assert_eq!(config.tree.value_storage, ValueStorageKind::Single);
}

/// Test that configuration validation catches invalid values.
#[test_case(0 => false ; "zero key length")]
#[test_case(1 => true ; "shortest key length")]
#[test_case(u32::MAX as usize => true ; "widest label offset")]
fn test_max_key_length_validation(max_key_length: usize) -> bool {
    let settings = TreeSettings {
        max_key_length,
        ..TreeSettings::default()
    };
    settings.validate().is_ok()
}

/// Test that unknown log levels are rejected.
#[test]
fn test_log_level_validation() {
    let mut config = MauiConfig::default();
    config.log.level = "verbose".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError(_))
    ));
}

/// Test loading configuration from a file.
#[test]
fn test_load_config_from_file() {
    let fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .create_file(
            "config_file_test.toml",
            r#"
            [tree]
            value_storage = "multi"
            terminal_marker = "$"

            [log]
            level = "debug"
            "#,
        )
        .unwrap();

    let config = ConfigLoader::new(Some(&config_path), "TEST_FILE").load().unwrap();

    assert_eq!(config.tree.value_storage, ValueStorageKind::Multi);
    assert_eq!(config.tree.terminal_marker, '$');
    assert_eq!(config.log.level, "debug");

    // Other values should be defaults
    assert_eq!(config.tree.max_key_length, 32_767);
    assert!(config.log.source_location);
}

/// Test loading configuration from a JSON file.
#[test]
fn test_load_json_config() {
    let fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .create_file("config.json", r#"{ "tree": { "max_key_length": 128 } }"#)
        .unwrap();

    let config = ConfigLoader::new(Some(&config_path), "TEST_JSON").load().unwrap();
    assert_eq!(config.tree.max_key_length, 128);
}

/// Test loading configuration with environment variable overrides.
#[test]
fn test_env_var_override() {
    let mut fixture = TestFixture::new().unwrap();
    let config_path = fixture
        .create_file("config_env_test.toml", "[tree]\nmax_key_length = 64\n")
        .unwrap();

    fixture.set_env("TEST_ENV__TREE__VALUE_STORAGE", "multi");
    fixture.set_env("TEST_ENV__LOG__LEVEL", "warn");

    let config = ConfigLoader::new(Some(&config_path), "TEST_ENV").load().unwrap();

    assert_eq!(config.tree.value_storage, ValueStorageKind::Multi);
    assert_eq!(config.log.level, "warn");
    assert_eq!(config.tree.max_key_length, 64);
}

/// Test that invalid files and values are rejected.
#[test]
fn test_load_invalid_config() {
    let fixture = TestFixture::new().unwrap();

    let broken = fixture.create_file("invalid.toml", "[tree\nmax_key_length = ").unwrap();
    assert!(matches!(
        ConfigLoader::new(Some(&broken), "TEST_INVALID").load(),
        Err(ConfigError::ParseError(_))
    ));

    let out_of_range = fixture
        .create_file("range.toml", "[tree]\nmax_key_length = 0\n")
        .unwrap();
    assert!(matches!(
        ConfigLoader::new(Some(&out_of_range), "TEST_INVALID").load(),
        Err(ConfigError::ValueOutOfRange { .. })
    ));

    let unknown_storage = fixture
        .create_file("storage.toml", "[tree]\nvalue_storage = \"many\"\n")
        .unwrap();
    assert!(ConfigLoader::new(Some(&unknown_storage), "TEST_INVALID")
        .load()
        .is_err());
}

/// Test that missing files and unknown formats are reported.
#[test]
fn test_missing_and_unsupported_files() {
    let fixture = TestFixture::new().unwrap();

    let missing = fixture.temp_dir.path().join("absent.toml");
    assert!(matches!(
        ConfigLoader::new(Some(&missing), "TEST_MISSING").load(),
        Err(ConfigError::FileNotFound(_))
    ));

    let ini = fixture.create_file("config.ini", "[tree]\n").unwrap();
    assert!(matches!(
        ConfigLoader::new(Some(&ini), "TEST_MISSING").load(),
        Err(ConfigError::ParseError(_))
    ));
}

/// Test that a rendered configuration loads back to the same values.
#[test]
fn test_toml_rendering_loads_back() {
    let config = MauiConfig {
        tree: TreeSettings {
            value_storage: ValueStorageKind::Multi,
            terminal_marker: '#',
            max_key_length: 1024,
        },
        log: LogConfig {
            level: "trace".to_string(),
            json: true,
            source_location: false,
        },
    };

    let rendered = config.to_toml_string().unwrap();
    assert!(rendered.contains("value_storage = \"multi\""));

    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_file("rendered.toml", rendered).unwrap();
    let loaded = ConfigLoader::new(Some(&path), "TEST_RENDERED").load().unwrap();
    assert_eq!(loaded, config);
}

/// Test that facades pick up the global configuration.
#[test]
fn test_global_config_drives_facade() {
    let config = MauiConfig {
        tree: TreeSettings {
            value_storage: ValueStorageKind::Multi,
            ..TreeSettings::default()
        },
        ..MauiConfig::default()
    };
    init_global_config(config);

    // Only the first initialization in this process wins
    let global = get_global_config().unwrap();
    let mut map = RadixTreeMap::from_global_config();
    map.insert("k", 1u32).unwrap();
    map.insert("k", 2).unwrap();

    let expected = match global.get().tree.value_storage {
        ValueStorageKind::Multi => 2,
        ValueStorageKind::Single => 1,
    };
    assert_eq!(map.value_count(), expected);
}
