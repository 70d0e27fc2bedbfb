// Unit tests for config load/save/validate.

use crate::config::{ClientConfig, ReconnectConfig, ServerConfig};
use crate::error::config::ConfigError;

use std::time::Duration;

/// **VALUE**: Verifies a missing config file loads as defaults instead of an
/// error.
///
/// **WHY THIS MATTERS**: First run has no file; treating that as fatal would
/// make the client unusable until someone hand-writes JSON.
///
/// **BUG THIS CATCHES**: Would catch a load path that requires the file to
/// exist.
#[test]
fn given_missing_config_file_when_loaded_then_defaults_returned() {
    // GIVEN: An empty directory
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    // WHEN: Loading config
    let config = ClientConfig::load(dir.path()).expect("Load should fall back to defaults");

    // THEN: Defaults, not an error
    assert_eq!(config.version, 1);
    assert!(config.server.address.is_none());
    assert!(!config.server.auto_reconnect);
    assert_eq!(config.reconnect_delay(), Duration::from_secs(10));
    assert!(config.max_elapsed().is_none());
}

/// **VALUE**: Verifies save → load round-trips every field.
///
/// **BUG THIS CATCHES**: Would catch a field missing a serde attribute or a
/// save that writes to the wrong path.
#[test]
fn given_saved_config_when_loaded_then_fields_survive() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = ClientConfig {
        version: 1,
        server: ServerConfig {
            address: Some("wss://example.test:9001/rpc".to_string()),
            auto_reconnect: true,
        },
        reconnect: ReconnectConfig {
            delay_secs: 3,
            max_elapsed_secs: Some(120),
        },
    };

    config.save(dir.path()).expect("Save should succeed");
    let loaded = ClientConfig::load(dir.path()).expect("Load should succeed");

    assert_eq!(
        loaded.server.address.as_deref(),
        Some("wss://example.test:9001/rpc")
    );
    assert!(loaded.server.auto_reconnect);
    assert_eq!(loaded.reconnect_delay(), Duration::from_secs(3));
    assert_eq!(loaded.max_elapsed(), Some(Duration::from_secs(120)));
}

/// **VALUE**: Verifies a corrupted config file is an error, not silent
/// defaults.
///
/// **WHY THIS MATTERS**: Falling back to defaults on parse failure would
/// quietly discard a user's configured server address.
#[test]
fn given_corrupted_config_file_when_loaded_then_parse_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("client.json"), "{ not json").expect("Failed to write file");

    assert!(matches!(
        ClientConfig::load(dir.path()),
        Err(ConfigError::Parse { .. })
    ));
}

/// **VALUE**: Verifies partial config files pick up defaults for omitted
/// fields.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` turning a
/// minimal hand-written config into a parse error.
#[test]
fn given_partial_config_file_when_loaded_then_missing_fields_default() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("client.json"),
        r#"{"server": {"address": "ws://127.0.0.1:9001"}}"#,
    )
    .expect("Failed to write file");

    let config = ClientConfig::load(dir.path()).expect("Load should succeed");

    assert_eq!(config.version, 1);
    assert_eq!(config.server.address.as_deref(), Some("ws://127.0.0.1:9001"));
    assert!(!config.server.auto_reconnect);
    assert_eq!(config.reconnect_delay(), Duration::from_secs(10));
}

/// **VALUE**: Verifies each validation rule rejects its bad value.
#[test]
fn given_invalid_values_when_validated_then_validation_errors() {
    let mut bad_version = ClientConfig::default();
    bad_version.version = 0;
    assert!(matches!(
        bad_version.validate(),
        Err(ConfigError::Validation { .. })
    ));

    let mut bad_delay = ClientConfig::default();
    bad_delay.reconnect.delay_secs = 0;
    assert!(matches!(
        bad_delay.validate(),
        Err(ConfigError::Validation { .. })
    ));

    let mut bad_scheme = ClientConfig::default();
    bad_scheme.server.address = Some("http://example.test".to_string());
    assert!(matches!(
        bad_scheme.validate(),
        Err(ConfigError::Validation { .. })
    ));

    let mut not_a_url = ClientConfig::default();
    not_a_url.server.address = Some("not a url".to_string());
    assert!(matches!(
        not_a_url.validate(),
        Err(ConfigError::Validation { .. })
    ));
}

/// **VALUE**: Verifies save refuses to persist an invalid config.
///
/// **WHY THIS MATTERS**: An invalid file on disk fails every subsequent load;
/// rejecting at save keeps the stored config always loadable.
#[test]
fn given_invalid_config_when_saved_then_nothing_written() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut config = ClientConfig::default();
    config.reconnect.delay_secs = 0;

    assert!(config.save(dir.path()).is_err());
    assert!(
        !dir.path().join("client.json").exists(),
        "Invalid config must not reach disk"
    );
}
