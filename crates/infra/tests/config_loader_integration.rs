//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use chainview_domain::{ChainViewError, ConfigWarning, StateStoreBackend};
use chainview_infra::config;
use tempfile::{Builder, NamedTempFile};

fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .prefix("chainview")
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

/// Validates loading a complete TOML file.
///
/// # Test Steps
/// 1. Write every section to a `.toml` file
/// 2. Load it through the explicit-path entry point
/// 3. Verify each section and that validation finds nothing to warn about
#[test]
fn test_load_config_from_toml_file() {
    let file = write_config(
        ".toml",
        r#"
[oauth]
client_id = "chainview"
client_secret = "s3cret"
redirect_uri = "http://127.0.0.1:8182/callback"
authorization_endpoint = "https://auth.example.com/authorize"
token_endpoint = "https://auth.example.com/token"
scope = "read"
request_timeout_secs = 15
refresh_leeway_secs = 120

[storage]
backend = "file"
path = "/tmp/chainview-integration/state.json"

[callback]
timeout_secs = 90
open_browser = false
"#,
    );

    let config = config::load(Some(file.path().to_path_buf())).expect("valid TOML config");

    assert_eq!(config.oauth.client_id, "chainview");
    assert_eq!(config.oauth.client_secret, "s3cret");
    assert_eq!(config.oauth.request_timeout_secs, 15);
    assert_eq!(config.oauth.refresh_leeway_secs, 120);
    assert_eq!(config.storage.backend, StateStoreBackend::File);
    assert_eq!(
        config.storage.path.as_deref(),
        Some(std::path::Path::new("/tmp/chainview-integration/state.json"))
    );
    assert_eq!(config.callback.timeout_secs, 90);
    assert!(!config.callback.open_browser);
    assert!(config.validate().is_empty());
}

/// Validates loading a minimal JSON file with defaults filled in.
///
/// # Test Steps
/// 1. Write only the endpoints to a `.json` file
/// 2. Load it
/// 3. Verify defaults and the warnings for missing client credentials
#[test]
fn test_load_config_from_json_file() {
    let file = write_config(
        ".json",
        r#"{
            "oauth": {
                "redirect_uri": "http://127.0.0.1:8182/callback",
                "authorization_endpoint": "https://auth.example.com/authorize",
                "token_endpoint": "https://auth.example.com/token",
                "scope": "read"
            },
            "storage": { "backend": "keychain" }
        }"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("valid JSON");

    assert_eq!(config.storage.backend, StateStoreBackend::Keychain);
    assert_eq!(config.oauth.request_timeout_secs, 30);
    assert!(config.callback.open_browser);

    let warnings = config.validate();
    assert!(warnings.iter().any(|w| matches!(w, ConfigWarning::MissingClientId)));
}

/// Validates that malformed files are reported as configuration errors.
///
/// # Test Steps
/// 1. Write invalid TOML and a JSON file missing the `oauth` section
/// 2. Verify both fail with `ChainViewError::Config`
#[test]
fn test_invalid_files_are_config_errors() {
    let broken = write_config(".toml", "[oauth\nclient_id = ");
    let result = config::load_from_file(Some(broken.path().to_path_buf()));
    assert!(matches!(result, Err(ChainViewError::Config(_))));

    let incomplete = write_config(".json", r#"{ "storage": { "backend": "memory" } }"#);
    let result = config::load_from_file(Some(incomplete.path().to_path_buf()));
    assert!(matches!(result, Err(ChainViewError::Config(_))));
}

/// Validates that an explicit path that does not exist is not silently
/// replaced by another source.
///
/// # Test Steps
/// 1. Call `load` with a path that does not exist
/// 2. Verify a configuration error
#[test]
fn test_missing_explicit_path_fails() {
    let result = config::load(Some("/nonexistent/chainview.toml".into()));
    assert!(matches!(result, Err(ChainViewError::Config(_))));
}
