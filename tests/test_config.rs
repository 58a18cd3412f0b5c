//! Tests for the configuration management module

use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wrapi::config::{ClientConfig, ConfigPaths, DEFAULT_API_URL, RunConfig, WrapiConfig, mask_token};

// ============== Default Value Tests ==============

#[rstest]
fn test_client_config_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert!(config.api_token.is_none());
    assert_eq!(config.format, "table");
    assert_eq!(config.log_level, "info");
}

#[rstest]
fn test_run_config_defaults() {
    let config = RunConfig::default();
    assert_eq!(config.poll_interval, 15);
    assert_eq!(config.timeout, 600);
    assert!(config.download_dir.is_none());
}

#[rstest]
fn test_wrapi_config_defaults() {
    let config = WrapiConfig::default();
    assert_eq!(config.client.api_url, DEFAULT_API_URL);
    assert_eq!(config.run.timeout, 600);
}

// ============== Config Paths Tests ==============

#[rstest]
fn test_config_paths_new() {
    let paths = ConfigPaths::new();
    assert_eq!(paths.system, PathBuf::from("/etc/wrapi/config.toml"));
    assert!(paths.user.is_some());
    assert_eq!(paths.local, PathBuf::from("wrapi.toml"));
}

#[rstest]
fn test_config_paths_existing_paths_empty() {
    let paths = ConfigPaths {
        system: PathBuf::from("/nonexistent/system/config.toml"),
        user: Some(PathBuf::from("/nonexistent/user/config.toml")),
        local: PathBuf::from("/nonexistent/local/wrapi.toml"),
    };
    assert!(paths.existing_paths().is_empty());
}

#[rstest]
fn test_config_paths_user_config_dir() {
    let paths = ConfigPaths::new();
    if let Some(user_path) = &paths.user {
        let user_dir = paths.user_config_dir();
        assert!(user_dir.is_some());
        assert_eq!(user_dir.unwrap(), user_path.parent().unwrap());
    }
}

#[rstest]
fn test_existing_paths_with_actual_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[client]\napi_url = \"http://test\"").unwrap();

    let paths = ConfigPaths {
        system: PathBuf::from("/nonexistent"),
        user: Some(config_path.clone()),
        local: PathBuf::from("/nonexistent"),
    };

    let existing = paths.existing_paths();
    assert_eq!(existing.len(), 1);
    assert_eq!(existing[0], &config_path);
}

// ============== Config Loading Tests ==============

#[rstest]
fn test_load_returns_defaults_when_no_files() {
    let paths = ConfigPaths {
        system: PathBuf::from("/nonexistent/system/config.toml"),
        user: Some(PathBuf::from("/nonexistent/user/config.toml")),
        local: PathBuf::from("/nonexistent/local/wrapi.toml"),
    };
    let config = WrapiConfig::load_with_paths(&paths).unwrap();
    assert_eq!(config.client.api_url, DEFAULT_API_URL);
    assert_eq!(config.run.poll_interval, 15);
}

#[rstest]
fn test_load_from_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
[client]
api_url = "https://staging.wrm.example.com"
api_token = "secret"
format = "json"
log_level = "debug"

[run]
poll_interval = 5
timeout = 1200
download_dir = "results"
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = WrapiConfig::load_from_files(&[config_path]).unwrap();
    assert_eq!(config.client.api_url, "https://staging.wrm.example.com");
    assert_eq!(config.client.api_token.as_deref(), Some("secret"));
    assert_eq!(config.client.format, "json");
    assert_eq!(config.client.log_level, "debug");
    assert_eq!(config.run.poll_interval, 5);
    assert_eq!(config.run.timeout, 1200);
    assert_eq!(config.run.download_dir, Some(PathBuf::from("results")));
}

#[rstest]
fn test_load_partial_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[client]\napi_url = \"http://partial:8080\"\n").unwrap();

    let config = WrapiConfig::load_from_files(&[config_path]).unwrap();
    assert_eq!(config.client.api_url, "http://partial:8080");
    // Unspecified values keep their defaults
    assert_eq!(config.client.format, "table");
    assert_eq!(config.run.timeout, 600);
}

#[rstest]
fn test_load_with_priority_order() {
    let temp_dir = TempDir::new().unwrap();
    let config1_path = temp_dir.path().join("config1.toml");
    let config2_path = temp_dir.path().join("config2.toml");

    fs::write(
        &config1_path,
        "[client]\napi_url = \"http://first:8080\"\nformat = \"table\"\n",
    )
    .unwrap();
    fs::write(&config2_path, "[client]\napi_url = \"http://second:9090\"\n").unwrap();

    // Second file wins per field; untouched fields survive from the first
    let config = WrapiConfig::load_from_files(&[config1_path, config2_path]).unwrap();
    assert_eq!(config.client.api_url, "http://second:9090");
    assert_eq!(config.client.format, "table");
}

#[rstest]
fn test_empty_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("empty.toml");
    fs::write(&config_path, "").unwrap();

    let config = WrapiConfig::load_from_files(&[config_path]).unwrap();
    assert_eq!(config.client.api_url, DEFAULT_API_URL);
}

#[rstest]
fn test_nonexistent_file() {
    let config =
        WrapiConfig::load_from_files(&[PathBuf::from("/nonexistent/config.toml")]).unwrap();
    assert_eq!(config.client.api_url, DEFAULT_API_URL);
}

#[rstest]
fn test_malformed_toml_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "[client\napi_url = ").unwrap();

    assert!(WrapiConfig::load_from_files(&[config_path]).is_err());
}

// ============== Validation Tests ==============

#[rstest]
fn test_validate_valid_config() {
    let config = WrapiConfig::default();
    assert!(config.validate().is_ok());
}

#[rstest]
fn test_validate_invalid_poll_interval() {
    let mut config = WrapiConfig::default();
    config.run.poll_interval = 0;
    let errors = config.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.contains("poll_interval")));
}

#[rstest]
fn test_validate_invalid_timeout() {
    let mut config = WrapiConfig::default();
    config.run.timeout = 0;
    let errors = config.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.contains("timeout")));
}

#[rstest]
fn test_validate_empty_api_url() {
    let mut config = WrapiConfig::default();
    config.client.api_url = "  ".to_string();
    let errors = config.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.contains("api_url")));
}

#[rstest]
fn test_validate_multiple_errors() {
    let mut config = WrapiConfig::default();
    config.client.format = "invalid".to_string();
    config.run.poll_interval = 0;
    config.run.timeout = 0;
    let errors = config.validate().unwrap_err();
    assert!(errors.len() >= 3);
}

#[rstest]
#[case("table", true)]
#[case("json", true)]
#[case("TABLE", false)]
#[case("JSON", false)]
#[case("xml", false)]
#[case("", false)]
fn test_format_validation(#[case] format: &str, #[case] expected_valid: bool) {
    let mut config = WrapiConfig::default();
    config.client.format = format.to_string();
    let result = config.validate();

    if expected_valid {
        assert!(result.is_ok(), "Format '{}' should be valid", format);
    } else {
        assert!(result.is_err(), "Format '{}' should be invalid", format);
    }
}

// ============== Serialization Tests ==============

#[rstest]
fn test_generate_default_config() {
    let content = WrapiConfig::generate_default_config();
    assert!(content.contains("[client]"));
    assert!(content.contains("[run]"));
    assert!(content.contains("api_url"));
    assert!(content.contains("poll_interval"));
    // The generated file parses back into the defaults
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, content).unwrap();
    let config = WrapiConfig::load_from_files(&[config_path]).unwrap();
    assert_eq!(config.client.api_url, DEFAULT_API_URL);
    assert_eq!(config.run.poll_interval, 15);
}

#[rstest]
fn test_to_toml_serialization() {
    let config = WrapiConfig::default();
    let toml_str = config.to_toml().unwrap();
    assert!(toml_str.contains("[client]"));
    assert!(toml_str.contains("api_url"));
    assert!(toml_str.contains("[run]"));
    assert!(toml_str.contains("timeout = 600"));
}

#[rstest]
fn test_roundtrip_serialization() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let mut original = WrapiConfig::default();
    original.client.api_url = "http://test:1234".to_string();
    original.client.api_token = Some("abc".to_string());
    original.client.format = "json".to_string();
    original.run.timeout = 9999;

    fs::write(&config_path, original.to_toml().unwrap()).unwrap();
    let loaded = WrapiConfig::load_from_files(&[config_path]).unwrap();

    assert_eq!(loaded.client.api_url, original.client.api_url);
    assert_eq!(loaded.client.api_token, original.client.api_token);
    assert_eq!(loaded.client.format, original.client.format);
    assert_eq!(loaded.run.timeout, original.run.timeout);
}

#[rstest]
fn test_save_user_writes_and_reloads(#[values(true, false)] with_token: bool) {
    let temp_dir = TempDir::new().unwrap();
    let paths = ConfigPaths {
        system: PathBuf::from("/nonexistent"),
        user: Some(temp_dir.path().join("wrapi").join("config.toml")),
        local: PathBuf::from("/nonexistent"),
    };

    let mut config = WrapiConfig::default();
    if with_token {
        config.client.api_token = Some("saved-token".to_string());
    }
    let written = config.save_user(&paths).unwrap();
    assert_eq!(written, paths.user.clone().unwrap());

    let reloaded = WrapiConfig::load_with_paths(&paths).unwrap();
    assert_eq!(
        reloaded.client.api_token.as_deref(),
        with_token.then_some("saved-token")
    );
}

// ============== Token Masking Tests ==============

#[rstest]
fn test_mask_token_keeps_last_four() {
    assert_eq!(mask_token("abcdefgh1234"), "********1234");
    assert_eq!(mask_token("abc"), "****");
}

#[rstest]
fn test_mask_token_multibyte_tail() {
    // The star count follows characters, not bytes
    assert_eq!(mask_token("abc-déjà"), "****déjà");
    assert_eq!(mask_token("señor-token"), "*******oken");
}
