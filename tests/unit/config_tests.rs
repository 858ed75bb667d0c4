use serial_test::serial;

use quiz_client::config::{ClientConfig, BASE_URL_ENV};
use quiz_client::stream::framing::{Framing, MAX_LINE_BYTES};
use quiz_client::AppError;

fn sample_toml() -> &'static str {
    r#"
base_url = "https://quiz.example.com/"
user_id = "u-42"
session_timeout_seconds = 120

[headers]
x-client = "cli"

[stream]
framing = "lines"
max_line_bytes = 4096
"#
}

#[test]
fn parses_valid_config() {
    let config = ClientConfig::from_toml_str(sample_toml()).expect("config parses");

    assert_eq!(config.base_url, "https://quiz.example.com", "trailing slash trimmed");
    assert_eq!(config.user_id.as_deref(), Some("u-42"));
    assert_eq!(config.headers.get("x-client").map(String::as_str), Some("cli"));
    assert_eq!(config.stream.framing, Framing::Lines);
    assert_eq!(config.stream.max_line_bytes, 4096);
    assert_eq!(config.session_timeout_seconds, 120);
}

#[test]
fn empty_config_uses_defaults() {
    let config = ClientConfig::from_toml_str("").expect("empty config parses");

    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.base_url, "http://localhost:8000");
    assert_eq!(config.stream.framing, Framing::Chunk);
    assert_eq!(config.stream.max_line_bytes, MAX_LINE_BYTES);
    assert!(config.user_id.is_none());
}

#[test]
fn rejects_non_http_base_url() {
    let result = ClientConfig::from_toml_str("base_url = \"ftp://quiz\"");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn rejects_zero_line_limit() {
    let result = ClientConfig::from_toml_str("[stream]\nmax_line_bytes = 0\n");
    match result {
        Err(AppError::Config(msg)) => assert!(msg.contains("max_line_bytes"), "{msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_framing() {
    let result = ClientConfig::from_toml_str("[stream]\nframing = \"sse\"\n");
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn loads_from_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("config.toml");
    std::fs::write(&path, sample_toml()).expect("write config");

    let config = ClientConfig::load_from_path(&path).expect("config loads");
    assert_eq!(config.user_id.as_deref(), Some("u-42"));
}

#[test]
fn missing_file_is_config_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result = ClientConfig::load_from_path(temp.path().join("absent.toml"));
    match result {
        Err(AppError::Config(msg)) => assert!(msg.contains("failed to read config"), "{msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
#[serial]
fn env_var_overrides_base_url() {
    std::env::set_var(BASE_URL_ENV, "https://tunnel.example.dev/");
    let mut config = ClientConfig::default();
    let result = config.apply_env_overrides();
    std::env::remove_var(BASE_URL_ENV);

    result.expect("override applies");
    assert_eq!(config.base_url, "https://tunnel.example.dev");
}

#[test]
#[serial]
fn empty_env_var_is_ignored() {
    std::env::set_var(BASE_URL_ENV, "  ");
    let mut config = ClientConfig::default();
    let result = config.apply_env_overrides();
    std::env::remove_var(BASE_URL_ENV);

    result.expect("validation passes");
    assert_eq!(config.base_url, "http://localhost:8000");
}

#[test]
fn set_base_url_validates() {
    let mut config = ClientConfig::default();
    assert!(config.set_base_url("localhost:9000").is_err());
    config
        .set_base_url("http://127.0.0.1:9000")
        .expect("valid url");
    assert_eq!(config.base_url, "http://127.0.0.1:9000");
}
