//! Credential Resolution Tests
//!
//! These tests mutate process environment variables, so they run serially.

use serial_test::serial;
use sports_cloud_sdk::config::{
    resolve_api_key, resolve_api_url, resolve_credentials, ENV_API_KEY, ENV_API_URL,
    ENV_CONSUMER_ID, ENV_SHARED_SECRET,
};
use sports_cloud_sdk::{SportsCloudError, DEFAULT_API_URL};

fn clear_env() {
    for name in [ENV_CONSUMER_ID, ENV_SHARED_SECRET, ENV_API_URL, ENV_API_KEY] {
        std::env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_credentials_from_environment() {
    clear_env();
    std::env::set_var(ENV_CONSUMER_ID, "env-consumer");
    std::env::set_var(ENV_SHARED_SECRET, "env-secret");

    let credentials = resolve_credentials(None, None).unwrap();
    assert_eq!(credentials.consumer_id, "env-consumer");
    assert_eq!(credentials.shared_secret, "env-secret");

    clear_env();
}

#[test]
#[serial]
fn test_cli_values_override_environment() {
    clear_env();
    std::env::set_var(ENV_CONSUMER_ID, "env-consumer");
    std::env::set_var(ENV_SHARED_SECRET, "env-secret");

    let credentials = resolve_credentials(Some("cli-consumer"), Some("cli-secret")).unwrap();
    assert_eq!(credentials.consumer_id, "cli-consumer");
    assert_eq!(credentials.shared_secret, "cli-secret");

    clear_env();
}

#[test]
#[serial]
fn test_missing_credentials() {
    clear_env();

    let err = resolve_credentials(None, Some("cli-secret")).unwrap_err();
    assert!(matches!(err, SportsCloudError::Config(_)));
    assert!(err.to_string().contains(ENV_CONSUMER_ID));
}

#[test]
#[serial]
fn test_api_url_resolution() {
    clear_env();
    assert_eq!(resolve_api_url(None), DEFAULT_API_URL);

    std::env::set_var(ENV_API_URL, "https://staging.example.com");
    assert_eq!(resolve_api_url(None), "https://staging.example.com");
    assert_eq!(resolve_api_url(Some("http://localhost:9000")), "http://localhost:9000");

    clear_env();
}

#[test]
#[serial]
fn test_api_key_resolution() {
    clear_env();
    assert_eq!(resolve_api_key(None), None);

    std::env::set_var(ENV_API_KEY, "env-key");
    assert_eq!(resolve_api_key(None).as_deref(), Some("env-key"));
    assert_eq!(resolve_api_key(Some("cli-key")).as_deref(), Some("cli-key"));

    clear_env();
}
