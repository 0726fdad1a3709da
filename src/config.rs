//! Resolution of credentials and endpoint settings
//!
//! Command line values win over environment variables; empty values count
//! as missing. The result is a plain [`Credentials`] value handed to the
//! client, which never looks at the environment itself.

use crate::sports_api::client::DEFAULT_API_URL;
use crate::sports_api::types::{Credentials, SportsCloudError};

pub const ENV_SHARED_SECRET: &str = "FIRSTBEAT_SHARED_SECRET";
pub const ENV_CONSUMER_ID: &str = "FIRSTBEAT_CONSUMER_ID";
pub const ENV_API_URL: &str = "FIRSTBEAT_API_URL";
pub const ENV_API_KEY: &str = "FIRSTBEAT_API_KEY";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn pick(
    cli_value: Option<&str>,
    env_name: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    non_empty(cli_value.map(str::to_string)).or_else(|| non_empty(lookup(env_name)))
}

/// Resolve credentials from explicit values, falling back to `lookup`
///
/// `lookup` maps an environment variable name to its value; see
/// [`resolve_credentials`] for the process-environment version.
pub fn resolve_credentials_with(
    cli_consumer_id: Option<&str>,
    cli_shared_secret: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, SportsCloudError> {
    let consumer_id = pick(cli_consumer_id, ENV_CONSUMER_ID, &lookup);
    let shared_secret = pick(cli_shared_secret, ENV_SHARED_SECRET, &lookup);

    match (consumer_id, shared_secret) {
        (Some(consumer_id), Some(shared_secret)) => {
            tracing::debug!("Resolved credentials for consumer {}", consumer_id);
            Ok(Credentials::new(consumer_id, shared_secret))
        }
        (consumer_id, shared_secret) => {
            let mut missing = Vec::new();
            if consumer_id.is_none() {
                missing.push(format!("--consumer-id or {}", ENV_CONSUMER_ID));
            }
            if shared_secret.is_none() {
                missing.push(format!("--shared-secret or {}", ENV_SHARED_SECRET));
            }
            Err(SportsCloudError::Config(format!(
                "Missing credentials: provide {}",
                missing.join(" and ")
            )))
        }
    }
}

/// Resolve credentials from command line values and the process environment
pub fn resolve_credentials(
    cli_consumer_id: Option<&str>,
    cli_shared_secret: Option<&str>,
) -> Result<Credentials, SportsCloudError> {
    resolve_credentials_with(cli_consumer_id, cli_shared_secret, |name| std::env::var(name).ok())
}

/// API base URL: command line, then `FIRSTBEAT_API_URL`, then the production endpoint
pub fn resolve_api_url(cli_api: Option<&str>) -> String {
    pick(cli_api, ENV_API_URL, &|name: &str| std::env::var(name).ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// API key if one was supplied; otherwise the client retrieves it
pub fn resolve_api_key(cli_api_key: Option<&str>) -> Option<String> {
    pick(cli_api_key, ENV_API_KEY, &|name: &str| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_cli_overrides_environment() {
        let lookup = env(&[(ENV_CONSUMER_ID, "env-id"), (ENV_SHARED_SECRET, "env-secret")]);
        let credentials = resolve_credentials_with(Some("cli-id"), None, lookup).unwrap();
        assert_eq!(credentials.consumer_id, "cli-id");
        assert_eq!(credentials.shared_secret, "env-secret");
    }

    #[test]
    fn test_environment_only() {
        let lookup = env(&[(ENV_CONSUMER_ID, "env-id"), (ENV_SHARED_SECRET, "env-secret")]);
        let credentials = resolve_credentials_with(None, None, lookup).unwrap();
        assert_eq!(credentials, Credentials::new("env-id", "env-secret"));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let lookup = env(&[(ENV_CONSUMER_ID, "env-id"), (ENV_SHARED_SECRET, "")]);
        let err = resolve_credentials_with(Some(""), Some("  "), lookup).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, SportsCloudError::Config(_)));
        assert!(message.contains(ENV_SHARED_SECRET));
        assert!(!message.contains(ENV_CONSUMER_ID));
    }

    #[test]
    fn test_both_missing_named_in_error() {
        let err = resolve_credentials_with(None, None, env(&[])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("--consumer-id"));
        assert!(message.contains("--shared-secret"));
    }
}
