#![allow(dead_code)]

use sports_cloud_sdk::{
    authenticate, ClientConfig, Credentials, RetryPolicy, SportsCloudClient, SportsCloudError,
    Token, TokenSource,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const CONSUMER_ID: &str = "0b7f3c2e-5a1d-4c8e-9f2a-consumer";
pub const SHARED_SECRET: &str = "4d1c9a77-2b3e-4f6a-8c9d-secret";

pub fn credentials() -> Credentials {
    Credentials::new(CONSUMER_ID, SHARED_SECRET)
}

/// Config pointing at a mock server, with millisecond backoff so retries are fast
pub fn test_config(uri: &str) -> ClientConfig {
    ClientConfig::new(uri)
        .with_timeout(Duration::from_secs(5))
        .with_retry(
            RetryPolicy::new()
                .with_max_attempts(3)
                .with_base_delay(Duration::from_millis(5)),
        )
        .with_poll_interval(Duration::from_millis(5))
}

pub fn test_client(uri: &str) -> SportsCloudClient {
    SportsCloudClient::new(credentials(), test_config(uri)).expect("client")
}

/// Token part of a `Bearer <jwt>` header value
pub fn bearer_token(header: &str) -> &str {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .expect("Bearer token")
}

/// Token source that counts how many tokens were minted
#[derive(Clone, Default)]
pub struct CountingSigner {
    pub issued: Arc<AtomicUsize>,
}

impl CountingSigner {
    pub fn count(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

impl TokenSource for CountingSigner {
    fn issue(&self, credentials: &Credentials) -> Result<Token, SportsCloudError> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        authenticate(credentials)
    }
}

/// Run blocking client code off the async test runtime
///
/// The blocking reqwest client must be created, used and dropped outside
/// the runtime's worker threads.
pub async fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}
