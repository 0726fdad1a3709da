use crate::sports_api::jwt::{JwtSigner, Token, TokenSource, TOKEN_LIFETIME_SECS};
use crate::sports_api::pagination::{Paginator, Paging};
use crate::sports_api::retry::{classify_status, RetryPolicy};
use crate::sports_api::types::{ApiError, Credentials, SportsCloudError};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Production Sports Cloud API endpoint
pub const DEFAULT_API_URL: &str = "https://api.firstbeat.com";

/// Query string parameters, in the order they are sent
pub type QueryParams = Vec<(String, String)>;

/// Client configuration
///
/// Built with the `with_*` methods on top of [`ClientConfig::default`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, without trailing path
    pub base_url: String,
    /// Fixed per-request deadline. Also used as the margin when deciding
    /// whether the current token is still good enough to send, so it must be
    /// shorter than the token lifetime.
    pub timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
    /// API key sent as `x-api-key` with every request once known
    pub api_key: Option<String>,
    /// Wait between polls while an analysis answers `202 Accepted`
    pub poll_interval: Duration,
    /// Maximum number of polls before giving up on a `202 Accepted`
    pub max_polls: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            api_key: None,
            poll_interval: Duration::from_secs(5),
            max_polls: 5,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls.max(1);
        self
    }
}

/// Successful (2xx) API response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` when the server sent no body
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Deserialize the body into a typed value
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SportsCloudError> {
        T::deserialize(&self.body).map_err(|e| {
            tracing::error!("Failed to parse response body: {}", e);
            SportsCloudError::Fatal(ApiError::Parse(format!("Failed to parse response: {}", e)))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiKeyResponse {
    apikey: String,
}

/// Blocking HTTP client for the Sports Cloud API
///
/// Owns the credentials and the current token. The token is minted lazily,
/// replaced wholesale when it is about to expire or when the server rejects
/// it, and never persisted.
///
/// # Example
///
/// ```no_run
/// use sports_cloud_sdk::{ClientConfig, Credentials, SportsCloudClient};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("consumer-id", "shared-secret");
/// let mut client = SportsCloudClient::new(credentials, ClientConfig::default())?;
///
/// for record in client.paginate("/v1/sports/accounts/3-99999/athletes", Vec::new()) {
///     println!("{}", record?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SportsCloudClient {
    config: ClientConfig,
    credentials: Credentials,
    token_source: Box<dyn TokenSource>,
    token: Option<Token>,
    http: reqwest::blocking::Client,
}

impl fmt::Debug for SportsCloudClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SportsCloudClient")
            .field("base_url", &self.config.base_url)
            .field("credentials", &self.credentials)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl SportsCloudClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns `SportsCloudError::Config` if the base URL is not an absolute
    /// http(s) URL, the timeout is not shorter than the token lifetime, or
    /// the HTTP client cannot be built.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, SportsCloudError> {
        let base_url = url::Url::parse(&config.base_url).map_err(|e| {
            SportsCloudError::Config(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SportsCloudError::Config(format!(
                "Unsupported URL scheme '{}' in base URL",
                base_url.scheme()
            )));
        }

        if config.timeout.as_secs() >= TOKEN_LIFETIME_SECS as u64 {
            return Err(SportsCloudError::Config(format!(
                "Request timeout {:?} must be shorter than the token lifetime of {} seconds",
                config.timeout, TOKEN_LIFETIME_SECS
            )));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SportsCloudError::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!("Creating SportsCloudClient with base URL: {}", config.base_url);

        Ok(Self {
            config,
            credentials,
            token_source: Box::new(JwtSigner),
            token: None,
            http,
        })
    }

    /// Replace the token source (builder pattern)
    pub fn with_token_source(mut self, token_source: impl TokenSource + 'static) -> Self {
        self.token_source = Box::new(token_source);
        self.token = None;
        self
    }

    /// Get the base URL for this client
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// API key currently attached to requests, if any
    pub fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.config.api_key = Some(api_key.into());
    }

    /// Mint a fresh token and make it the current one
    pub fn authenticate(&mut self) -> Result<&Token, SportsCloudError> {
        let token = self.token_source.issue(&self.credentials)?;
        tracing::debug!("Token refreshed, expires_at={}", token.expires_at.to_rfc3339());
        let token = self.token.insert(token);
        Ok(&*token)
    }

    /// Current token, re-minted first if it expires within the request timeout
    pub fn current_token(&mut self) -> Result<Token, SportsCloudError> {
        let usable = self
            .token
            .as_ref()
            .is_some_and(|token| !token.expires_within(self.config.timeout));
        if !usable {
            self.authenticate()?;
        }
        self.token
            .clone()
            .ok_or_else(|| SportsCloudError::Auth("No token available".to_string()))
    }

    fn url_for(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Issue exactly one HTTP call
    ///
    /// # Errors
    ///
    /// - `Transient` on timeout, connection failure, 429 or 5xx
    /// - `AuthExpired` on 401
    /// - `Fatal` on any other non-2xx status or an unparseable body
    pub fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        token: &Token,
    ) -> Result<ApiResponse, SportsCloudError> {
        let url = self.url_for(path);
        tracing::debug!("{} {} (params: {})", method, url, params.len());

        let mut builder = self
            .http
            .request(method, &url)
            .header("Authorization", token.bearer())
            .header("Accept", "application/json");
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("x-api-key", api_key);
        }
        if !params.is_empty() {
            builder = builder.query(params);
        }

        let response = builder.send().map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", url, e);
            SportsCloudError::from(e)
        })?;

        let status = response.status();
        tracing::debug!("Received response with status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Request to {} failed: HTTP {} - {}", url, status.as_u16(), error_body);
            return Err(classify_status(status.as_u16(), error_body));
        }

        let text = response.text().map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            SportsCloudError::from(e)
        })?;

        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                tracing::error!("Failed to parse response: {} - Response body: {}", e, text);
                SportsCloudError::Fatal(ApiError::Parse(format!(
                    "Failed to parse response JSON: {}",
                    e
                )))
            })?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// Issue a request, retrying transient failures with exponential backoff
    ///
    /// A 401 triggers one re-authentication followed by an immediate retry
    /// that does not count against the attempt budget. Fatal errors are
    /// returned without retrying; once the budget is spent the last
    /// transient error is returned.
    pub fn request_with_retry(
        &mut self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<ApiResponse, SportsCloudError> {
        let mut state = self.config.retry.start();
        let mut reauthenticated = false;

        loop {
            let token = self.current_token()?;
            let outcome = self.request(method.clone(), path, params, &token);

            if let Err(SportsCloudError::AuthExpired(_)) = &outcome {
                if !reauthenticated {
                    tracing::info!("Token rejected for {}, re-authenticating", path);
                    reauthenticated = true;
                    self.authenticate()?;
                    continue;
                }
            }

            state.record_attempt();
            match outcome {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() => match state.next_backoff() {
                    Some(delay) => {
                        tracing::warn!(
                            "Attempt {}/{} for {} failed: {}, retrying in {:?}",
                            state.attempt,
                            state.max_attempts,
                            path,
                            err,
                            delay
                        );
                        std::thread::sleep(delay);
                    }
                    None => {
                        tracing::error!(
                            "Giving up on {} after {} attempts: {}",
                            path,
                            state.attempt,
                            err
                        );
                        return Err(err);
                    }
                },
                Err(err) => return Err(err),
            }
        }
    }

    /// GET with retries
    pub fn get(&mut self, path: &str, params: &[(String, String)]) -> Result<ApiResponse, SportsCloudError> {
        self.request_with_retry(Method::GET, path, params)
    }

    /// GET that waits for server-side analysis to finish
    ///
    /// Some analysis results are computed on first access; the server then
    /// answers `202 Accepted` until they are ready. Polls every
    /// `poll_interval`, at most `max_polls` times.
    pub fn get_with_polling(
        &mut self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<ApiResponse, SportsCloudError> {
        let max_polls = self.config.max_polls.max(1);

        for poll in 1..=max_polls {
            let response = self.get(path, params)?;
            if response.status != 202 {
                return Ok(response);
            }
            if poll < max_polls {
                tracing::info!(
                    "Analysis for {} still in progress (poll {}/{}), waiting {:?}",
                    path,
                    poll,
                    max_polls,
                    self.config.poll_interval
                );
                std::thread::sleep(self.config.poll_interval);
            }
        }

        tracing::error!("Analysis for {} still pending after {} polls", path, max_polls);
        Err(SportsCloudError::Transient(ApiError::Http {
            status: 202,
            message: format!("Analysis still in progress after {} polls", max_polls),
        }))
    }

    /// Retrieve the API key of this consumer
    ///
    /// The key is created on first call and the same key is returned on
    /// every later call. Only the JWT is needed for this endpoint.
    pub fn fetch_api_key(&mut self) -> Result<String, SportsCloudError> {
        tracing::info!("Retrieving API key for consumer {}", self.credentials.consumer_id);
        let response = self.get("/v1/account/api-key", &[])?;
        let key: ApiKeyResponse = response.json()?;
        Ok(key.apikey)
    }

    /// Make sure requests carry an API key, fetching it if none is configured
    pub fn ensure_api_key(&mut self) -> Result<&str, SportsCloudError> {
        if self.config.api_key.is_none() {
            let api_key = self.fetch_api_key()?;
            self.config.api_key = Some(api_key);
        }
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| SportsCloudError::Config("API key unavailable".to_string()))
    }

    /// Lazily walk a cursor-paginated list endpoint
    ///
    /// Every call starts a fresh walk from the first page. See [`Paginator`].
    pub fn paginate(&mut self, path: impl Into<String>, params: QueryParams) -> Paginator<'_> {
        self.paginate_with(path, params, Paging::default())
    }

    /// Lazily walk a list endpoint with an explicit paging scheme
    pub fn paginate_with(
        &mut self,
        path: impl Into<String>,
        params: QueryParams,
        paging: Paging,
    ) -> Paginator<'_> {
        Paginator::new(self, path.into(), params, paging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn credentials() -> Credentials {
        Credentials::new("consumer", "secret")
    }

    #[test]
    fn test_client_creation() {
        let client = SportsCloudClient::new(credentials(), ClientConfig::new("http://example.com")).unwrap();
        assert_eq!(client.base_url(), "http://example.com");
        assert!(client.api_key().is_none());
    }

    #[test]
    fn test_client_rejects_invalid_base_url() {
        let err = SportsCloudClient::new(credentials(), ClientConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, SportsCloudError::Config(_)));

        let err = SportsCloudClient::new(credentials(), ClientConfig::new("ftp://example.com")).unwrap_err();
        assert!(matches!(err, SportsCloudError::Config(_)));
    }

    #[test]
    fn test_url_joining() {
        let client = SportsCloudClient::new(credentials(), ClientConfig::new("http://example.com/")).unwrap();
        assert_eq!(client.url_for("/v1/sports/accounts/"), "http://example.com/v1/sports/accounts/");
        assert_eq!(client.url_for("v1/account/api-key"), "http://example.com/v1/account/api-key");
    }

    struct CountingSource(Arc<AtomicUsize>);

    impl TokenSource for CountingSource {
        fn issue(&self, credentials: &Credentials) -> Result<Token, SportsCloudError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            crate::sports_api::jwt::authenticate(credentials)
        }
    }

    #[test]
    fn test_current_token_is_reused_until_near_expiry() {
        let issued = Arc::new(AtomicUsize::new(0));
        let mut client = SportsCloudClient::new(credentials(), ClientConfig::default())
            .unwrap()
            .with_token_source(CountingSource(issued.clone()));

        let first = client.current_token().unwrap();
        let second = client.current_token().unwrap();
        assert_eq!(first.value, second.value);
        assert_eq!(issued.load(Ordering::SeqCst), 1);
    }

    /// Mints tokens that are already close to expiry
    struct StaleSource(Arc<AtomicUsize>);

    impl TokenSource for StaleSource {
        fn issue(&self, credentials: &Credentials) -> Result<Token, SportsCloudError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let issued_at = chrono::Utc::now() - chrono::Duration::seconds(TOKEN_LIFETIME_SECS - 10);
            crate::sports_api::jwt::authenticate_at(credentials, issued_at)
        }
    }

    #[test]
    fn test_current_token_reminted_when_inside_timeout_margin() {
        let issued = Arc::new(AtomicUsize::new(0));
        let config = ClientConfig::default().with_timeout(Duration::from_secs(30));
        let mut client = SportsCloudClient::new(credentials(), config)
            .unwrap()
            .with_token_source(StaleSource(issued.clone()));

        client.current_token().unwrap();
        client.current_token().unwrap();
        assert_eq!(issued.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_timeout_must_be_shorter_than_token_lifetime() {
        let lifetime = Duration::from_secs(TOKEN_LIFETIME_SECS as u64);

        let config = ClientConfig::default().with_timeout(lifetime);
        let err = SportsCloudClient::new(credentials(), config).unwrap_err();
        assert!(matches!(err, SportsCloudError::Config(_)));

        let config = ClientConfig::default().with_timeout(Duration::from_secs(600));
        assert!(SportsCloudClient::new(credentials(), config).is_err());

        let config = ClientConfig::default().with_timeout(lifetime - Duration::from_secs(1));
        assert!(SportsCloudClient::new(credentials(), config).is_ok());
    }

    #[test]
    fn test_reauthentication_token_is_reused() {
        let issued = Arc::new(AtomicUsize::new(0));
        let mut client = SportsCloudClient::new(credentials(), ClientConfig::default())
            .unwrap()
            .with_token_source(CountingSource(issued.clone()));

        let refreshed = client.authenticate().unwrap().value.clone();
        let current = client.current_token().unwrap();
        assert_eq!(current.value, refreshed);
        assert_eq!(issued.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_secret_surfaces_auth_error() {
        let mut client =
            SportsCloudClient::new(Credentials::new("consumer", ""), ClientConfig::default()).unwrap();
        let err = client.current_token().unwrap_err();
        assert!(matches!(err, SportsCloudError::Auth(_)));
    }

    #[test]
    fn test_api_response_json() {
        let response = ApiResponse {
            status: 200,
            body: serde_json::json!({"apikey": "cXvpCBUzE64odvHXA5tc"}),
        };
        let key: ApiKeyResponse = response.json().unwrap();
        assert_eq!(key.apikey, "cXvpCBUzE64odvHXA5tc");

        let err = response.json::<Vec<String>>().unwrap_err();
        assert!(matches!(err, SportsCloudError::Fatal(ApiError::Parse(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("http://localhost:8080")
            .with_timeout(Duration::from_secs(5))
            .with_api_key("key")
            .with_max_polls(0)
            .with_poll_interval(Duration::from_millis(10))
            .with_retry(RetryPolicy::new().with_max_attempts(5));

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.max_polls, 1);
        assert_eq!(config.retry.max_attempts, 5);
    }
}
