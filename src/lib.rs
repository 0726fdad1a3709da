//! Sports Cloud SDK
//!
//! A Rust library for calling the Firstbeat Sports Cloud API.
//!
//! This SDK provides:
//! - HS256 JWT minting from a consumer id and shared secret (5 minute tokens)
//! - A blocking API client that retries transient failures with exponential
//!   backoff and re-authenticates once when a token is rejected
//! - Lazy iteration over paginated list endpoints
//! - Typed models for accounts, teams, athletes, measurements and results
//! - Credential resolution from command line values and the environment
//!
//! # Example
//!
//! ```no_run
//! use sports_cloud_sdk::{
//!     config::resolve_credentials,
//!     ClientConfig, RetryPolicy, SportsCloudClient,
//! };
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = resolve_credentials(None, None)?;
//! let config = ClientConfig::default()
//!     .with_retry(RetryPolicy::new().with_max_attempts(5).with_base_delay(Duration::from_secs(2)));
//! let mut client = SportsCloudClient::new(credentials, config)?;
//! client.ensure_api_key()?;
//!
//! for account in client.accounts()? {
//!     println!("{} ({})", account.name, account.account_id);
//!     for athlete in client.account_athletes(&account.account_id) {
//!         println!("  {}", athlete?.full_name());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod sports_api;

// Re-export commonly used types and functions
pub use reqwest::Method;
pub use sports_api::{
    client::{ApiResponse, ClientConfig, QueryParams, SportsCloudClient, DEFAULT_API_URL},
    jwt::{authenticate, verify_token, JwtSigner, Token, TokenClaims, TokenSource},
    pagination::{Page, Paginator, Paging},
    resources::{
        Account, Athlete, AuthorizedBy, Coach, Group, Measurement, MeasurementResults, ResultVariable, Team,
        DEFAULT_RESULT_VARIABLES,
    },
    retry::{RetryPolicy, RetryState},
    types::{ApiError, Credentials, SportsCloudError},
};
