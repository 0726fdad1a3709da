/// Sports Cloud API integration module
///
/// ## Request Flow
///
/// 1. Credentials (consumer id + shared secret) are resolved once by the caller
/// 2. The client mints a 5 minute HS256 JWT and sends it as a bearer token
/// 3. Transient failures (timeouts, 429, 5xx) are retried with exponential backoff
/// 4. A rejected token (401) is replaced once and the request repeated
/// 5. List endpoints are walked page by page as a lazy iterator
pub mod client;
pub mod jwt;
pub mod pagination;
pub mod resources;
pub mod retry;
pub mod types;

pub use client::{ApiResponse, ClientConfig, QueryParams, SportsCloudClient, DEFAULT_API_URL};
pub use jwt::{authenticate, JwtSigner, Token, TokenClaims, TokenSource};
pub use pagination::{Page, Paginator, Paging};
pub use resources::*;
pub use retry::{RetryPolicy, RetryState};
pub use types::{ApiError, Credentials, SportsCloudError};
