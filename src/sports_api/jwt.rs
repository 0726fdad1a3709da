use crate::sports_api::types::{Credentials, SportsCloudError};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifetime of every token minted for the Sports Cloud API (5 minutes)
pub const TOKEN_LIFETIME_SECS: i64 = 300;

/// JWT claim set signed for each request batch
///
/// The API only looks at the issuer (the consumer id) and the validity
/// window; timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer - the API consumer id
    pub iss: String,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signed bearer token with its validity window
#[derive(Debug, Clone)]
pub struct Token {
    /// Encoded JWT (header.payload.signature)
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Whether the token expires before `now + margin`
    ///
    /// The client passes its per-request timeout as the margin so a token is
    /// never sent when it could lapse while the request is in flight.
    pub fn expires_within_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        match chrono::Duration::from_std(margin) {
            Ok(margin) => now + margin >= self.expires_at,
            Err(_) => true,
        }
    }

    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expires_within_at(Utc::now(), margin)
    }
}

/// Mint a token for the given credentials
///
/// Signs `{iss: consumer_id, iat: now, exp: now + 300}` with HS256 using the
/// shared secret as the HMAC key.
///
/// # Errors
///
/// Returns `SportsCloudError::Auth` if the consumer id or the shared secret
/// is empty, or if signing fails.
///
/// # Example
///
/// ```
/// use sports_cloud_sdk::{authenticate, Credentials};
///
/// let credentials = Credentials::new("my-consumer-id", "my-shared-secret");
/// let token = authenticate(&credentials).unwrap();
/// println!("Authorization: {}", token.bearer());
/// ```
pub fn authenticate(credentials: &Credentials) -> Result<Token, SportsCloudError> {
    authenticate_at(credentials, Utc::now())
}

/// Same as [`authenticate`] with an explicit clock reading
pub fn authenticate_at(
    credentials: &Credentials,
    now: DateTime<Utc>,
) -> Result<Token, SportsCloudError> {
    if credentials.consumer_id.is_empty() {
        return Err(SportsCloudError::Auth("consumer id is empty".to_string()));
    }
    if credentials.shared_secret.is_empty() {
        return Err(SportsCloudError::Auth("shared secret is empty".to_string()));
    }

    let iat = now.timestamp();
    let exp = iat + TOKEN_LIFETIME_SECS;
    let claims = TokenClaims {
        iss: credentials.consumer_id.clone(),
        iat,
        exp,
    };

    let value = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(credentials.shared_secret.as_bytes()),
    )?;

    let issued_at = DateTime::from_timestamp(iat, 0)
        .ok_or_else(|| SportsCloudError::Auth(format!("invalid issue time: {}", iat)))?;
    let expires_at = DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| SportsCloudError::Auth(format!("invalid expiry time: {}", exp)))?;

    tracing::debug!(
        "Minted token for consumer {} (expires_at={})",
        credentials.consumer_id,
        expires_at.to_rfc3339()
    );

    Ok(Token {
        value,
        issued_at,
        expires_at,
    })
}

/// Verify a token against the shared secret and return its claims
///
/// Checks the HS256 signature, that `iss` equals the consumer id and that
/// the token has not expired.
pub fn verify_token(token: &str, credentials: &Credentials) -> Result<TokenClaims, SportsCloudError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[credentials.consumer_id.as_str()]);
    validation.set_required_spec_claims(&["exp", "iss"]);

    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(credentials.shared_secret.as_bytes()),
        &validation,
    )?;

    Ok(data.claims)
}

/// Source of fresh tokens for the client
///
/// The client calls this whenever its current token is missing, about to
/// expire, or rejected by the server.
pub trait TokenSource: Send + Sync {
    fn issue(&self, credentials: &Credentials) -> Result<Token, SportsCloudError>;
}

/// Default token source: signs HS256 JWTs locally
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtSigner;

impl TokenSource for JwtSigner {
    fn issue(&self, credentials: &Credentials) -> Result<Token, SportsCloudError> {
        authenticate(credentials)
    }
}
