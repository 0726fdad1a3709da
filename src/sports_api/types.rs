use std::fmt;

/// Sports Cloud API error type
///
/// Every failure the client can surface falls in one of these buckets. The
/// retry loop only ever retries `Transient`, and re-authenticates once on
/// `AuthExpired`; everything else terminates the current operation.
#[derive(Debug)]
pub enum SportsCloudError {
    /// Credentials are missing or the token could not be signed
    Auth(String),
    /// Retryable network or server fault (timeout, connect failure, 5xx, 429)
    Transient(ApiError),
    /// Non-retryable client-side fault (4xx, malformed request or response)
    Fatal(ApiError),
    /// The server rejected the bearer token (HTTP 401)
    AuthExpired(ApiError),
    /// Client configuration error
    Config(String),
}

impl SportsCloudError {
    /// Whether the retry loop may try the same request again
    pub fn is_retryable(&self) -> bool {
        matches!(self, SportsCloudError::Transient(_))
    }

    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SportsCloudError::Transient(err)
            | SportsCloudError::Fatal(err)
            | SportsCloudError::AuthExpired(err) => err.status(),
            SportsCloudError::Auth(_) | SportsCloudError::Config(_) => None,
        }
    }
}

impl fmt::Display for SportsCloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SportsCloudError::Auth(msg) => write!(f, "Authentication failed: {}", msg),
            SportsCloudError::Transient(err) => write!(f, "Transient API error: {}", err),
            SportsCloudError::Fatal(err) => write!(f, "API error: {}", err),
            SportsCloudError::AuthExpired(err) => write!(f, "Token rejected: {}", err),
            SportsCloudError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SportsCloudError {}

impl From<jsonwebtoken::errors::Error> for SportsCloudError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        SportsCloudError::Auth(err.to_string())
    }
}

impl From<reqwest::Error> for SportsCloudError {
    /// Transport failures are transient unless the request itself could not
    /// be built or the body could not be decoded.
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            SportsCloudError::Fatal(ApiError::Request(err.to_string()))
        } else if err.is_decode() {
            SportsCloudError::Fatal(ApiError::Parse(err.to_string()))
        } else {
            SportsCloudError::Transient(ApiError::from(err))
        }
    }
}

/// API-specific errors
#[derive(Debug)]
pub enum ApiError {
    /// Network error (connection, timeout, etc.)
    Network(String),
    /// HTTP error with status code
    Http { status: u16, message: String },
    /// Failed to parse response
    Parse(String),
    /// Request building failed
    Request(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timeout".to_string())
        } else if err.is_connect() {
            ApiError::Network(format!("Connection failed: {}", err))
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// API consumer credentials issued at registration
///
/// Resolved once (see [`crate::config`]) and handed to the client as a
/// plain value. The shared secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_id: String,
    pub shared_secret: String,
}

impl Credentials {
    pub fn new(consumer_id: impl Into<String>, shared_secret: impl Into<String>) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            shared_secret: shared_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_id", &self.consumer_id)
            .field("shared_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        let transient = SportsCloudError::Transient(ApiError::Http {
            status: 503,
            message: "unavailable".to_string(),
        });
        let fatal = SportsCloudError::Fatal(ApiError::Http {
            status: 404,
            message: "not found".to_string(),
        });
        let expired = SportsCloudError::AuthExpired(ApiError::Http {
            status: 401,
            message: "expired".to_string(),
        });

        assert!(transient.is_retryable());
        assert!(!fatal.is_retryable());
        assert!(!expired.is_retryable());
        assert!(!SportsCloudError::Auth("empty secret".to_string()).is_retryable());
    }

    #[test]
    fn test_status_is_exposed() {
        let err = SportsCloudError::Fatal(ApiError::Http {
            status: 404,
            message: "not found".to_string(),
        });
        assert_eq!(err.status(), Some(404));
        assert_eq!(SportsCloudError::Config("x".to_string()).status(), None);
        assert_eq!(
            SportsCloudError::Transient(ApiError::Network("Request timeout".to_string())).status(),
            None
        );
    }

    #[test]
    fn test_error_display() {
        let err = SportsCloudError::Fatal(ApiError::Http {
            status: 400,
            message: "bad offset".to_string(),
        });
        assert_eq!(err.to_string(), "API error: HTTP 400 error: bad offset");

        let err = SportsCloudError::Auth("shared secret is empty".to_string());
        assert_eq!(err.to_string(), "Authentication failed: shared secret is empty");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials::new("consumer-1", "s3cr3t");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("consumer-1"));
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("<redacted>"));
    }
}
