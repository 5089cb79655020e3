//! Shared error handling for remote API calls.

use crate::store::StoreError;

/// Errors surfaced by the API client. Authentication failures that survive
/// the refresh-and-retry path also raise a forced-logout signal before the
/// error is returned.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure (connect, TLS, body decode)
    Network(reqwest::Error),
    /// The request was rejected as unauthenticated after the refresh path
    /// was exhausted
    Unauthorized,
    /// Non-success status outside the authentication taxonomy
    Status(u16, String),
    /// The token store could not be read or written
    Store(StoreError),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "Request failed: {}", e),
            ApiError::Unauthorized => write!(f, "Not authenticated"),
            ApiError::Status(code, msg) if msg.is_empty() => {
                write!(f, "API returned status {}", code)
            }
            ApiError::Status(code, msg) => write!(f, "API returned status {}: {}", code, msg),
            ApiError::Store(e) => write!(f, "Session store error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}
