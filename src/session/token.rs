//! Access-token inspection: payload decode and the expiry policy.
//!
//! The console never verifies token signatures - it holds no signing
//! secret. Only the payload segment is decoded, and only `exp` is
//! consumed. Anything undecodable counts as expired so that garbage
//! input fails toward re-authentication, never toward access.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds subtracted from the claimed expiry before a token counts as
/// expired. Covers the window between checking the token locally and a
/// request carrying it reaching the server.
pub const EXPIRY_BUFFER_SECS: u64 = 30;

/// Claims consumed from the access token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identifier), when the server includes one
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: u64,
}

/// Errors that can occur while decoding a token payload.
#[derive(Debug)]
pub enum TokenError {
    /// Fewer than two dot-separated segments
    Malformed,
    /// Payload segment is not valid base64url
    Base64(base64::DecodeError),
    /// Payload is not a JSON object with the expected claims
    Json(serde_json::Error),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "Token is not in JWT format"),
            TokenError::Base64(e) => write!(f, "Failed to decode token payload: {}", e),
            TokenError::Json(e) => write!(f, "Failed to parse token claims: {}", e),
        }
    }
}

impl std::error::Error for TokenError {}

/// Decode the claims from a bearer token without verifying its signature.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let payload = token.split('.').nth(1).ok_or(TokenError::Malformed)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(TokenError::Base64)?;
    serde_json::from_slice(&bytes).map_err(TokenError::Json)
}

/// Whether a token should be treated as expired at `now` (Unix seconds).
/// Undecodable tokens are expired.
pub fn is_token_expired(token: &str, now: u64) -> bool {
    match decode_claims(token) {
        Ok(claims) => now >= claims.exp.saturating_sub(EXPIRY_BUFFER_SECS),
        Err(_) => true,
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
