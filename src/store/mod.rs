//! Durable token storage.
//!
//! Shared by the session guard, the login flow, and the API client; no
//! locking discipline beyond reading the latest value at the point of use.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

/// Store key for the current access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Store key for the current refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Errors from the storage backend.
#[derive(Debug)]
pub enum StoreError {
    Backend(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Backend(e) => write!(f, "Token store backend error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e)
    }
}

/// Process-durable key-value store for the session token pair.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
