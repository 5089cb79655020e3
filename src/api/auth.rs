//! Authentication endpoints: login, token refresh, remote logout.
//!
//! The refresh path is the session guard's refresh collaborator: it reads
//! the stored refresh token, exchanges it, persists the new pair itself,
//! and reports only success or failure.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ApiClient, ApiError};
use crate::session::RefreshAccessToken;
use crate::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPairResponse {
    access_token: String,
    refresh_token: String,
}

impl ApiClient {
    /// Sign in and persist the session token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .execute(
                Method::POST,
                "/admin/auth/login",
                Some(&LoginRequest { email, password }),
                None,
            )
            .await?;
        let pair: TokenPairResponse = Self::into_json(response).await?;

        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token).await?;
        self.store
            .set(REFRESH_TOKEN_KEY, &pair.refresh_token)
            .await?;
        Ok(())
    }

    /// Best-effort remote revocation of the stored refresh token. Local
    /// logout proceeds regardless of the outcome here.
    pub async fn revoke_session(&self) {
        let refresh = match self.store.get(REFRESH_TOKEN_KEY).await {
            Ok(Some(token)) => token,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Could not read refresh token for revocation");
                return;
            }
        };

        let result = self
            .execute(
                Method::POST,
                "/admin/auth/logout",
                Some(&RefreshRequest {
                    refresh_token: &refresh,
                }),
                None,
            )
            .await;
        if let Err(e) = result {
            debug!(error = %e, "Remote session revocation failed");
        }
    }

    /// Exchange the stored refresh token for a new pair. Persists the pair
    /// and returns the new access token, or `None` when the session cannot
    /// be renewed.
    pub(crate) async fn request_token_refresh(&self) -> Option<String> {
        let refresh = match self.store.get(REFRESH_TOKEN_KEY).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No refresh token stored");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Could not read refresh token");
                return None;
            }
        };

        let response = self
            .execute(
                Method::POST,
                "/admin/auth/refresh",
                Some(&RefreshRequest {
                    refresh_token: &refresh,
                }),
                None,
            )
            .await;

        let pair: TokenPairResponse = match response {
            Ok(response) => match Self::into_json(response).await {
                Ok(pair) => pair,
                Err(e) => {
                    debug!(error = %e, "Token refresh rejected");
                    return None;
                }
            },
            Err(e) => {
                warn!(error = %e, "Token refresh request failed");
                return None;
            }
        };

        if let Err(e) = self.store.set(ACCESS_TOKEN_KEY, &pair.access_token).await {
            warn!(error = %e, "Failed to persist refreshed access token");
            return None;
        }
        if let Err(e) = self.store.set(REFRESH_TOKEN_KEY, &pair.refresh_token).await {
            warn!(error = %e, "Failed to persist rotated refresh token");
        }

        Some(pair.access_token)
    }
}

#[async_trait]
impl RefreshAccessToken for ApiClient {
    async fn refresh_access_token(&self) -> Option<String> {
        self.request_token_refresh().await
    }
}
