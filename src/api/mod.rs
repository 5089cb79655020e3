//! Client for the content-admin API.
//!
//! Every request carries the stored access token as a bearer credential.
//! A 401 triggers exactly one refresh-and-retry; when the refresh itself
//! fails, the client raises a forced-logout signal on the session event
//! bus and gives up. There is no retry policy beyond that single attempt.

mod about;
mod auth;
mod contacts;
mod error;
mod terms;

pub use about::AboutVersion;
pub use contacts::ContactInfo;
pub use error::ApiError;
pub use terms::TermsVersion;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::session::SessionEvents;
use crate::store::{ACCESS_TOKEN_KEY, TokenStore};

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    store: Arc<dyn TokenStore>,
    events: SessionEvents,
}

impl ApiClient {
    pub fn new(api_origin: Url, store: Arc<dyn TokenStore>, events: SessionEvents) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: api_origin.as_str().trim_end_matches('/').to_string(),
            store,
            events,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send_authorized(Method::GET, path, None::<&()>).await?;
        Self::into_json(response).await
    }

    /// POST where the caller does not care about the response body.
    pub(crate) async fn post_unit(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send_authorized(Method::POST, path, None::<&()>).await?;
        Self::check_status(response).await
    }

    /// Authenticated request with the single refresh-and-retry pass.
    /// The returned response is never a 401.
    async fn send_authorized<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self.store.get(ACCESS_TOKEN_KEY).await?;
        let response = self
            .execute(method.clone(), path, body, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %path, "Request rejected as unauthenticated, attempting token refresh");
        let Some(fresh) = self.request_token_refresh().await else {
            self.events.force_logout();
            return Err(ApiError::Unauthorized);
        };

        let retry = self.execute(method, path, body, Some(&fresh)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %path, "Request still unauthenticated after refresh");
            self.events.force_logout();
            return Err(ApiError::Unauthorized);
        }
        Ok(retry)
    }

    /// One request, no auth recovery.
    async fn execute<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.http.request(method, self.endpoint(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn into_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(status.as_u16(), message));
        }
        Ok(response.json().await?)
    }

    /// Consume a response, keeping only its success or failure.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(status.as_u16(), message));
        }
        Ok(())
    }
}
