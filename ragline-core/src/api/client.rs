//! Shared HTTP plumbing for the backend API.
//!
//! One [`ApiClient`] is built at startup from the loaded configuration and
//! the stored credential, then handed to every command. The bearer token is
//! injected here explicitly; nothing in this crate reads it from ambient
//! state.

use std::time::Duration;

use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::RaglineConfig;

/// Errors surfaced by the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// HTTP client for the knowledge-base backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
    request_timeout: Duration,
}

impl ApiClient {
    /// Build a client against `base_url` with the default request timeout.
    ///
    /// The timeout applies per non-streaming request; the streaming request
    /// deliberately carries none, since the server may pause between tokens
    /// for as long as generation takes.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url.into()),
            token: None,
            request_timeout: Duration::from_secs(
                crate::config::constants::defaults::REQUEST_TIMEOUT_SECS,
            ),
        })
    }

    pub fn from_config(config: &RaglineConfig, token: Option<String>) -> Result<Self, ApiError> {
        let mut client = Self::new(config.api_url.clone())?;
        client.request_timeout = config.request_timeout();
        client.token = token;
        Ok(client)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorize(self.http.get(self.url(path)))
            .timeout(self.request_timeout)
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .authorize(self.http.post(self.url(path)))
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }

    /// POST with an empty body, for action endpoints such as scrape retry.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorize(self.http.post(self.url(path)))
            .timeout(self.request_timeout)
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.http.post(self.url(path)))
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .authorize(self.http.delete(self.url(path)))
            .timeout(self.request_timeout)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Issue a POST whose response body will be consumed as a stream.
    ///
    /// No per-request timeout: the transport's own connect handling bounds
    /// setup, and read inactivity is the caller's concern.
    pub(crate) async fn post_stream<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let response = self
            .authorize(self.http.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn normalize_base_url(mut base_url: String) -> String {
    while base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}

/// Pull a human-readable message out of a backend error body.
///
/// The backend answers failures with `{"error": "..."}`; the auth layer
/// uses DRF's `{"detail": "..."}` shape.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for key in ["error", "detail"] {
        if let Some(message) = value.get(key).and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }
    None
}
