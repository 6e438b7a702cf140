//! HTTP plumbing shared by every endpoint module.

use std::sync::Arc;
use std::time::Duration;

use agora_config_and_utils::Config;
use agora_types::AuthToken;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// API version prefix prepended to every path.
const API_VERSION: &str = "v1";

/// REST client for the Agora API.
///
/// Cheap to clone; clones share the HTTP connection pool and the bearer
/// token slot.
#[derive(Clone)]
pub struct AgoraClient {
    http_client: reqwest::Client,
    base_url: Url,
    token: Arc<RwLock<Option<AuthToken>>>,
}

impl AgoraClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_url` - Base URL of the API, e.g. `https://api.agora.social`
    /// * `timeout` - Per-request timeout
    pub fn new(api_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = Url::parse(api_url)
            .map_err(|e| ApiError::Config(format!("invalid API URL {api_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "API URL cannot be a base: {api_url}"
            )));
        }

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Install the bearer token used for every subsequent request.
    pub async fn set_token(&self, token: AuthToken) {
        *self.token.write().await = Some(token);
    }

    /// Forget the bearer token.
    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    /// Whether a bearer token is installed.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Build `{base}/v1/{segments...}` with each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(API_VERSION)
            .extend(segments);
        Ok(url)
    }

    async fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(method = %method, url = %url, "API request");

        let mut builder = self
            .http_client
            .request(method, url)
            .header("Accept", "application/json");

        if let Some(token) = self.token.read().await.as_ref() {
            builder = builder.bearer_auth(token.as_str());
        }

        Ok(builder)
    }

    // =========================================================================
    // HTTP helpers
    // =========================================================================

    /// GET and decode a JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let builder = self.request(Method::GET, segments).await?.query(query);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Send a JSON body and decode the JSON answer.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, segments).await?.json(body);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    /// Send a JSON body and ignore the answer body.
    pub(crate) async fn send_json_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<()> {
        let builder = self.request(method, segments).await?.json(body);
        self.send(builder).await?;
        Ok(())
    }

    /// Send a request without a body and ignore the answer body.
    pub(crate) async fn send_unit(&self, method: Method, segments: &[&str]) -> ApiResult<()> {
        let builder = self.request(method, segments).await?;
        self.send(builder).await?;
        Ok(())
    }

    /// Send a multipart form and decode the JSON answer.
    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: reqwest::multipart::Form,
    ) -> ApiResult<T> {
        let builder = self.request(Method::POST, segments).await?.multipart(form);
        let response = self.send(builder).await?;
        Self::decode(response).await
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        Self::check_response(response).await
    }

    /// Check HTTP response for errors.
    async fn check_response(response: Response) -> ApiResult<Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status, body_len = body.len(), "API request failed");
            return Err(ApiError::Status {
                status,
                message: body,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl std::fmt::Debug for AgoraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgoraClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
