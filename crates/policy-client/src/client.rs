//! Policy API client trait and its HTTP implementation
//!
//! The trait is the seam between the UI and the backend: the UI only ever talks
//! to a `PolicyApi`, tests swap in an in-process implementation.

use crate::error::{ApiError, ApiResult};
use crate::model::{Policy, PolicyDraft, PolicyId};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// CRUD operations against the policy resource collection.
///
/// No operation retries or caches; errors reach the caller unchanged.
#[async_trait]
pub trait PolicyApi: Send + Sync {
    /// Fetch the full collection
    async fn list(&self) -> ApiResult<Vec<Policy>>;

    /// Create a record; the backend assigns its id
    async fn create(&self, draft: &PolicyDraft) -> ApiResult<Policy>;

    /// Replace the record identified by `id` in full
    async fn update(&self, id: &PolicyId, draft: &PolicyDraft) -> ApiResult<Policy>;

    async fn delete(&self, id: &PolicyId) -> ApiResult<()>;
}

/// Talks JSON over HTTP to `{base}/policies/`
#[derive(Clone)]
pub struct HttpPolicyClient {
    client: reqwest::Client,
    base_url: String,
    base: Url,
}

impl HttpPolicyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::Config {
                message: format!(
                    "invalid base URL {}: must start with http:// or https://",
                    base_url
                ),
            });
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| ApiError::Config {
            message: format!("invalid base URL {}: {}", base_url, e),
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            base,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Collection endpoint, e.g. `http://127.0.0.1:8000/api/policies/`
    pub fn collection_url(&self) -> String {
        format!("{}/policies/", self.base_url)
    }

    /// Item endpoint. The id is percent-encoded as a single path segment.
    pub fn item_url(&self, id: &PolicyId) -> String {
        let mut url = self.base.clone();
        // http(s) URLs always have a path to extend
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("policies")
                .push(&id.to_string())
                .push("");
        }
        url.into()
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(method = %method, url = %url, "policy API request");
        self.client.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read body>".to_string());
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PolicyApi for HttpPolicyClient {
    async fn list(&self) -> ApiResult<Vec<Policy>> {
        let url = self.collection_url();
        let response = self.send(self.request(Method::GET, &url)).await?;
        Self::decode(response).await
    }

    async fn create(&self, draft: &PolicyDraft) -> ApiResult<Policy> {
        let url = self.collection_url();
        let response = self
            .send(self.request(Method::POST, &url).json(draft))
            .await?;
        Self::decode(response).await
    }

    async fn update(&self, id: &PolicyId, draft: &PolicyDraft) -> ApiResult<Policy> {
        let url = self.item_url(id);
        let response = self
            .send(self.request(Method::PUT, &url).json(draft))
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &PolicyId) -> ApiResult<()> {
        let url = self.item_url(id);
        self.send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }
}
