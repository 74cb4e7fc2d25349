//! Lemon Squeezy REST API access.
//!
//! The orchestrator talks to the billing platform only through [`BillingApi`],
//! so tests can substitute canned responses. Non-2xx statuses are returned as
//! ordinary [`UpstreamResponse`] values; only transport failures are errors.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use tracing::debug;

use crate::models::RefundRequestDocument;

/// Media type required by the JSON:API endpoints.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Errors raised while talking to the billing platform.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("billing platform request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to encode refund request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid billing platform base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Status and decoded body of a billing platform response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    /// Parsed JSON body, or `Value::Null` if the body was empty or not JSON.
    pub body: serde_json::Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Order lookup and refund creation against the billing platform.
#[async_trait]
pub trait BillingApi: Send + Sync {
    /// `GET /orders/{order_id}`.
    async fn get_order(
        &self,
        api_key: &str,
        order_id: &str,
    ) -> Result<UpstreamResponse, BillingError>;

    /// `POST /refunds`.
    async fn create_refund(
        &self,
        api_key: &str,
        request: &RefundRequestDocument,
    ) -> Result<UpstreamResponse, BillingError>;
}

/// [`BillingApi`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct LemonSqueezyClient {
    client: Client,
    base_url: String,
}

impl LemonSqueezyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/orders/{order_id}` with the ID escaped as a single path segment.
    pub fn order_url(&self, order_id: &str) -> Result<Url, BillingError> {
        self.endpoint(&["orders", order_id])
    }

    pub fn refunds_url(&self) -> Result<Url, BillingError> {
        self.endpoint(&["refunds"])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BillingError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| BillingError::InvalidBaseUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| BillingError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn json_api_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API_MEDIA_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API_MEDIA_TYPE));
        headers
    }

    async fn read_response(response: reqwest::Response) -> Result<UpstreamResponse, BillingError> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
        Ok(UpstreamResponse { status, body })
    }
}

#[async_trait]
impl BillingApi for LemonSqueezyClient {
    async fn get_order(
        &self,
        api_key: &str,
        order_id: &str,
    ) -> Result<UpstreamResponse, BillingError> {
        let url = self.order_url(order_id)?;
        debug!("Fetching order {} from billing platform", order_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(api_key)
            .headers(Self::json_api_headers())
            .send()
            .await?;

        Self::read_response(response).await
    }

    async fn create_refund(
        &self,
        api_key: &str,
        request: &RefundRequestDocument,
    ) -> Result<UpstreamResponse, BillingError> {
        let url = self.refunds_url()?;
        debug!("Submitting refund for order {}", request.order_id());

        // `.json()` would overwrite the JSON:API content type.
        let body = serde_json::to_vec(request)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .headers(Self::json_api_headers())
            .body(body)
            .send()
            .await?;

        Self::read_response(response).await
    }
}
