//! HTTP access to the Urban API.
//!
//! The gateway only needs "GET this path, give me JSON". [`UrbanApiHandler`]
//! is that seam; [`ReqwestUrbanApiHandler`] implements it over a shared
//! `reqwest` client. Timeouts and connection pooling are whatever the
//! client was built with.

use crate::{GatewayError, UrbanApiConfig};

/// Performs GET requests against the Urban API.
#[async_trait::async_trait]
pub trait UrbanApiHandler: Send + Sync {
    /// Fetches `endpoint` (a path such as `/api/v1/scenarios/1`, optionally
    /// with a query string) and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request fails, the server answers
    /// with a non-success status, or the body is not JSON.
    async fn get(&self, endpoint: &str) -> Result<serde_json::Value, GatewayError>;
}

/// [`UrbanApiHandler`] backed by `reqwest`.
pub struct ReqwestUrbanApiHandler {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestUrbanApiHandler {
    /// Creates a handler with a fresh client.
    #[must_use]
    pub fn new(config: &UrbanApiConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Creates a handler that reuses an existing client.
    #[must_use]
    pub fn with_client(config: &UrbanApiConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.clone(),
            client,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        }
    }
}

#[async_trait::async_trait]
impl UrbanApiHandler for ReqwestUrbanApiHandler {
    async fn get(&self, endpoint: &str) -> Result<serde_json::Value, GatewayError> {
        let url = self.url(endpoint);
        log::debug!("GET {url}");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status {
                status: resp.status().as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
