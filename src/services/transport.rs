use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    config::ApiConfig,
    error::{BillingError, Result},
    models::receipt::AuthToken,
};

const PROTOBUF_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw HTTP outcome. Status interpretation is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a binary body to `path`, relative to the API base URL.
    ///
    /// Only connection-level failures are errors (`BillingError::Network`);
    /// any HTTP status comes back as a `TransportResponse`.
    async fn post(&self, path: &str, token: &AuthToken, body: Vec<u8>)
        -> Result<TransportResponse>;
}

pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Fails only on local TLS or client setup problems, never on connectivity
    pub fn new(config: &ApiConfig) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, token, body))]
    async fn post(
        &self,
        path: &str,
        token: &AuthToken,
        body: Vec<u8>,
    ) -> Result<TransportResponse> {
        let url = self.url_for(path);

        let response = self
            .http_client
            .post(&url)
            .header(AUTHORIZATION, token.bearer())
            .header(CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)
            .header(ACCEPT, PROTOBUF_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| BillingError::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| BillingError::Network(format!("Failed to read response body: {}", e)))?;

        debug!(status, body_len = body.len(), "Received response");

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
