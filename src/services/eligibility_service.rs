use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{BillingError, Result},
    models::{
        eligibility::{EligibilityRequest, EligibilityResponse},
        receipt::{AuthToken, Receipt},
    },
    services::transport::{Transport, TransportResponse},
};

pub const CHECK_ELIGIBILITY_PATH: &str = "subscription/check_eligibility";

/// Supplies the bearer token for backend calls
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<AuthToken>;
}

/// Token fixed at construction, e.g. from configuration
pub struct StaticTokenProvider {
    token: Option<AuthToken>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<AuthToken>) -> Self {
        Self { token }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config
                .token
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(AuthToken::new),
        )
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<AuthToken> {
        self.token
            .clone()
            .ok_or_else(|| BillingError::Auth("No API token configured".to_string()))
    }
}

/// Submits receipts to the backend for promotional-pricing eligibility.
///
/// One call is one request; nothing is retried here.
pub struct EligibilityClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
}

impl EligibilityClient {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { transport, tokens }
    }

    #[instrument(skip(self, receipt), fields(receipt_fingerprint = %receipt.fingerprint()))]
    pub async fn check_eligibility(&self, receipt: &Receipt) -> Result<EligibilityResponse> {
        // No token, no request
        let token = self.tokens.token().await.map_err(|e| match e {
            BillingError::Auth(_) => e,
            other => BillingError::Auth(format!("Failed to obtain token: {}", other)),
        })?;

        let request_id = Uuid::new_v4();
        let body = EligibilityRequest::apple(receipt).encode();
        debug!(
            %request_id,
            receipt_len = receipt.len(),
            body_len = body.len(),
            "Sending eligibility check"
        );

        let response = self
            .transport
            .post(CHECK_ELIGIBILITY_PATH, &token, body)
            .await?;

        let verdict = Self::interpret(response)?;
        info!(%request_id, eligible = verdict.eligible, "Eligibility check completed");

        Ok(verdict)
    }

    fn interpret(response: TransportResponse) -> Result<EligibilityResponse> {
        match response.status {
            200 => EligibilityResponse::decode(&response.body),
            401 | 403 => Err(BillingError::Auth(format!(
                "Token rejected with status {}",
                response.status
            ))),
            status => Err(BillingError::Server { status }),
        }
    }
}
