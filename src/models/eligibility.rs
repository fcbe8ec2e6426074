use prost::Message;
use serde::Serialize;

use super::{
    receipt::Receipt,
    wire::{CheckEligibleRequest, CheckEligibleResponse, StoreReceipt, SubscriptionsPurchaseAppleRequest},
};
use crate::error::{BillingError, Result};

/// Eligibility check request, keyed by the store that issued the receipt.
/// Built fresh for every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityRequest {
    Apple { receipt: String },
}

impl EligibilityRequest {
    pub fn apple(receipt: &Receipt) -> Self {
        Self::Apple {
            receipt: receipt.to_base64(),
        }
    }

    /// Serialize to the protobuf body the backend expects
    pub fn encode(&self) -> Vec<u8> {
        let store_receipt = match self {
            Self::Apple { receipt } => StoreReceipt::Apple(SubscriptionsPurchaseAppleRequest {
                receipt: receipt.clone(),
            }),
        };

        CheckEligibleRequest {
            store_receipt: Some(store_receipt),
        }
        .encode_to_vec()
    }
}

/// Server verdict for one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub eligible: bool,
}

impl EligibilityResponse {
    /// Decode a 200 response body. The verdict must be present on the wire;
    /// an empty body never defaults to `eligible: false`.
    pub fn decode(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(BillingError::Protocol("Empty response body".to_string()));
        }

        let message = CheckEligibleResponse::decode(body)?;
        let eligible = message.eligible.ok_or_else(|| {
            BillingError::Protocol("Response is missing the eligible field".to_string())
        })?;

        Ok(Self { eligible })
    }

    pub fn encode(&self) -> Vec<u8> {
        CheckEligibleResponse {
            eligible: Some(self.eligible),
        }
        .encode_to_vec()
    }
}
