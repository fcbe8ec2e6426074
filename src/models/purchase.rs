use serde::{Deserialize, Serialize};

/// Purchase flow state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseState {
    #[default]
    Idle,
    Purchasing,
    Purchased,
    /// Not terminal, the user may retry
    Failed,
}

impl PurchaseState {
    /// Whether a new `purchase` call would be accepted
    pub fn accepts_purchase(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed)
    }
}

/// State of an asynchronous yes/no gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    #[default]
    Checking,
    Allowed,
    Disallowed,
}

/// Whether the user may rate a podcast
pub type RatingEligibility = GateState;

/// Completed store transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreTransaction {
    pub transaction_id: String,
    pub product_id: String,
}
