#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Malformed response: {0}")]
    Protocol(String),

    #[error("Server returned status {status}")]
    Server { status: u16 },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Purchase cancelled")]
    PurchaseCancelled,

    #[error("Purchase failed: {0}")]
    PurchaseFailed(String),
}

impl BillingError {
    /// Stable machine-readable code, used as a structured log field
    pub fn code(&self) -> &'static str {
        match self {
            BillingError::Network(_) => "NETWORK_ERROR",
            BillingError::Auth(_) => "AUTH_ERROR",
            BillingError::Protocol(_) => "PROTOCOL_ERROR",
            BillingError::Server { .. } => "SERVER_ERROR",
            BillingError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            BillingError::PurchaseCancelled => "PURCHASE_CANCELLED",
            BillingError::PurchaseFailed(_) => "PURCHASE_FAILED",
        }
    }

    /// Generic text safe to show to a user. Raw transport or protocol detail
    /// stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            BillingError::Network(_) => "Unable to reach the server, please check your connection",
            BillingError::Auth(_) => "Please sign in again to continue",
            BillingError::PurchaseCancelled => "The purchase was cancelled",
            BillingError::StoreUnavailable(_) => "The store is not available right now",
            BillingError::Protocol(_)
            | BillingError::Server { .. }
            | BillingError::PurchaseFailed(_) => "Something went wrong, please try again",
        }
    }

    /// Whether a user-initiated retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            BillingError::Network(_)
            | BillingError::StoreUnavailable(_)
            | BillingError::PurchaseCancelled
            | BillingError::PurchaseFailed(_) => true,
            BillingError::Server { status } => *status >= 500,
            BillingError::Auth(_) | BillingError::Protocol(_) => false,
        }
    }
}

impl From<prost::DecodeError> for BillingError {
    fn from(e: prost::DecodeError) -> Self {
        BillingError::Protocol(e.to_string())
    }
}

// Helper type for results
pub type Result<T> = std::result::Result<T, BillingError>;
