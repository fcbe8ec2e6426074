//! Protobuf messages exchanged with `POST /subscription/check_eligibility`.

use prost::{Message, Oneof};

#[derive(Clone, PartialEq, Message)]
pub struct SubscriptionsPurchaseAppleRequest {
    /// Base64 of the raw App Store receipt
    #[prost(string, tag = "1")]
    pub receipt: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct CheckEligibleRequest {
    #[prost(oneof = "StoreReceipt", tags = "1")]
    pub store_receipt: Option<StoreReceipt>,
}

#[derive(Clone, PartialEq, Oneof)]
pub enum StoreReceipt {
    #[prost(message, tag = "1")]
    Apple(SubscriptionsPurchaseAppleRequest),
}

#[derive(Clone, PartialEq, Message)]
pub struct CheckEligibleResponse {
    /// Always written explicitly, so an absent field is a broken response
    #[prost(bool, optional, tag = "1")]
    pub eligible: Option<bool>,
}
