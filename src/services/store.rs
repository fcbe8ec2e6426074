use async_trait::async_trait;

use crate::{
    error::Result,
    models::{product::Product, purchase::StoreTransaction},
};

/// Platform in-app-purchase store
#[async_trait]
pub trait IapStore: Send + Sync {
    /// Current metadata for `identifiers`, in the order the store reports
    /// them. Unknown identifiers are simply absent.
    async fn fetch_products(&self, identifiers: &[&str]) -> Result<Vec<Product>>;

    /// Run a purchase transaction. A user cancellation must surface as
    /// `BillingError::PurchaseCancelled`.
    async fn purchase(&self, identifier: &str) -> Result<StoreTransaction>;
}
