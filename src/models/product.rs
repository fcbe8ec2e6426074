use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::common::PlanTier;

/// Store product as last reported by the platform store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub identifier: String,
    /// Localized display price, e.g. "$39.99"
    pub price: String,
    pub offer: Option<Offer>,
}

/// Free-trial or introductory terms attached to a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// e.g. "7 days"
    pub duration: String,
    pub description: String,
}

/// Products of one plan tier, in catalog order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    pub products: Vec<Product>,
    pub has_free_trial: bool,
}

impl PricingInfo {
    pub fn for_plan(catalog: &[Product], plan: PlanTier) -> Self {
        let products: Vec<Product> = catalog
            .iter()
            .filter(|p| plan.includes(&p.identifier))
            .cloned()
            .collect();

        // An empty plan must not advertise a trial
        let has_free_trial = !products.is_empty() && products.iter().all(|p| p.offer.is_some());

        Self {
            products,
            has_free_trial,
        }
    }
}

/// Introductory promotion redeemable for a free trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionCode {
    pub code: String,
    pub days: u32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl PromotionCode {
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

/// Where a free trial comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "source")]
pub enum FreeTrial {
    Offer { duration: String },
    Promotion { code: String, days: u32 },
}

impl FreeTrial {
    /// Human-readable trial length
    pub fn duration_label(&self) -> String {
        match self {
            Self::Offer { duration } => duration.clone(),
            Self::Promotion { days, .. } => format!("{} days", days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPrices {
    pub monthly: String,
    pub yearly: String,
}

/// What an "upgrade required" prompt shows for a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradePrompt {
    pub trial: Option<FreeTrial>,
    /// Present only when both prices are known
    pub prices: Option<PlanPrices>,
}
