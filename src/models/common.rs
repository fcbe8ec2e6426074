use serde::{Deserialize, Serialize};

/// Subscription plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Plus,
    Patron,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plus => "plus",
            Self::Patron => "patron",
        }
    }

    /// Store products sold under this tier, monthly first
    pub fn products(&self) -> [IapProduct; 2] {
        [
            self.product(PlanFrequency::Monthly),
            self.product(PlanFrequency::Yearly),
        ]
    }

    pub fn product(&self, frequency: PlanFrequency) -> IapProduct {
        match (self, frequency) {
            (Self::Plus, PlanFrequency::Monthly) => IapProduct::PlusMonthly,
            (Self::Plus, PlanFrequency::Yearly) => IapProduct::PlusYearly,
            (Self::Patron, PlanFrequency::Monthly) => IapProduct::PatronMonthly,
            (Self::Patron, PlanFrequency::Yearly) => IapProduct::PatronYearly,
        }
    }

    pub fn includes(&self, identifier: &str) -> bool {
        self.products().iter().any(|p| p.as_str() == identifier)
    }
}

/// Billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanFrequency {
    Monthly,
    Yearly,
}

/// Purchasable store products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IapProduct {
    #[serde(rename = "com.pocketcasts.plus.monthly")]
    PlusMonthly,
    #[serde(rename = "com.pocketcasts.plus.yearly")]
    PlusYearly,
    #[serde(rename = "com.pocketcasts.monthly.patron")]
    PatronMonthly,
    #[serde(rename = "com.pocketcasts.yearly.patron")]
    PatronYearly,
}

impl IapProduct {
    pub const ALL: [IapProduct; 4] = [
        IapProduct::PlusMonthly,
        IapProduct::PlusYearly,
        IapProduct::PatronMonthly,
        IapProduct::PatronYearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlusMonthly => "com.pocketcasts.plus.monthly",
            Self::PlusYearly => "com.pocketcasts.plus.yearly",
            Self::PatronMonthly => "com.pocketcasts.monthly.patron",
            Self::PatronYearly => "com.pocketcasts.yearly.patron",
        }
    }

    pub fn plan(&self) -> PlanTier {
        match self {
            Self::PlusMonthly | Self::PlusYearly => PlanTier::Plus,
            Self::PatronMonthly | Self::PatronYearly => PlanTier::Patron,
        }
    }
}
