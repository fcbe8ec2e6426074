use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, PoisonError, RwLock,
    },
};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{BillingError, Result},
    models::{
        common::{IapProduct, PlanFrequency, PlanTier},
        product::{FreeTrial, PlanPrices, PricingInfo, Product, PromotionCode, UpgradePrompt},
    },
    services::store::IapStore,
};

struct Snapshot {
    /// Ticket of the refresh that produced this snapshot
    ticket: u64,
    products: Arc<Vec<Product>>,
}

/// Process-wide product catalog.
///
/// Refreshes replace the whole snapshot under a write lock, so readers see
/// either the old catalog or the new one, never a mix.
pub struct ProductCatalog {
    store: Arc<dyn IapStore>,
    snapshot: RwLock<Snapshot>,
    next_ticket: AtomicU64,
    promo: RwLock<Option<PromotionCode>>,
}

impl ProductCatalog {
    pub fn new(store: Arc<dyn IapStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Snapshot {
                ticket: 0,
                products: Arc::new(Vec::new()),
            }),
            next_ticket: AtomicU64::new(1),
            promo: RwLock::new(None),
        }
    }

    /// Query the store for every known product and install the result.
    ///
    /// A refresh that finishes after a later-started one has already been
    /// installed is discarded.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<Vec<Product>>> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        let identifiers: Vec<&str> = IapProduct::ALL.iter().map(|p| p.as_str()).collect();

        let fetched = self
            .store
            .fetch_products(&identifiers)
            .await
            .map_err(|e| match e {
                BillingError::StoreUnavailable(_) => e,
                other => BillingError::StoreUnavailable(other.to_string()),
            })?;

        let mut seen = HashSet::new();
        let products: Vec<Product> = fetched
            .into_iter()
            .filter(|p| {
                let first = seen.insert(p.identifier.clone());
                if !first {
                    warn!(product = %p.identifier, "Store returned duplicate product, ignoring");
                }
                first
            })
            .collect();

        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        if ticket < snapshot.ticket {
            debug!(ticket, installed = snapshot.ticket, "Discarding stale catalog refresh");
            return Ok(Arc::clone(&snapshot.products));
        }

        *snapshot = Snapshot {
            ticket,
            products: Arc::new(products),
        };
        info!(count = snapshot.products.len(), "Product catalog refreshed");

        Ok(Arc::clone(&snapshot.products))
    }

    /// Last installed snapshot
    pub fn products(&self) -> Arc<Vec<Product>> {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&snapshot.products)
    }

    pub fn product(&self, identifier: &str) -> Option<Product> {
        self.products()
            .iter()
            .find(|p| p.identifier == identifier)
            .cloned()
    }

    pub fn price_for(&self, identifier: &str) -> Option<String> {
        self.product(identifier).map(|p| p.price)
    }

    pub fn pricing_info(&self, plan: PlanTier) -> PricingInfo {
        PricingInfo::for_plan(&self.products(), plan)
    }

    pub fn set_introductory_promo(&self, promo: Option<PromotionCode>) {
        *self.promo.write().unwrap_or_else(PoisonError::into_inner) = promo;
    }

    /// The introductory promotion, if one is set and not expired
    pub fn introductory_promo(&self) -> Option<PromotionCode> {
        let now = OffsetDateTime::now_utc();
        self.promo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|promo| promo.is_active_at(now))
    }

    /// Trial for a plan product: the product's own offer first, then an
    /// active introductory promotion.
    pub fn free_trial(&self, plan: PlanTier, frequency: PlanFrequency) -> Option<FreeTrial> {
        let offer = self
            .product(plan.product(frequency).as_str())
            .and_then(|p| p.offer);

        if let Some(offer) = offer {
            return Some(FreeTrial::Offer {
                duration: offer.duration,
            });
        }

        self.introductory_promo().map(|promo| FreeTrial::Promotion {
            code: promo.code,
            days: promo.days,
        })
    }

    pub fn upgrade_prompt(&self, plan: PlanTier) -> UpgradePrompt {
        let price = |frequency| {
            self.price_for(plan.product(frequency).as_str())
                .filter(|price| !price.is_empty())
        };

        let prices = match (price(PlanFrequency::Monthly), price(PlanFrequency::Yearly)) {
            (Some(monthly), Some(yearly)) => Some(PlanPrices { monthly, yearly }),
            _ => None,
        };

        UpgradePrompt {
            trial: self.free_trial(plan, PlanFrequency::Yearly),
            prices,
        }
    }
}
