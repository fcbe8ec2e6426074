use std::sync::{Arc, Mutex, PoisonError};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    error::BillingError,
    models::{
        common::{IapProduct, PlanFrequency, PlanTier},
        product::PricingInfo,
        purchase::{GateState, PurchaseState},
    },
    services::{catalog_service::ProductCatalog, gate_service::EligibilityGate, store::IapStore},
};

struct FlowShared {
    state: watch::Sender<PurchaseState>,
    /// Written before `state` moves to `Failed`
    last_failure: Mutex<Option<BillingError>>,
}

impl FlowShared {
    fn record_failure(&self, failure: Option<BillingError>) {
        *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner) = failure;
    }
}

/// Drives one purchase flow for one plan tier.
///
/// `idle -> purchasing -> purchased | failed`, where `failed` may be retried
/// and `purchased` is final. A new instance always starts `idle`.
pub struct PurchaseOrchestrator {
    plan: PlanTier,
    catalog: Arc<ProductCatalog>,
    store: Arc<dyn IapStore>,
    trial_gate: Option<EligibilityGate>,
    shared: Arc<FlowShared>,
}

impl PurchaseOrchestrator {
    pub fn new(plan: PlanTier, catalog: Arc<ProductCatalog>, store: Arc<dyn IapStore>) -> Self {
        let (state, _) = watch::channel(PurchaseState::Idle);
        Self {
            plan,
            catalog,
            store,
            trial_gate: None,
            shared: Arc::new(FlowShared {
                state,
                last_failure: Mutex::new(None),
            }),
        }
    }

    /// Gate free-trial pricing on a promotional eligibility check
    pub fn with_trial_gate(mut self, gate: EligibilityGate) -> Self {
        self.trial_gate = Some(gate);
        self
    }

    pub fn plan(&self) -> PlanTier {
        self.plan
    }

    pub fn state(&self) -> PurchaseState {
        *self.shared.state.borrow()
    }

    /// Why the flow last entered `Failed`, for `BillingError::user_message`.
    /// Cleared when a new purchase starts.
    pub fn last_failure(&self) -> Option<BillingError> {
        self.shared
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// State updates; the stream ends when the flow is dropped
    pub fn observe_purchase_state(&self) -> watch::Receiver<PurchaseState> {
        self.shared.state.subscribe()
    }

    pub fn pricing_info(&self) -> PricingInfo {
        self.catalog.pricing_info(self.plan)
    }

    pub fn default_product(&self, frequency: PlanFrequency) -> IapProduct {
        self.plan.product(frequency)
    }

    /// Trial length to show next to `product`, if it carries an offer
    pub fn trial_duration(&self, product: IapProduct) -> Option<String> {
        self.catalog
            .product(product.as_str())
            .and_then(|p| p.offer)
            .map(|offer| offer.duration)
    }

    /// Start the trial eligibility check, if this flow has a gate
    pub fn start_eligibility_check(&self) -> Option<JoinHandle<()>> {
        self.trial_gate.as_ref().and_then(EligibilityGate::start)
    }

    /// Free-trial pricing is shown only when every plan product carries an
    /// offer and the eligibility gate allowed it.
    pub fn offers_free_trial(&self) -> bool {
        let gate_allows = self
            .trial_gate
            .as_ref()
            .is_some_and(|gate| gate.state() == GateState::Allowed);

        gate_allows && self.pricing_info().has_free_trial
    }

    /// Buy `product`. Ignored (returns `None`) while a purchase is already in
    /// flight or after one has succeeded.
    pub fn purchase(&self, product: IapProduct) -> Option<JoinHandle<()>> {
        let known = self.catalog.product(product.as_str()).is_some();
        let mut began = false;

        let accepted = self.shared.state.send_if_modified(|state| {
            if !state.accepts_purchase() {
                return false;
            }
            if known {
                self.shared.record_failure(None);
                *state = PurchaseState::Purchasing;
                began = true;
            } else {
                self.shared.record_failure(Some(BillingError::PurchaseFailed(format!(
                    "{} is not in the product catalog",
                    product.as_str()
                ))));
                *state = PurchaseState::Failed;
            }
            true
        });

        if !accepted {
            debug!(product = product.as_str(), "Purchase already in progress, ignoring");
            return None;
        }
        if !began {
            warn!(product = product.as_str(), "Product not in catalog, purchase failed");
            return None;
        }

        let attempt_id = Uuid::new_v4();
        let store = Arc::clone(&self.store);
        let shared = Arc::downgrade(&self.shared);
        info!(%attempt_id, product = product.as_str(), "Starting purchase");

        let task = async move {
            let outcome = store.purchase(product.as_str()).await;

            let Some(shared) = shared.upgrade() else {
                debug!("Purchase flow dropped before the store answered, discarding result");
                return;
            };

            let next = match outcome {
                Ok(transaction) => {
                    info!(transaction_id = %transaction.transaction_id, "Purchase completed");
                    PurchaseState::Purchased
                }
                Err(e) => {
                    if e == BillingError::PurchaseCancelled {
                        info!("Purchase cancelled by user");
                    } else {
                        warn!(
                            code = e.code(),
                            transient = e.is_transient(),
                            error = %e,
                            "Purchase failed"
                        );
                    }
                    shared.record_failure(Some(e));
                    PurchaseState::Failed
                }
            };

            shared.state.send_replace(next);
        };

        Some(tokio::spawn(task.instrument(info_span!(
            "purchase",
            %attempt_id,
            plan = product.plan().as_str(),
            product = product.as_str()
        ))))
    }
}
