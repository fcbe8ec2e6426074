use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::Result,
    models::purchase::GateState,
    services::{eligibility_service::EligibilityClient, receipt_service::ReceiptProvider},
};

/// The asynchronous question a gate resolves
#[async_trait]
pub trait EligibilityCheck: Send + Sync {
    async fn is_eligible(&self) -> Result<bool>;
}

/// Promotional-pricing eligibility for the current store receipt
pub struct ReceiptEligibility {
    receipts: Arc<dyn ReceiptProvider>,
    client: Arc<EligibilityClient>,
}

impl ReceiptEligibility {
    pub fn new(receipts: Arc<dyn ReceiptProvider>, client: Arc<EligibilityClient>) -> Self {
        Self { receipts, client }
    }
}

#[async_trait]
impl EligibilityCheck for ReceiptEligibility {
    #[instrument(skip(self))]
    async fn is_eligible(&self) -> Result<bool> {
        let Some(receipt) = self.receipts.receipt().await else {
            info!("No receipt present, skipping eligibility check");
            return Ok(false);
        };

        Ok(self.client.check_eligibility(&receipt).await?.eligible)
    }
}

struct GateShared {
    state: watch::Sender<GateState>,
}

/// One-shot `checking -> allowed | disallowed` gate, owned by one screen.
///
/// Only the first `start` runs a check and the resolved state never changes
/// afterwards. Any failure resolves to `Disallowed`. Dropping the gate while
/// the check is pending turns the late result into a no-op.
pub struct EligibilityGate {
    check: Arc<dyn EligibilityCheck>,
    shared: Arc<GateShared>,
    started: AtomicBool,
}

impl EligibilityGate {
    pub fn new(check: Arc<dyn EligibilityCheck>) -> Self {
        let (state, _) = watch::channel(GateState::Checking);
        Self {
            check,
            shared: Arc::new(GateShared { state }),
            started: AtomicBool::new(false),
        }
    }

    /// Run the check in the background. Returns `None` if a check was
    /// already started on this gate.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("Eligibility check already started, ignoring");
            return None;
        }

        let check = Arc::clone(&self.check);
        let shared = Arc::downgrade(&self.shared);

        Some(tokio::spawn(async move {
            let outcome = check.is_eligible().await;

            let Some(shared) = shared.upgrade() else {
                debug!("Gate dropped before the check completed, discarding result");
                return;
            };

            let resolved = match outcome {
                Ok(true) => GateState::Allowed,
                Ok(false) => GateState::Disallowed,
                Err(e) => {
                    warn!(
                        code = e.code(),
                        transient = e.is_transient(),
                        error = %e,
                        "Eligibility check failed, disallowing"
                    );
                    GateState::Disallowed
                }
            };

            info!(state = ?resolved, "Eligibility resolved");
            shared.state.send_replace(resolved);
        }))
    }

    pub fn state(&self) -> GateState {
        *self.shared.state.borrow()
    }

    /// State updates; the stream ends when the gate is dropped
    pub fn observe(&self) -> watch::Receiver<GateState> {
        self.shared.state.subscribe()
    }
}
