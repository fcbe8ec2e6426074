// Test doubles shared by the integration tests

use async_trait::async_trait;
use plus_billing::{
    error::{BillingError, Result},
    models::{
        common::IapProduct,
        product::{Offer, Product},
        purchase::StoreTransaction,
        receipt::{AuthToken, Receipt},
    },
    services::{EligibilityCheck, IapStore, ReceiptProvider, TokenProvider, Transport, TransportResponse},
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::Notify;

pub fn product(id: IapProduct, price: &str, offer: Option<&str>) -> Product {
    Product {
        identifier: id.as_str().to_string(),
        price: price.to_string(),
        offer: offer.map(|duration| Offer {
            duration: duration.to_string(),
            description: format!("Try it free for {}", duration),
        }),
    }
}

pub fn plus_products() -> Vec<Product> {
    vec![
        product(IapProduct::PlusMonthly, "$3.99", Some("1 month")),
        product(IapProduct::PlusYearly, "$39.99", Some("7 days")),
    ]
}

/// Scriptable platform store
#[derive(Default)]
pub struct FakeStore {
    pub products: Mutex<Vec<Product>>,
    pub unavailable: Mutex<bool>,
    pub fetch_holds: Mutex<VecDeque<Arc<Notify>>>,
    pub fetch_started: Notify,
    pub purchase_outcomes: Mutex<VecDeque<Result<StoreTransaction>>>,
    pub purchase_hold: Mutex<Option<Arc<Notify>>>,
    pub purchase_started: Notify,
    pub purchases: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn with_products(products: Vec<Product>) -> Arc<Self> {
        let store = Self::default();
        *store.products.lock().unwrap() = products;
        Arc::new(store)
    }

    pub fn hold_next_fetch(&self) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        self.fetch_holds.lock().unwrap().push_back(release.clone());
        release
    }

    pub fn hold_purchases(&self) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        *self.purchase_hold.lock().unwrap() = Some(release.clone());
        release
    }

    pub fn queue_purchase(&self, outcome: Result<StoreTransaction>) {
        self.purchase_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn purchases(&self) -> Vec<String> {
        self.purchases.lock().unwrap().clone()
    }
}

#[async_trait]
impl IapStore for FakeStore {
    async fn fetch_products(&self, _identifiers: &[&str]) -> Result<Vec<Product>> {
        let unavailable = *self.unavailable.lock().unwrap();
        let products = self.products.lock().unwrap().clone();
        let hold = self.fetch_holds.lock().unwrap().pop_front();
        self.fetch_started.notify_one();

        if let Some(release) = hold {
            release.notified().await;
        }

        if unavailable {
            return Err(BillingError::StoreUnavailable("store offline".to_string()));
        }
        Ok(products)
    }

    async fn purchase(&self, identifier: &str) -> Result<StoreTransaction> {
        self.purchases.lock().unwrap().push(identifier.to_string());
        let hold = self.purchase_hold.lock().unwrap().clone();
        self.purchase_started.notify_one();

        if let Some(release) = hold {
            release.notified().await;
        }

        self.purchase_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(StoreTransaction {
                    transaction_id: format!("txn-{}", identifier),
                    product_id: identifier.to_string(),
                })
            })
    }
}

/// Transport that replays canned responses and records calls
#[derive(Default)]
pub struct RecordingTransport {
    pub responses: Mutex<VecDeque<Result<TransportResponse>>>,
    pub calls: AtomicUsize,
    pub bodies: Mutex<Vec<Vec<u8>>>,
}

impl RecordingTransport {
    pub fn replying(response: Result<TransportResponse>) -> Arc<Self> {
        let transport = Self::default();
        transport.responses.lock().unwrap().push_back(response);
        Arc::new(transport)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Vec<u8>> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post(&self, _path: &str, _token: &AuthToken, body: Vec<u8>) -> Result<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(body);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BillingError::Network("no canned response".to_string())))
    }
}

pub struct FixedReceipt(pub Option<Receipt>);

#[async_trait]
impl ReceiptProvider for FixedReceipt {
    async fn receipt(&self) -> Option<Receipt> {
        self.0.clone()
    }
}

pub struct FailingTokens;

#[async_trait]
impl TokenProvider for FailingTokens {
    async fn token(&self) -> Result<AuthToken> {
        Err(BillingError::Network("token endpoint unreachable".to_string()))
    }
}

/// Gate check that waits for a release before answering
pub struct HeldCheck {
    pub release: Arc<Notify>,
    pub outcome: Result<bool>,
    pub calls: AtomicUsize,
}

impl HeldCheck {
    pub fn new(outcome: Result<bool>) -> Arc<Self> {
        Arc::new(Self {
            release: Arc::new(Notify::new()),
            outcome,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl EligibilityCheck for HeldCheck {
    async fn is_eligible(&self) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        self.outcome.clone()
    }
}
