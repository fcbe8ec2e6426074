// Service modules
pub mod catalog_service;
pub mod eligibility_service;
pub mod gate_service;
pub mod purchase_service;
pub mod receipt_service;
pub mod store;
pub mod transport;

pub use catalog_service::ProductCatalog;
pub use eligibility_service::{EligibilityClient, StaticTokenProvider, TokenProvider};
pub use gate_service::{EligibilityCheck, EligibilityGate, ReceiptEligibility};
pub use purchase_service::PurchaseOrchestrator;
pub use receipt_service::{FileReceiptProvider, ReceiptProvider, ReceiptRefresher};
pub use store::IapStore;
pub use transport::{HttpTransport, Transport, TransportResponse};
