// Library exports for testing and reuse
pub mod config;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use error::{BillingError, Result};
