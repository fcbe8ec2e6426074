// Domain and wire models
pub mod common;
pub mod eligibility;
pub mod product;
pub mod purchase;
pub mod receipt;
pub mod wire;
