use anyhow::Context;
use plus_billing::{
    config::Config,
    services::{
        EligibilityClient, EligibilityGate, FileReceiptProvider, HttpTransport,
        ReceiptEligibility, StaticTokenProvider,
    },
};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,plus_billing=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;

    tracing::info!(
        "Loaded configuration - API: {}, receipt: {}",
        config.api.base_url,
        config.receipt.path.display()
    );

    let transport =
        Arc::new(HttpTransport::new(&config.api).context("Failed to build HTTP client")?);
    let tokens = Arc::new(StaticTokenProvider::from_config(&config.auth));
    let client = Arc::new(EligibilityClient::new(transport, tokens));
    let receipts = Arc::new(FileReceiptProvider::from_config(&config.receipt));

    let gate = EligibilityGate::new(Arc::new(ReceiptEligibility::new(receipts, client)));
    if let Some(check) = gate.start() {
        check.await?;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "eligibility": gate.state() }))?
    );

    Ok(())
}
