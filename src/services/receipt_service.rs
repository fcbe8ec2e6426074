use async_trait::async_trait;
use std::{io::ErrorKind, path::PathBuf, sync::Arc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    config::ReceiptConfig,
    error::{BillingError, Result},
    models::receipt::Receipt,
};

/// Source of the locally cached purchase receipt.
///
/// `None` is the normal answer for users who never purchased anything.
#[async_trait]
pub trait ReceiptProvider: Send + Sync {
    async fn receipt(&self) -> Option<Receipt>;
}

/// Asks the platform store to re-issue the receipt
#[async_trait]
pub trait ReceiptRefresher: Send + Sync {
    async fn refresh_receipt(&self) -> Result<()>;
}

/// Reads the receipt file the platform keeps on disk
pub struct FileReceiptProvider {
    path: PathBuf,
    refresher: Option<Arc<dyn ReceiptRefresher>>,
}

impl FileReceiptProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            refresher: None,
        }
    }

    pub fn from_config(config: &ReceiptConfig) -> Self {
        Self::new(config.path.clone())
    }

    pub fn with_refresher(mut self, refresher: Arc<dyn ReceiptRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Fire-and-forget refresh. Readers keep getting the last-known receipt
    /// until the platform rewrites the file.
    pub fn refresh<F>(&self, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let refresher = self.refresher.clone();

        tokio::spawn(async move {
            let result = match refresher {
                Some(refresher) => refresher.refresh_receipt().await,
                None => Err(BillingError::StoreUnavailable(
                    "No receipt refresher configured".to_string(),
                )),
            };

            match &result {
                Ok(()) => info!("Receipt refresh completed"),
                Err(e) => warn!(code = e.code(), error = %e, "Receipt refresh failed"),
            }

            on_complete(result);
        })
    }
}

#[async_trait]
impl ReceiptProvider for FileReceiptProvider {
    async fn receipt(&self) -> Option<Receipt> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let receipt = Receipt::new(bytes);
                if receipt.is_empty() {
                    debug!(path = %self.path.display(), "Receipt file is empty");
                    return None;
                }
                Some(receipt)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No receipt on disk");
                None
            }
            Err(e) => {
                // Unreadable counts as absent
                warn!(path = %self.path.display(), error = %e, "Failed to read receipt");
                None
            }
        }
    }
}
