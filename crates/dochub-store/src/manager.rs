//! Store manager that selects the configured adapter.

use std::sync::Arc;

use tracing::info;

use dochub_core::config::store::StoreConfig;
use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::traits::store::FolderStore;

/// Selects and holds the configured folder-store adapter.
#[derive(Debug, Clone)]
pub struct StoreManager {
    inner: Arc<dyn FolderStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn FolderStore> = match config.provider.as_str() {
            "remote" => {
                info!(base_url = %config.remote.base_url, "Initializing remote folder store");
                Arc::new(crate::providers::remote::RemoteFolderStore::new(
                    &config.remote,
                )?)
            }
            "memory" => {
                info!("Initializing in-memory folder store");
                Arc::new(crate::providers::memory::MemoryFolderStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: remote, memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing adapter (for testing).
    pub fn from_store(store: Arc<dyn FolderStore>) -> Self {
        Self { inner: store }
    }

    /// The configured adapter.
    pub fn store(&self) -> Arc<dyn FolderStore> {
        self.inner.clone()
    }
}
