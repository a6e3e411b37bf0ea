//! State store backends and the factory that picks one from configuration

pub mod file_state_store;

use std::sync::Arc;

use chainview_common::auth::{KeychainStateStore, MemoryStateStore, StateStore};
use chainview_domain::{Result, StateStoreBackend, StorageConfig};
pub use file_state_store::{default_state_path, FileStateStore};
use tracing::info;

/// Build the configured state store
///
/// # Errors
/// Returns `ChainViewError::Config` when the `file` backend is selected but
/// no path is configured and the platform has no local data directory.
pub fn build_state_store(config: &StorageConfig) -> Result<Arc<dyn StateStore>> {
    let store: Arc<dyn StateStore> = match config.backend {
        StateStoreBackend::File => {
            let path = match &config.path {
                Some(path) => path.clone(),
                None => default_state_path()?,
            };
            info!(path = %path.display(), "Using file state store");
            Arc::new(FileStateStore::new(path))
        }
        StateStoreBackend::Keychain => {
            info!(service = %config.keychain_service, "Using keychain state store");
            Arc::new(KeychainStateStore::new(config.keychain_service.clone()))
        }
        StateStoreBackend::Memory => {
            info!("Using in-memory state store; pending authorizations will not survive a restart");
            Arc::new(MemoryStateStore::new())
        }
    };
    Ok(store)
}
