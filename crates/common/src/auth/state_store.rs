//! In-process and keychain-backed [`StateStore`] implementations
//!
//! The file-backed store used by the CLI lives in `chainview-infra`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::StateStoreError;
use super::traits::StateStore;

/// Process-local state store
///
/// Values do not survive a restart. Clones share the same map, which lets a
/// test hand one clone to a manager and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStateStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous read used by tests
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn save(&self, key: &str, value: &str) -> Result<(), StateStoreError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StateStoreError> {
        Ok(self.get(key))
    }
}

#[cfg(feature = "platform")]
pub use keychain::KeychainStateStore;

#[cfg(feature = "platform")]
mod keychain {
    use async_trait::async_trait;

    use crate::auth::error::StateStoreError;
    use crate::auth::traits::StateStore;
    use crate::security::{KeychainError, KeychainProvider, SecretStore};

    /// State store that files each key as a keychain entry
    #[derive(Debug, Clone)]
    pub struct KeychainStateStore<S: SecretStore = KeychainProvider> {
        secrets: S,
    }

    impl KeychainStateStore<KeychainProvider> {
        /// Store entries under the given keychain service name
        pub fn new(service_name: impl Into<String>) -> Self {
            Self { secrets: KeychainProvider::new(service_name) }
        }
    }

    impl<S: SecretStore> KeychainStateStore<S> {
        /// Wrap an arbitrary secret backend
        pub fn with_backend(secrets: S) -> Self {
            Self { secrets }
        }
    }

    #[async_trait]
    impl<S: SecretStore> StateStore for KeychainStateStore<S> {
        async fn save(&self, key: &str, value: &str) -> Result<(), StateStoreError> {
            self.secrets.set_secret(key, value)?;
            Ok(())
        }

        async fn load(&self, key: &str) -> Result<Option<String>, StateStoreError> {
            match self.secrets.get_secret(key) {
                Ok(value) => Ok(Some(value)),
                Err(KeychainError::NotFound) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::state_store.
    use super::*;

    /// Validates `MemoryStateStore` save/load semantics.
    ///
    /// Assertions:
    /// - Ensures an unknown key loads as `None`.
    /// - Ensures a later save replaces the earlier value.
    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemoryStateStore::new();
        assert!(store.load("oauth_state").await.unwrap().is_none());

        store.save("oauth_state", "first").await.unwrap();
        store.save("oauth_state", "second").await.unwrap();
        assert_eq!(store.load("oauth_state").await.unwrap().as_deref(), Some("second"));
    }

    /// Validates that `MemoryStateStore` clones share storage.
    ///
    /// Assertions:
    /// - Confirms a value saved through one clone is visible via another.
    #[tokio::test]
    async fn test_memory_store_clones_share_entries() {
        let store = MemoryStateStore::new();
        let view = store.clone();
        store.save("k", "v").await.unwrap();
        assert_eq!(view.get("k").as_deref(), Some("v"));
    }

    /// Validates `KeychainStateStore` over the mock keychain.
    ///
    /// Assertions:
    /// - Ensures a missing entry loads as `None` rather than an error.
    /// - Confirms a saved value round-trips.
    #[cfg(feature = "platform")]
    #[tokio::test]
    async fn test_keychain_store_with_mock_backend() {
        use crate::testing::MockKeychainProvider;

        let store = KeychainStateStore::with_backend(MockKeychainProvider::new("test"));
        assert!(store.load("oauth_state").await.unwrap().is_none());

        store.save("oauth_state", "nonce").await.unwrap();
        assert_eq!(store.load("oauth_state").await.unwrap().as_deref(), Some("nonce"));
    }
}
