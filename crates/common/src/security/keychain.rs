//! Generic keychain provider for secure credential storage
//!
//! ## Usage
//!
//! ```no_run
//! use chainview_common::security::{KeychainProvider, SecretStore};
//!
//! let keychain = KeychainProvider::new("ChainView.oauth");
//! keychain.set_secret("oauth_state", "nonce")?;
//! let secret = keychain.get_secret("oauth_state")?;
//! assert_eq!(secret, "nonce");
//! # Ok::<(), chainview_common::security::KeychainError>(())
//! ```

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Synchronous secret storage keyed by account name
///
/// Implemented by [`KeychainProvider`] and by
/// [`crate::testing::MockKeychainProvider`] so keychain-backed components can
/// be exercised without touching the OS vault.
pub trait SecretStore: Send + Sync {
    /// Store a secret, replacing any previous value
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if the backend rejects the write
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError>;

    /// Retrieve a secret
    ///
    /// # Errors
    /// Returns `KeychainError::NotFound` if no secret is stored under `key`
    fn get_secret(&self, key: &str) -> Result<String, KeychainError>;

    /// Delete a secret (idempotent)
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if the backend rejects the delete
    fn delete_secret(&self, key: &str) -> Result<(), KeychainError>;
}

/// Keychain provider scoped to one service name
#[derive(Debug, Clone)]
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service
    ///
    /// # Examples
    /// ```
    /// use chainview_common::security::KeychainProvider;
    ///
    /// let keychain = KeychainProvider::new("ChainView.oauth");
    /// assert_eq!(keychain.service_name(), "ChainView.oauth");
    /// ```
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    /// Service identifier entries are filed under
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn create_entry(&self, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&self.service_name, account).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to create keychain entry: {e}"))
        })
    }
}

impl SecretStore for KeychainProvider {
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        let entry = self.create_entry(key)?;
        entry.set_password(value).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to store secret for {key}: {e}"))
        })
    }

    fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        debug!(service = %self.service_name, key = %key, "Retrieving secret from keychain");

        let entry = self.create_entry(key)?;
        entry.get_password().map_err(|e| {
            if matches!(e, keyring::Error::NoEntry) {
                KeychainError::NotFound
            } else {
                KeychainError::AccessFailed(format!("Failed to retrieve secret for {key}: {e}"))
            }
        })
    }

    fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        let entry = self.create_entry(key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::AccessFailed(format!(
                "Failed to delete secret for {key}: {e}"
            ))),
        }
    }
}

/// Keychain error types
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Keychain access failed (permission denied, not available, etc.)
    #[error("Keychain access failed: {0}")]
    AccessFailed(String),

    /// Entry not found in keychain
    #[error("Entry not found")]
    NotFound,
}

#[cfg(test)]
mod tests {
    //! Unit tests for security::keychain.
    use super::*;
    use crate::testing::MockKeychainProvider;

    /// Validates `KeychainProvider::new` behavior for the keychain provider
    /// creation scenario.
    ///
    /// Assertions:
    /// - Confirms `keychain.service_name()` equals `"test-service"`.
    #[test]
    fn test_keychain_provider_creation() {
        let keychain = KeychainProvider::new("test-service");
        assert_eq!(keychain.service_name(), "test-service");
    }

    /// Validates `MockKeychainProvider` behavior for the set get and delete
    /// secret scenario.
    ///
    /// Assertions:
    /// - Confirms `retrieved` equals `"super-secret"`.
    /// - Ensures the secret is reported missing after deletion.
    #[test]
    fn test_set_get_and_delete_secret() {
        let keychain = MockKeychainProvider::new("ChainViewTest.secrets");

        keychain.set_secret("test.secret", "super-secret").unwrap();
        let retrieved = keychain.get_secret("test.secret").unwrap();
        assert_eq!(retrieved, "super-secret");

        keychain.delete_secret("test.secret").unwrap();
        assert!(matches!(keychain.get_secret("test.secret"), Err(KeychainError::NotFound)));
    }

    /// Validates `MockKeychainProvider` behavior for the delete secret
    /// idempotent scenario.
    ///
    /// Assertion coverage: ensures repeated deletes succeed.
    #[test]
    fn test_delete_secret_idempotent() {
        let keychain = MockKeychainProvider::new("ChainViewTest.secrets");

        keychain.delete_secret("missing").unwrap();
        keychain.set_secret("missing", "value").unwrap();
        keychain.delete_secret("missing").unwrap();
        keychain.delete_secret("missing").unwrap();
    }
}
