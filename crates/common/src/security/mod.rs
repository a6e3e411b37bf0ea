//! Platform keychain access
//!
//! Thin wrapper over the OS credential vault (macOS Keychain, Windows
//! Credential Manager, Linux Secret Service) used by the keychain-backed
//! OAuth state store.

pub mod keychain;

pub use keychain::{KeychainError, KeychainProvider, SecretStore};
