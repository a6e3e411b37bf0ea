//! Credential lifecycle primitives shared across ChainView crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification, clocks, expiry formatting
//! - `runtime`: OAuth flow, token store, state stores, test doubles
//! - `platform`: OS keychain integration (keychain-backed state store)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod auth;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod security;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod testing;

#[cfg(feature = "runtime")]
pub use auth::{
    AuthError, AuthorizationRequest, CredentialManager, CredentialStatus, FlowState, OAuthClient,
    OAuthConfig, StateStore, StateStoreError, TokenStore, UserAgent,
};
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity};
#[cfg(feature = "platform")]
pub use security::{KeychainError, KeychainProvider};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
