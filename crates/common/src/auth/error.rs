//! Error taxonomy for the OAuth credential lifecycle

use std::time::Duration;

use thiserror::Error;

use crate::error::{ErrorClassification, ErrorSeverity};

/// Failures surfaced by the flow controller and credential accessor
#[derive(Debug, Error)]
pub enum AuthError {
    /// Callback arrived without a `code` or `state` parameter
    #[error("Missing required OAuth parameters")]
    MissingCallbackParameters,

    /// Provider redirected back with an `error` parameter
    #[error("Authorization denied by provider: {error}")]
    AuthorizationDenied {
        /// OAuth error code (e.g. `access_denied`)
        error: String,
        /// Optional human-readable description from the provider
        description: Option<String>,
    },

    /// Callback state does not match the persisted nonce (or none is
    /// persisted)
    #[error("OAuth state mismatch")]
    OAuthStateMismatch,

    /// Token endpoint rejected the authorization code or the request failed
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Refresh grant failed or no refresh token is held
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// No usable token; the user must complete the browser flow again
    #[error("Re-authentication required; authorize at {authorization_url}")]
    ReauthenticationRequired {
        /// Authorization URL the user agent was pointed at
        authorization_url: String,
    },

    /// Persistent state store could not be read or written
    #[error(transparent)]
    StateStore(#[from] StateStoreError),

    /// User agent could not be navigated to the authorization URL
    #[error("Failed to open authorization URL: {0}")]
    Navigation(String),
}

impl ErrorClassification for AuthError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::TokenExchangeFailed(_) | Self::StateStore(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OAuthStateMismatch => ErrorSeverity::Critical,
            Self::ReauthenticationRequired { .. } | Self::AuthorizationDenied { .. } => {
                ErrorSeverity::Info
            }
            Self::TokenExchangeFailed(_) | Self::RefreshFailed(_) | Self::Navigation(_) => {
                ErrorSeverity::Warning
            }
            Self::MissingCallbackParameters | Self::StateStore(_) => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::OAuthStateMismatch)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::StateStore(_) => Some(Duration::from_secs(1)),
            _ => None,
        }
    }
}

/// Failures of a [`crate::auth::StateStore`] backend
#[derive(Debug, Error)]
pub enum StateStoreError {
    /// Backing file could not be read or written
    #[error("State store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backing data exists but is not valid JSON
    #[error("State store data is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    /// OS keychain rejected the operation
    #[error("Keychain access failed: {0}")]
    Keychain(String),
}

#[cfg(feature = "platform")]
impl From<crate::security::KeychainError> for StateStoreError {
    fn from(err: crate::security::KeychainError) -> Self {
        Self::Keychain(err.to_string())
    }
}
