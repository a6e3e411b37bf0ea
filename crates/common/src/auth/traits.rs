//! Traits at the seams of the credential lifecycle
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (token endpoint, persistent storage, browser).

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::error::StateStoreError;
use super::types::TokenResponse;

/// Trait for OAuth token endpoint operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Build the authorization URL carrying `state`
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    /// Returns error if the request fails, the provider rejects the code, or
    /// the response body is malformed
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthClientError>;

    /// Obtain a new access token with a refresh token
    ///
    /// # Errors
    /// Returns error if the request fails, the provider rejects the grant, or
    /// the response body is malformed
    async fn refresh_token(&self, refresh_token: &str)
        -> Result<TokenResponse, OAuthClientError>;

    /// Get the configured redirect URI
    fn redirect_uri(&self) -> &str;
}

/// Durable string key/value storage that survives process restarts
///
/// The flow controller only uses the `oauth_state` key. Values written by
/// `save` must be visible to `load` in a later process instance.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persist `value` under `key`, replacing any previous value
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    async fn save(&self, key: &str, value: &str) -> Result<(), StateStoreError>;

    /// Load the value under `key`, or `None` if nothing was saved
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    async fn load(&self, key: &str) -> Result<Option<String>, StateStoreError>;
}

/// Component able to send the user to a URL (system browser, webview, ...)
pub trait UserAgent: Send + Sync {
    /// Navigate to `url`
    ///
    /// # Errors
    /// Returns a description of the failure if navigation was not possible
    fn navigate(&self, url: &str) -> Result<(), String>;
}
