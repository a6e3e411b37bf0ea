//! In-memory holder of the current credentials
//!
//! The store is the only owner of the live [`TokenSet`]; callers receive
//! clones. Expiry is computed against the injected [`Clock`], so
//! `expires_at = clock.now() + expires_in` at the moment a response is
//! recorded.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::types::{CredentialStatus, TokenResponse, TokenSet};
use crate::time::Clock;

/// Thread-safe holder of the current token set
#[derive(Debug)]
pub struct TokenStore {
    clock: Arc<dyn Clock>,
    current: RwLock<Option<TokenSet>>,
}

impl TokenStore {
    /// Create an empty store reading time from `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, current: RwLock::new(None) }
    }

    /// Record a validated token response
    ///
    /// A response without a refresh token keeps the previously held one, so
    /// providers that only rotate refresh tokens occasionally do not log the
    /// user out.
    pub fn set_tokens(&self, response: TokenResponse) -> TokenSet {
        let now = self.clock.now();
        let mut current = self.current.write();

        let mut tokens = TokenSet::from_response(response, now);
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = current.as_ref().and_then(|t| t.refresh_token.clone());
        }

        info!(
            expires_at = %tokens.expires_at,
            has_refresh_token = tokens.refresh_token.is_some(),
            "Stored new access token"
        );

        *current = Some(tokens.clone());
        tokens
    }

    /// Current access token if one is held and not yet expired
    #[must_use]
    pub fn get_access_token(&self) -> Option<String> {
        let now = self.clock.now();
        let current = self.current.read();
        match current.as_ref() {
            Some(tokens) if tokens.is_valid_at(now) => Some(tokens.access_token.clone()),
            Some(_) => {
                debug!("Held access token has expired");
                None
            }
            None => None,
        }
    }

    /// `true` exactly when [`Self::get_access_token`] would return a token
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let now = self.clock.now();
        self.current.read().as_ref().is_some_and(|t| t.is_valid_at(now))
    }

    /// Refresh token, held independently of access-token expiry
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.current.read().as_ref().and_then(|t| t.refresh_token.clone())
    }

    /// `true` if any token set is held, expired or not
    #[must_use]
    pub fn has_tokens(&self) -> bool {
        self.current.read().is_some()
    }

    /// Copy of the held token set
    #[must_use]
    pub fn snapshot(&self) -> Option<TokenSet> {
        self.current.read().clone()
    }

    /// Whole seconds until the access token expires
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        let now = self.clock.now();
        self.current.read().as_ref().map(|t| t.seconds_until_expiry(now))
    }

    /// `true` when a token is held and its refresh point has passed
    #[must_use]
    pub fn needs_refresh(&self, leeway: chrono::Duration) -> bool {
        let now = self.clock.now();
        self.current.read().as_ref().is_some_and(|t| now >= t.refresh_due_at(leeway))
    }

    /// Authentication status with remaining lifetime
    #[must_use]
    pub fn status(&self) -> CredentialStatus {
        let now = self.clock.now();
        match self.current.read().as_ref() {
            Some(t) if t.is_valid_at(now) => {
                CredentialStatus::Authenticated { expires_in_secs: t.seconds_until_expiry(now) }
            }
            _ => CredentialStatus::Unauthenticated,
        }
    }

    /// Clock the store measures expiry against
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::token_store.
    use std::time::Duration;

    use super::*;
    use crate::time::MockClock;

    fn response(access: &str, refresh: Option<&str>, expires_in: i64) -> TokenResponse {
        let body = serde_json::json!({
            "access_token": access,
            "refresh_token": refresh,
            "expires_in": expires_in,
        });
        TokenResponse::from_slice(body.to_string().as_bytes()).unwrap()
    }

    fn create_test_store() -> (TokenStore, MockClock) {
        let clock = MockClock::new();
        (TokenStore::new(Arc::new(clock.clone())), clock)
    }

    /// Validates `TokenStore::new` initial state.
    ///
    /// Assertions:
    /// - Ensures no token, no refresh token and unauthenticated status.
    #[test]
    fn test_empty_store() {
        let (store, _) = create_test_store();
        assert!(store.get_access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(!store.is_authenticated());
        assert_eq!(store.status(), CredentialStatus::Unauthenticated);
        assert!(store.seconds_until_expiry().is_none());
    }

    /// Validates the expiry boundary of `TokenStore::get_access_token`.
    ///
    /// Assertions:
    /// - Confirms the token is returned one second before expiry.
    /// - Ensures it is withheld at and after the expiry instant.
    /// - Ensures the refresh token survives access-token expiry.
    #[test]
    fn test_access_token_expiry_boundary() {
        let (store, clock) = create_test_store();
        store.set_tokens(response("AT1", Some("RT1"), 3600));

        clock.advance(Duration::from_secs(3599));
        assert_eq!(store.get_access_token().as_deref(), Some("AT1"));
        assert!(store.is_authenticated());

        clock.advance(Duration::from_secs(1));
        assert!(store.get_access_token().is_none());
        assert!(!store.is_authenticated());
        assert_eq!(store.refresh_token().as_deref(), Some("RT1"));
    }

    /// Validates refresh-token retention in `TokenStore::set_tokens`.
    ///
    /// Assertions:
    /// - Confirms a response without a refresh token keeps the previous one.
    /// - Confirms a response with a new refresh token replaces it.
    #[test]
    fn test_refresh_token_retention() {
        let (store, _) = create_test_store();
        store.set_tokens(response("AT1", Some("RT1"), 3600));
        store.set_tokens(response("AT2", None, 3600));
        assert_eq!(store.get_access_token().as_deref(), Some("AT2"));
        assert_eq!(store.refresh_token().as_deref(), Some("RT1"));

        store.set_tokens(response("AT3", Some("RT2"), 3600));
        assert_eq!(store.refresh_token().as_deref(), Some("RT2"));
    }

    /// Validates `TokenStore::needs_refresh` and `TokenStore::status`.
    ///
    /// Assertions:
    /// - Ensures refresh is not due before the leeway window.
    /// - Ensures refresh is due inside it while status stays authenticated.
    #[test]
    fn test_needs_refresh_within_leeway() {
        let (store, clock) = create_test_store();
        let leeway = chrono::Duration::seconds(60);
        store.set_tokens(response("AT1", Some("RT1"), 3600));

        assert!(!store.needs_refresh(leeway));
        assert_eq!(store.status(), CredentialStatus::Authenticated { expires_in_secs: 3600 });

        clock.advance(Duration::from_secs(3545));
        assert!(store.needs_refresh(leeway));
        assert_eq!(store.status(), CredentialStatus::Authenticated { expires_in_secs: 55 });
    }
}
