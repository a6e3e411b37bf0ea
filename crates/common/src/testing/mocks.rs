//! Mock implementations of the auth seams
//!
//! Provides mock objects for testing purposes. Every mock is cheap to clone
//! and clones share state, so a test can hand one clone to the component
//! under test and inspect another.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
#[cfg(feature = "platform")]
use std::collections::HashMap;

use crate::auth::{OAuthClientError, OAuthClientTrait, OAuthError, TokenResponse, UserAgent};
#[cfg(feature = "platform")]
use crate::security::{KeychainError, SecretStore};

const MOCK_AUTHORIZE_URL: &str = "https://mock.auth.example.com/authorize";
const MOCK_REDIRECT_URI: &str = "http://127.0.0.1:8182/callback";

/// Build a token response from literal parts
///
/// # Panics
/// Panics if `expires_in` is not positive or `access_token` is empty.
#[must_use]
pub fn token_response(access_token: &str, refresh_token: Option<&str>, expires_in: i64) -> TokenResponse {
    let body = serde_json::json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "expires_in": expires_in,
        "token_type": "Bearer",
    });
    match TokenResponse::from_slice(body.to_string().as_bytes()) {
        Ok(response) => response,
        Err(e) => panic!("invalid mock token response: {e}"),
    }
}

#[derive(Debug)]
struct MockOAuthState {
    exchange_response: TokenResponse,
    refresh_response: TokenResponse,
    exchange_failure: Option<String>,
    refresh_failure: Option<String>,
    delay: Duration,
}

/// Mock OAuth client that simulates the token endpoint without network calls
#[derive(Clone, Debug)]
pub struct MockOAuthClient {
    state: Arc<Mutex<MockOAuthState>>,
    exchange_calls: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
}

impl MockOAuthClient {
    /// Create a client that answers every exchange and refresh successfully
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockOAuthState {
                exchange_response: token_response(
                    "mock_access_token",
                    Some("mock_refresh_token"),
                    3600,
                ),
                refresh_response: token_response("refreshed_access_token", None, 3600),
                exchange_failure: None,
                refresh_failure: None,
                delay: Duration::ZERO,
            })),
            exchange_calls: Arc::new(AtomicUsize::new(0)),
            refresh_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Configure the response returned by `exchange_code`
    pub fn set_exchange_response(&self, response: TokenResponse) {
        self.state.lock().exchange_response = response;
    }

    /// Configure the response returned by `refresh_token`
    pub fn set_refresh_response(&self, response: TokenResponse) {
        self.state.lock().refresh_response = response;
    }

    /// Make `exchange_code` fail with the given OAuth error code
    pub fn fail_exchange(&self, error: &str) {
        self.state.lock().exchange_failure = Some(error.to_string());
    }

    /// Make `refresh_token` fail with the given OAuth error code
    pub fn fail_refresh(&self, error: &str) {
        self.state.lock().refresh_failure = Some(error.to_string());
    }

    /// Delay every response, simulating a slow token endpoint
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = delay;
    }

    /// Number of `exchange_code` calls so far
    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// Number of `refresh_token` calls so far
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn rejection(error: String) -> OAuthClientError {
        OAuthClientError::OAuthError {
            status: 400,
            error: OAuthError { error, error_description: None },
        }
    }
}

impl Default for MockOAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthClientTrait for MockOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        format!("{MOCK_AUTHORIZE_URL}?response_type=code&client_id=mock&state={state}")
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenResponse, OAuthClientError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, outcome) = {
            let state = self.state.lock();
            let outcome = match &state.exchange_failure {
                Some(error) => Err(error.clone()),
                None => Ok(state.exchange_response.clone()),
            };
            (state.delay, outcome)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome.map_err(Self::rejection)
    }

    async fn refresh_token(
        &self,
        _refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, outcome) = {
            let state = self.state.lock();
            let outcome = match &state.refresh_failure {
                Some(error) => Err(error.clone()),
                None => Ok(state.refresh_response.clone()),
            };
            (state.delay, outcome)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome.map_err(Self::rejection)
    }

    fn redirect_uri(&self) -> &str {
        MOCK_REDIRECT_URI
    }
}

/// User agent that records every navigation instead of opening a browser
#[derive(Clone, Debug, Default)]
pub struct RecordingUserAgent {
    urls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingUserAgent {
    /// Create an agent whose navigations always succeed
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an agent whose navigations always fail
    pub fn failing() -> Self {
        Self { urls: Arc::default(), fail: true }
    }

    /// Every URL navigated to, oldest first
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    /// Most recent URL navigated to
    #[must_use]
    pub fn last_url(&self) -> Option<String> {
        self.urls.lock().last().cloned()
    }
}

impl UserAgent for RecordingUserAgent {
    fn navigate(&self, url: &str) -> Result<(), String> {
        self.urls.lock().push(url.to_string());
        if self.fail {
            return Err("navigation disabled".to_string());
        }
        Ok(())
    }
}

/// Mock keychain provider that stores credentials in memory.
///
/// This implementation avoids platform keychain prompts and persists data only
/// for the lifetime of the mock, making it ideal for tests.
#[cfg(feature = "platform")]
#[derive(Clone, Debug)]
pub struct MockKeychainProvider {
    storage: Arc<Mutex<HashMap<String, String>>>,
    service_name: String,
}

#[cfg(feature = "platform")]
impl MockKeychainProvider {
    /// Create a new mock keychain provider with a service name for namespacing.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { storage: Arc::default(), service_name: service_name.into() }
    }

    /// Service name the mock was created with
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

#[cfg(feature = "platform")]
impl SecretStore for MockKeychainProvider {
    fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        self.storage.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        self.storage.lock().get(key).cloned().ok_or(KeychainError::NotFound)
    }

    fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        self.storage.lock().remove(key);
        Ok(())
    }
}
