//! OAuth flow controller
//!
//! Drives the authorization code grant across two invocations that may live
//! in different processes: [`OAuthFlow::initiate_oauth_flow`] persists a
//! nonce and sends the user agent to the provider, and
//! [`OAuthFlow::handle_callback`] checks the returned `state` against that
//! nonce before exchanging the code.
//!
//! ```text
//! Idle ──► AwaitingCallback ──► ExchangingCode ──► Authenticated
//!                                     │                  │
//!                                     ▼                  ▼
//!                                   Failed ◄──── RefreshingToken
//! ```
//!
//! Concurrent refresh calls collapse into a single token request; every
//! caller observes that request's outcome.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

use super::client::{OAuthClient, OAuthClientError};
use super::error::AuthError;
use super::state::{generate_state, state_prefix, validate_state};
use super::token_store::TokenStore;
use super::traits::{OAuthClientTrait, StateStore, UserAgent};
use super::types::{AuthorizationRequest, TokenResponse, DEFAULT_REQUEST_TIMEOUT};

/// State store key holding the pending authorization nonce
pub const OAUTH_STATE_KEY: &str = "oauth_state";

/// Observable phase of the authorization lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingCallback,
    ExchangingCode,
    Authenticated,
    RefreshingToken,
    Failed { reason: String },
}

#[derive(Debug, Default)]
struct RefreshRecord {
    epoch: u64,
    failure: Option<String>,
}

/// Authorization code flow controller
pub struct OAuthFlow<C: OAuthClientTrait + 'static = OAuthClient> {
    client: Arc<C>,
    state_store: Arc<dyn StateStore>,
    user_agent: Arc<dyn UserAgent>,
    tokens: Arc<TokenStore>,
    request_timeout: Duration,
    state: RwLock<FlowState>,
    exchange_gate: AsyncMutex<()>,
    refresh_gate: AsyncMutex<RefreshRecord>,
    refresh_epoch: AtomicU64,
}

impl<C: OAuthClientTrait + 'static> OAuthFlow<C> {
    /// Create a controller over the injected collaborators
    #[must_use]
    pub fn new(
        client: C,
        state_store: Arc<dyn StateStore>,
        user_agent: Arc<dyn UserAgent>,
        tokens: Arc<TokenStore>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            state_store,
            user_agent,
            tokens,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state: RwLock::new(FlowState::Idle),
            exchange_gate: AsyncMutex::new(()),
            refresh_gate: AsyncMutex::new(RefreshRecord::default()),
            refresh_epoch: AtomicU64::new(0),
        }
    }

    /// Bound each code exchange and refresh request by `timeout`
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn flow_state(&self) -> FlowState {
        self.state.read().clone()
    }

    fn transition(&self, next: FlowState) {
        let mut state = self.state.write();
        debug!(from = ?*state, to = ?next, "Flow state transition");
        *state = next;
    }

    /// Start a new authorization attempt
    ///
    /// Generates and persists a fresh nonce (replacing any earlier one), then
    /// navigates the user agent to the authorization URL.
    ///
    /// # Errors
    /// Returns `AuthError::StateStore` if the nonce cannot be persisted, or
    /// `AuthError::Navigation` if the user agent fails.
    pub async fn initiate_oauth_flow(&self) -> Result<AuthorizationRequest, AuthError> {
        let state = generate_state();
        self.state_store.save(OAUTH_STATE_KEY, &state).await?;

        let url = self.client.authorization_url(&state);
        self.transition(FlowState::AwaitingCallback);
        info!(state_prefix = state_prefix(&state), "Initiated OAuth authorization");

        self.user_agent.navigate(&url).map_err(AuthError::Navigation)?;

        Ok(AuthorizationRequest { url, state })
    }

    /// Complete an authorization attempt from the provider's callback
    ///
    /// Returns `Ok(true)` once tokens are stored and `Ok(false)` if the token
    /// endpoint rejected the code or could not be reached (including a
    /// replayed code). The persisted nonce is left in place, so a replay is
    /// rejected by the provider rather than by the state check.
    ///
    /// # Errors
    /// - `AuthError::MissingCallbackParameters` if `code` or `state` is empty
    /// - `AuthError::OAuthStateMismatch` if `state` differs from the persisted
    ///   nonce or no nonce is persisted; no network call is made
    /// - `AuthError::StateStore` if the nonce cannot be loaded
    pub async fn handle_callback(&self, code: &str, state: &str) -> Result<bool, AuthError> {
        if code.is_empty() || state.is_empty() {
            return Err(AuthError::MissingCallbackParameters);
        }

        match self.state_store.load(OAUTH_STATE_KEY).await? {
            Some(expected) if validate_state(&expected, state) => {}
            Some(expected) => {
                error!(
                    expected_prefix = state_prefix(&expected),
                    received_prefix = state_prefix(state),
                    "OAuth state mismatch; rejecting callback"
                );
                self.transition(FlowState::Failed { reason: "state mismatch".to_string() });
                return Err(AuthError::OAuthStateMismatch);
            }
            None => {
                error!(
                    received_prefix = state_prefix(state),
                    "Callback received with no authorization in progress"
                );
                self.transition(FlowState::Failed { reason: "state mismatch".to_string() });
                return Err(AuthError::OAuthStateMismatch);
            }
        }

        let _exchange = self.exchange_gate.lock().await;
        match self.exchange_code(code).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Authorization code exchange failed");
                Ok(false)
            }
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<(), AuthError> {
        self.transition(FlowState::ExchangingCode);

        let outcome = self
            .bounded(self.client.exchange_code(code))
            .await
            .map_err(AuthError::TokenExchangeFailed);

        match outcome {
            Ok(response) => {
                self.tokens.set_tokens(response);
                self.transition(FlowState::Authenticated);
                info!("Authorization code exchanged for tokens");
                Ok(())
            }
            Err(e) => {
                self.transition(FlowState::Failed { reason: e.to_string() });
                Err(e)
            }
        }
    }

    /// Refresh the access token, reporting success as a boolean
    ///
    /// Failure details are logged; the held token set is left untouched.
    pub async fn refresh_access_token(&self) -> bool {
        match self.try_refresh_access_token().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Access token refresh failed");
                false
            }
        }
    }

    /// Refresh the access token
    ///
    /// Callers that arrive while a refresh is in flight wait for it and share
    /// its outcome instead of issuing another request.
    ///
    /// # Errors
    /// Returns `AuthError::RefreshFailed` if no refresh token is held (no
    /// network call is made), the provider rejects the grant, or the request
    /// fails or times out.
    pub async fn try_refresh_access_token(&self) -> Result<(), AuthError> {
        if self.tokens.refresh_token().is_none() {
            debug!("Refresh skipped; no refresh token held");
            return Err(AuthError::RefreshFailed("no refresh token held".to_string()));
        }

        let ticket = self.refresh_epoch.load(Ordering::Acquire);
        let mut record = self.refresh_gate.lock().await;

        if record.epoch != ticket {
            debug!("Joined refresh that completed while waiting");
            return match &record.failure {
                None => Ok(()),
                Some(reason) => Err(AuthError::RefreshFailed(reason.clone())),
            };
        }

        let outcome = self.perform_refresh().await;

        record.epoch = ticket.wrapping_add(1);
        record.failure = outcome.as_ref().err().map(ToString::to_string);
        self.refresh_epoch.store(record.epoch, Ordering::Release);

        outcome.map_err(AuthError::RefreshFailed)
    }

    async fn perform_refresh(&self) -> Result<(), String> {
        let refresh_token =
            self.tokens.refresh_token().ok_or_else(|| "no refresh token held".to_string())?;

        self.transition(FlowState::RefreshingToken);

        match self.bounded(self.client.refresh_token(&refresh_token)).await {
            Ok(response) => {
                self.tokens.set_tokens(response);
                self.transition(FlowState::Authenticated);
                info!("Access token refreshed");
                Ok(())
            }
            Err(reason) => {
                self.transition(FlowState::Failed { reason: reason.clone() });
                Err(reason)
            }
        }
    }

    async fn bounded<F>(&self, request: F) -> Result<TokenResponse, String>
    where
        F: Future<Output = Result<TokenResponse, OAuthClientError>>,
    {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "token endpoint did not respond within {}s",
                self.request_timeout.as_secs_f64()
            )),
        }
    }

    /// Token store this controller writes to
    #[must_use]
    pub fn token_store(&self) -> Arc<TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Underlying OAuth client
    #[must_use]
    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }
}

impl<C: OAuthClientTrait + 'static> std::fmt::Debug for OAuthFlow<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthFlow")
            .field("redirect_uri", &self.client.redirect_uri())
            .field("state", &self.flow_state())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
