//! Credential accessor
//!
//! [`CredentialManager`] is the single entry point application code uses
//! before an authenticated API call. It owns one [`TokenStore`] and one
//! [`OAuthFlow`]; construct it once and share it (for example behind an
//! `Arc`) rather than reaching for a global.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::callback::CallbackParams;
use super::client::OAuthClient;
use super::error::AuthError;
use super::flow::{FlowState, OAuthFlow};
use super::token_store::TokenStore;
use super::traits::{OAuthClientTrait, StateStore, UserAgent};
use super::types::{AuthorizationRequest, CredentialStatus, DEFAULT_REQUEST_TIMEOUT};
use crate::time::Clock;

/// Default seconds before expiry at which a proactive refresh happens
pub const DEFAULT_REFRESH_LEEWAY: Duration = Duration::from_secs(60);

/// Poll interval while no token is held
const IDLE_POLL: Duration = Duration::from_secs(60);

/// Tunables for [`CredentialManager`]
#[derive(Debug, Clone, Copy)]
pub struct ManagerOptions {
    /// Refresh this long before the access token expires
    pub refresh_leeway: Duration,
    /// Upper bound on each token endpoint request
    pub request_timeout: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self { refresh_leeway: DEFAULT_REFRESH_LEEWAY, request_timeout: DEFAULT_REQUEST_TIMEOUT }
    }
}

/// Process-wide credential holder and guarded accessor
pub struct CredentialManager<C: OAuthClientTrait + 'static = OAuthClient> {
    flow: Arc<OAuthFlow<C>>,
    tokens: Arc<TokenStore>,
    refresh_leeway: chrono::Duration,
}

impl<C: OAuthClientTrait + 'static> CredentialManager<C> {
    /// Wire a manager from its collaborators
    #[must_use]
    pub fn new(
        client: C,
        state_store: Arc<dyn StateStore>,
        user_agent: Arc<dyn UserAgent>,
        clock: Arc<dyn Clock>,
        options: ManagerOptions,
    ) -> Self {
        let tokens = Arc::new(TokenStore::new(clock));
        let flow = OAuthFlow::new(client, state_store, user_agent, Arc::clone(&tokens))
            .with_request_timeout(options.request_timeout);

        Self {
            flow: Arc::new(flow),
            tokens,
            refresh_leeway: chrono::Duration::from_std(options.refresh_leeway)
                .unwrap_or_else(|_| chrono::Duration::seconds(60)),
        }
    }

    /// Start a new authorization attempt
    ///
    /// # Errors
    /// See [`OAuthFlow::initiate_oauth_flow`].
    pub async fn initiate_oauth_flow(&self) -> Result<AuthorizationRequest, AuthError> {
        self.flow.initiate_oauth_flow().await
    }

    /// Complete an authorization attempt with the callback's parameters
    ///
    /// # Errors
    /// See [`OAuthFlow::handle_callback`].
    pub async fn handle_callback(&self, code: &str, state: &str) -> Result<bool, AuthError> {
        self.flow.handle_callback(code, state).await
    }

    /// Complete an authorization attempt from already-parsed parameters
    ///
    /// # Errors
    /// See [`OAuthFlow::handle_callback`].
    pub async fn handle_callback_params(&self, params: &CallbackParams) -> Result<bool, AuthError> {
        self.flow.handle_callback(&params.code, &params.state).await
    }

    /// Complete an authorization attempt from the full redirect URL
    ///
    /// # Errors
    /// Returns the parse errors of [`CallbackParams::from_url`] plus those of
    /// [`OAuthFlow::handle_callback`].
    pub async fn handle_callback_url(&self, url: &str) -> Result<bool, AuthError> {
        let params = CallbackParams::from_url(url)?;
        self.handle_callback_params(&params).await
    }

    /// Refresh the access token (single-flight)
    pub async fn refresh_access_token(&self) -> bool {
        self.flow.refresh_access_token().await
    }

    /// Current access token without any network activity
    #[must_use]
    pub fn get_access_token(&self) -> Option<String> {
        self.tokens.get_access_token()
    }

    /// `true` while a non-expired access token is held
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Authentication status with remaining lifetime
    #[must_use]
    pub fn status(&self) -> CredentialStatus {
        self.tokens.status()
    }

    /// Current phase of the authorization lifecycle
    #[must_use]
    pub fn flow_state(&self) -> FlowState {
        self.flow.flow_state()
    }

    /// Access token for an authenticated API call
    ///
    /// Returns the held token if still valid, otherwise attempts a refresh.
    /// If that fails too, a new authorization attempt is started and the
    /// caller is told to wait for the user to complete it.
    ///
    /// # Errors
    /// Returns `AuthError::ReauthenticationRequired` carrying the
    /// authorization URL once the user has been routed back through login,
    /// or the error that prevented starting that flow.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.tokens.get_access_token() {
            return Ok(token);
        }

        if self.flow.refresh_access_token().await {
            if let Some(token) = self.tokens.get_access_token() {
                return Ok(token);
            }
        }

        info!("No usable credentials; routing user through authorization");
        let request = self.flow.initiate_oauth_flow().await?;
        Err(AuthError::ReauthenticationRequired { authorization_url: request.url })
    }

    /// Delay until the background task should next consider refreshing
    #[must_use]
    pub fn next_refresh_delay(&self) -> Duration {
        refresh_delay(&self.tokens, self.refresh_leeway)
    }

    /// Start the background auto-refresh task
    ///
    /// Sleeps until the held token enters the refresh leeway, refreshes it,
    /// and repeats. Polls every minute while no token is held. A failed
    /// refresh is not retried: the task parks until a login installs a
    /// different refresh token. Runs until the returned handle is aborted or
    /// the runtime shuts down.
    pub fn spawn_auto_refresh(&self) -> JoinHandle<()> {
        let flow = Arc::clone(&self.flow);
        let tokens = Arc::clone(&self.tokens);
        let leeway = self.refresh_leeway;

        tokio::spawn(async move {
            info!("Starting token auto-refresh background task");

            // Refresh token the provider last rejected.
            let mut parked_on: Option<Option<String>> = None;

            loop {
                if let Some(rejected) = &parked_on {
                    if tokens.refresh_token() == *rejected {
                        tokio::time::sleep(IDLE_POLL).await;
                        continue;
                    }
                    info!("New credentials installed; resuming auto-refresh");
                    parked_on = None;
                }

                let delay = refresh_delay(&tokens, leeway);
                if !delay.is_zero() {
                    debug!(seconds = delay.as_secs(), "Auto-refresh sleeping until next check");
                    tokio::time::sleep(delay).await;
                }

                if !tokens.needs_refresh(leeway) {
                    continue;
                }

                info!("Auto-refresh: token expiring soon, refreshing");
                let attempted = tokens.refresh_token();
                if let Err(e) = flow.try_refresh_access_token().await {
                    warn!(error = %e, "Auto-refresh failed; re-authentication required");
                    parked_on = Some(attempted);
                }
            }
        })
    }

    /// Shared token store
    #[must_use]
    pub fn token_store(&self) -> Arc<TokenStore> {
        Arc::clone(&self.tokens)
    }

    /// Shared flow controller
    #[must_use]
    pub fn flow(&self) -> Arc<OAuthFlow<C>> {
        Arc::clone(&self.flow)
    }
}

fn refresh_delay(tokens: &TokenStore, leeway: chrono::Duration) -> Duration {
    let Some(current) = tokens.snapshot() else {
        return IDLE_POLL;
    };

    let now = tokens.clock().now();
    let due = current.refresh_due_at(leeway);
    if due <= now {
        Duration::ZERO
    } else {
        (due - now).to_std().unwrap_or(IDLE_POLL)
    }
}

impl<C: OAuthClientTrait + 'static> std::fmt::Debug for CredentialManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("flow", &self.flow)
            .field("status", &self.status())
            .field("refresh_leeway", &self.refresh_leeway)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::service.
    use super::*;
    use crate::auth::state_store::MemoryStateStore;
    use crate::testing::mocks::token_response;
    use crate::testing::{poll_until, MockOAuthClient, RecordingUserAgent};
    use crate::time::MockClock;

    fn create_test_manager() -> (CredentialManager<MockOAuthClient>, MockOAuthClient, MockClock) {
        let client = MockOAuthClient::new();
        let clock = MockClock::new();
        let manager = CredentialManager::new(
            client.clone(),
            Arc::new(MemoryStateStore::new()),
            Arc::new(RecordingUserAgent::new()),
            Arc::new(clock.clone()),
            ManagerOptions::default(),
        );
        (manager, client, clock)
    }

    async fn log_in(manager: &CredentialManager<MockOAuthClient>) {
        let request = manager.initiate_oauth_flow().await.unwrap();
        assert!(manager.handle_callback("C1", &request.state).await.unwrap());
    }

    /// Validates `CredentialManager::access_token` with a valid token.
    ///
    /// Assertions:
    /// - Confirms the held token is returned without a refresh.
    #[tokio::test]
    async fn test_access_token_uses_held_token() {
        let (manager, client, _) = create_test_manager();
        log_in(&manager).await;

        assert_eq!(manager.access_token().await.unwrap(), "mock_access_token");
        assert_eq!(client.refresh_calls(), 0);
    }

    /// Validates `CredentialManager::access_token` after expiry.
    ///
    /// Assertions:
    /// - Confirms the accessor refreshes and returns the new token.
    #[tokio::test]
    async fn test_access_token_refreshes_expired_token() {
        let (manager, client, clock) = create_test_manager();
        log_in(&manager).await;
        clock.advance(Duration::from_secs(3600));

        assert_eq!(manager.access_token().await.unwrap(), "refreshed_access_token");
        assert_eq!(client.refresh_calls(), 1);
    }

    /// Validates `CredentialManager::access_token` when refresh fails.
    ///
    /// Assertions:
    /// - Ensures `ReauthenticationRequired` carries a fresh authorization URL.
    /// - Confirms the flow is awaiting a new callback.
    #[tokio::test]
    async fn test_access_token_falls_back_to_reauthentication() {
        let (manager, client, clock) = create_test_manager();
        log_in(&manager).await;
        client.fail_refresh("invalid_grant");
        clock.advance(Duration::from_secs(3600));

        match manager.access_token().await {
            Err(AuthError::ReauthenticationRequired { authorization_url }) => {
                assert!(authorization_url.contains("state="));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(manager.flow_state(), FlowState::AwaitingCallback);
    }

    /// Validates `CredentialManager::handle_callback_url`.
    ///
    /// Assertions:
    /// - Ensures a full redirect URL completes the login.
    #[tokio::test]
    async fn test_handle_callback_url() {
        let (manager, _, _) = create_test_manager();
        let request = manager.initiate_oauth_flow().await.unwrap();
        let redirect = format!("http://127.0.0.1:8182/callback?code=C1&state={}", request.state);

        assert!(manager.handle_callback_url(&redirect).await.unwrap());
        assert!(manager.is_authenticated());
    }

    /// Validates `CredentialManager::next_refresh_delay`.
    ///
    /// Assertions:
    /// - Confirms the idle poll interval with no token.
    /// - Confirms the delay is lifetime minus leeway after login.
    /// - Confirms a zero delay once inside the leeway window.
    #[tokio::test]
    async fn test_next_refresh_delay() {
        let (manager, _, clock) = create_test_manager();
        assert_eq!(manager.next_refresh_delay(), IDLE_POLL);

        log_in(&manager).await;
        assert_eq!(manager.next_refresh_delay(), Duration::from_secs(3540));

        clock.advance(Duration::from_secs(3550));
        assert_eq!(manager.next_refresh_delay(), Duration::ZERO);
    }

    /// Validates that the auto-refresh task refreshes a token inside the
    /// leeway window.
    ///
    /// Assertions:
    /// - Ensures the background task issues a refresh.
    #[tokio::test]
    async fn test_auto_refresh_refreshes_due_token() {
        let (manager, client, clock) = create_test_manager();
        log_in(&manager).await;
        clock.advance(Duration::from_secs(3550));

        let handle = manager.spawn_auto_refresh();
        let refreshed = poll_until(Duration::from_secs(1), Duration::from_millis(10), || {
            let client = client.clone();
            async move { client.refresh_calls() > 0 }
        })
        .await;
        handle.abort();

        assert!(refreshed);
        assert_eq!(manager.get_access_token().as_deref(), Some("refreshed_access_token"));
    }

    /// Validates that the auto-refresh task does not retry a rejected
    /// refresh grant.
    ///
    /// Assertions:
    /// - Ensures exactly one refresh request is sent after `invalid_grant`,
    ///   however long the task keeps running.
    /// - Confirms refreshing resumes once a new login installs a different
    ///   refresh token.
    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_parks_after_rejected_grant() {
        let (manager, client, clock) = create_test_manager();
        log_in(&manager).await;
        client.fail_refresh("invalid_grant");
        clock.advance(Duration::from_secs(3550));

        let handle = manager.spawn_auto_refresh();
        let attempted = poll_until(Duration::from_secs(5), Duration::from_millis(10), || {
            let client = client.clone();
            async move { client.refresh_calls() > 0 }
        })
        .await;
        assert!(attempted);

        tokio::time::sleep(Duration::from_secs(30 * 60)).await;
        assert_eq!(client.refresh_calls(), 1);

        client.set_exchange_response(token_response("tok2", Some("ref2"), 3600));
        log_in(&manager).await;
        clock.advance(Duration::from_secs(3550));

        let resumed = poll_until(Duration::from_secs(300), Duration::from_secs(1), || {
            let client = client.clone();
            async move { client.refresh_calls() > 1 }
        })
        .await;
        handle.abort();

        assert!(resumed);
        assert_eq!(client.refresh_calls(), 2);
    }
}
