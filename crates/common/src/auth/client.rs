//! OAuth 2.0 client for the authorization code grant
//!
//! Handles the provider-facing half of the flow:
//! - Authorization URL building
//! - Authorization code exchange
//! - Token refresh

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, OAuthError, TokenResponse};
use crate::error::{ErrorClassification, ErrorSeverity};

/// Longest slice of an unexpected response body kept in an error
const MAX_ERROR_BODY: usize = 256;

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed (connect, TLS, timeout)
    RequestFailed(reqwest::Error),

    /// OAuth server returned a standard error body
    OAuthError { status: u16, error: OAuthError },

    /// OAuth server returned a non-success status without a standard body
    UnexpectedStatus { status: u16, body: String },

    /// Failed to parse or validate the response
    ParseError(String),
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::OAuthError { status, error } => write!(f, "OAuth error ({status}): {error}"),
            Self::UnexpectedStatus { status, body } => {
                write!(f, "Unexpected status {status} from token endpoint: {body}")
            }
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

impl ErrorClassification for OAuthClientError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            Self::OAuthError { .. } | Self::ParseError(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RequestFailed(_) | Self::UnexpectedStatus { .. } => ErrorSeverity::Warning,
            Self::OAuthError { .. } | Self::ParseError(_) => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        self.is_retryable().then(|| Duration::from_secs(5))
    }
}

/// OAuth 2.0 client bound to one provider registration
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Examples
    /// ```
    /// use chainview_common::auth::{OAuthClient, OAuthConfig};
    ///
    /// let config = OAuthConfig::new(
    ///     "client_id",
    ///     "client_secret",
    ///     "http://127.0.0.1:8182/callback",
    ///     "https://auth.example.com/authorize",
    ///     "https://auth.example.com/token",
    ///     "read",
    /// );
    /// let client = OAuthClient::new(config);
    /// ```
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Build the authorization URL for `state`
    ///
    /// Parameters are appended to any query the configured endpoint already
    /// carries.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let params = [
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", self.config.scope.as_str()),
            ("state", state),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let endpoint = self.config.authorization_endpoint.as_str();
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!("{endpoint}{separator}{query_string}")
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    /// Returns error if the request fails, the provider rejects the code, or
    /// the response is malformed
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthClientError> {
        let mut params = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", self.config.redirect_uri.clone()),
            ("client_id", self.config.client_id.clone()),
        ];

        if let Some(secret) = self.config.client_secret() {
            params.push(("client_secret", secret.to_string()));
        }

        self.post_token_request("authorization_code", &params).await
    }

    /// Obtain a new access token with a refresh token
    ///
    /// # Errors
    /// Returns error if the request fails, the provider rejects the grant, or
    /// the response is malformed
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        let mut params = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
            ("client_id", self.config.client_id.clone()),
        ];

        if let Some(secret) = self.config.client_secret() {
            params.push(("client_secret", secret.to_string()));
        }

        self.post_token_request("refresh_token", &params).await
    }

    async fn post_token_request(
        &self,
        grant_type: &str,
        params: &[(&str, String)],
    ) -> Result<TokenResponse, OAuthClientError> {
        debug!(grant_type, endpoint = %self.config.token_endpoint, "Posting token request");

        let response = self.client.post(&self.config.token_endpoint).form(params).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<OAuthError>(&body) {
                Ok(error) => OAuthClientError::OAuthError { status: status.as_u16(), error },
                Err(_) => {
                    let mut text = String::from_utf8_lossy(&body).into_owned();
                    if let Some((cut, _)) = text.char_indices().nth(MAX_ERROR_BODY) {
                        text.truncate(cut);
                    }
                    OAuthClientError::UnexpectedStatus { status: status.as_u16(), body: text }
                }
            });
        }

        TokenResponse::from_slice(&body)
    }

    /// Get the configured redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        self.authorization_url(state)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthClientError> {
        self.exchange_code(code).await
    }

    async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, OAuthClientError> {
        self.refresh_token(refresh_token).await
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uri()
    }
}
