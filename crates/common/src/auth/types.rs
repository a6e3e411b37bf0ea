//! OAuth 2.0 types and structures
//!
//! Token responses are validated when decoded: a response without a usable
//! `access_token` or with a non-positive `expires_in` is rejected before it
//! can reach the token store.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::OAuthClientError;

/// Default timeout applied to token endpoint requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth client registration and provider endpoints
#[derive(Clone)]
pub struct OAuthConfig {
    /// Client identifier issued by the provider
    pub client_id: String,
    /// Client secret sent with token requests (omitted when empty)
    pub client_secret: String,
    /// Redirect URI registered with the provider
    pub redirect_uri: String,
    /// Authorization endpoint the user agent is sent to
    pub authorization_endpoint: String,
    /// Token endpoint for code exchange and refresh
    pub token_endpoint: String,
    /// Space-separated scope string
    pub scope: String,
    /// Timeout for each token endpoint request
    pub request_timeout: Duration,
}

impl OAuthConfig {
    /// Create a configuration with the default request timeout
    ///
    /// # Examples
    /// ```
    /// use chainview_common::auth::OAuthConfig;
    ///
    /// let config = OAuthConfig::new(
    ///     "client",
    ///     "secret",
    ///     "http://127.0.0.1:8182/callback",
    ///     "https://auth.example.com/authorize",
    ///     "https://auth.example.com/token",
    ///     "read",
    /// );
    /// assert_eq!(config.request_timeout.as_secs(), 30);
    /// ```
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            scope: scope.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the token endpoint request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Client secret, if one is configured
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        (!self.client_secret.is_empty()).then_some(self.client_secret.as_str())
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("scope", &self.scope)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Longest token lifetime accepted from a provider (ten years)
pub const MAX_EXPIRES_IN_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// OAuth token response from the token endpoint (RFC 6749 §5.1)
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Decode and validate a token endpoint body
    ///
    /// # Errors
    /// Returns `OAuthClientError::ParseError` if the body is not JSON, lacks
    /// `access_token`/`expires_in`, carries an empty access token, or a
    /// lifetime outside `1..=MAX_EXPIRES_IN_SECS`.
    pub fn from_slice(body: &[u8]) -> Result<Self, OAuthClientError> {
        let response: Self = serde_json::from_slice(body)
            .map_err(|e| OAuthClientError::ParseError(e.to_string()))?;
        response.validate()
    }

    fn validate(mut self) -> Result<Self, OAuthClientError> {
        if self.access_token.trim().is_empty() {
            return Err(OAuthClientError::ParseError("access_token is empty".to_string()));
        }
        if self.expires_in <= 0 {
            return Err(OAuthClientError::ParseError(format!(
                "expires_in must be positive, got {}",
                self.expires_in
            )));
        }
        if self.expires_in > MAX_EXPIRES_IN_SECS {
            return Err(OAuthClientError::ParseError(format!(
                "expires_in exceeds {MAX_EXPIRES_IN_SECS}s, got {}",
                self.expires_in
            )));
        }
        if self.refresh_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            self.refresh_token = None;
        }
        Ok(self)
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Credentials held by the token store
///
/// `expires_at` is always `issued_at + expires_in`, where `issued_at` is the
/// local clock reading when the response arrived.
#[derive(Clone, Serialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Build a token set from a validated response received at `issued_at`
    ///
    /// An expiry that cannot be represented saturates at the latest instant
    /// `DateTime<Utc>` can hold.
    #[must_use]
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let expires_at = chrono::TimeDelta::try_seconds(response.expires_in)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in: response.expires_in,
            scope: response.scope,
            issued_at,
            expires_at,
        }
    }

    /// `true` while `now` is strictly before the expiry instant
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Whole seconds until expiry (negative once expired)
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }

    /// Instant at which a proactive refresh should happen
    ///
    /// The leeway is capped at half the token lifetime so short-lived tokens
    /// are not refreshed continuously.
    #[must_use]
    pub fn refresh_due_at(&self, leeway: chrono::Duration) -> DateTime<Utc> {
        let half_life = (self.expires_at - self.issued_at) / 2;
        self.expires_at - leeway.min(half_life)
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// OAuth error response from the provider (RFC 6749 §5.2)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OAuthError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}

/// Authorization URL handed to the user agent plus the nonce it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Snapshot of the credential holder for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    /// A non-expired access token is held
    Authenticated {
        /// Whole seconds until the access token expires
        expires_in_secs: i64,
    },
    /// No token, or the held token has expired
    Unauthenticated,
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::types.
    use super::*;

    fn issued_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-05T09:30:00Z").unwrap().with_timezone(&Utc)
    }

    /// Validates `TokenResponse::from_slice` behavior for a complete body.
    ///
    /// Assertions:
    /// - Confirms every field is decoded.
    #[test]
    fn test_token_response_decodes() {
        let body = br#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600,"token_type":"Bearer","scope":"read"}"#;
        let response = TokenResponse::from_slice(body).unwrap();
        assert_eq!(response.access_token, "AT1");
        assert_eq!(response.refresh_token.as_deref(), Some("RT1"));
        assert_eq!(response.expires_in, 3600);
        assert_eq!(response.scope.as_deref(), Some("read"));
    }

    /// Validates `TokenResponse::from_slice` behavior for malformed bodies.
    ///
    /// Assertions:
    /// - Ensures missing fields, empty tokens and non-positive or absurdly
    ///   long lifetimes are rejected as parse errors.
    #[test]
    fn test_token_response_rejects_malformed_bodies() {
        let bodies: [&[u8]; 7] = [
            b"not json",
            br#"{"expires_in":3600}"#,
            br#"{"access_token":"AT1"}"#,
            br#"{"access_token":"  ","expires_in":3600}"#,
            br#"{"access_token":"AT1","expires_in":0}"#,
            br#"{"access_token":"AT1","expires_in":315360001}"#,
            br#"{"access_token":"AT1","expires_in":9223372036854775807}"#,
        ];
        for body in bodies {
            assert!(matches!(
                TokenResponse::from_slice(body),
                Err(OAuthClientError::ParseError(_))
            ));
        }
    }

    /// Validates that an empty refresh token is treated as absent.
    ///
    /// Assertions:
    /// - Ensures `refresh_token` is `None`.
    #[test]
    fn test_empty_refresh_token_is_dropped() {
        let body = br#"{"access_token":"AT1","refresh_token":"","expires_in":60}"#;
        let response = TokenResponse::from_slice(body).unwrap();
        assert!(response.refresh_token.is_none());
    }

    /// Validates `TokenSet::from_response` expiry arithmetic.
    ///
    /// Assertions:
    /// - Confirms `expires_at` equals `issued_at + expires_in`.
    /// - Ensures validity flips exactly at the expiry instant.
    #[test]
    fn test_token_set_expiry() {
        let body = br#"{"access_token":"AT1","expires_in":3600}"#;
        let tokens = TokenSet::from_response(TokenResponse::from_slice(body).unwrap(), issued_at());

        assert_eq!(tokens.expires_at, issued_at() + chrono::Duration::seconds(3600));
        assert_eq!(tokens.token_type, "Bearer");
        assert!(tokens.is_valid_at(issued_at() + chrono::Duration::seconds(3599)));
        assert!(!tokens.is_valid_at(tokens.expires_at));
        assert_eq!(tokens.seconds_until_expiry(issued_at()), 3600);
    }

    /// Validates `TokenSet::from_response` with an unrepresentable lifetime.
    ///
    /// Assertions:
    /// - Ensures construction does not panic.
    /// - Confirms the expiry saturates at the latest representable instant.
    #[test]
    fn test_token_set_saturates_unrepresentable_expiry() {
        let response = TokenResponse {
            access_token: "AT1".to_string(),
            refresh_token: None,
            expires_in: i64::MAX,
            token_type: None,
            scope: None,
        };
        let tokens = TokenSet::from_response(response, issued_at());

        assert_eq!(tokens.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(tokens.is_valid_at(issued_at()));
    }

    /// Validates `TokenSet::refresh_due_at` leeway capping.
    ///
    /// Assertions:
    /// - Confirms the configured leeway applies to long-lived tokens.
    /// - Confirms short-lived tokens refresh at half-life.
    #[test]
    fn test_refresh_due_at_caps_leeway() {
        let long = TokenSet::from_response(
            TokenResponse::from_slice(br#"{"access_token":"A","expires_in":3600}"#).unwrap(),
            issued_at(),
        );
        let short = TokenSet::from_response(
            TokenResponse::from_slice(br#"{"access_token":"A","expires_in":10}"#).unwrap(),
            issued_at(),
        );
        let leeway = chrono::Duration::seconds(60);

        assert_eq!(long.refresh_due_at(leeway), issued_at() + chrono::Duration::seconds(3540));
        assert_eq!(short.refresh_due_at(leeway), issued_at() + chrono::Duration::seconds(5));
    }

    /// Validates that debug output never contains token material.
    ///
    /// Assertions:
    /// - Ensures neither token string appears in `{:?}` output.
    #[test]
    fn test_debug_redacts_tokens() {
        let body = br#"{"access_token":"secret-at","refresh_token":"secret-rt","expires_in":60}"#;
        let tokens = TokenSet::from_response(TokenResponse::from_slice(body).unwrap(), issued_at());
        let rendered = format!("{tokens:?}");
        assert!(!rendered.contains("secret-at"));
        assert!(!rendered.contains("secret-rt"));
    }

    /// Validates `OAuthConfig::client_secret` for public clients.
    ///
    /// Assertions:
    /// - Ensures an empty secret is reported as absent.
    #[test]
    fn test_empty_client_secret_is_absent() {
        let config = OAuthConfig::new("id", "", "http://localhost/cb", "https://a", "https://t", "");
        assert!(config.client_secret().is_none());
        assert!(!format!("{config:?}").contains("client_secret: \"\""));
    }
}
