//! Configuration management

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALLBACK_TIMEOUT_SECS, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_REFRESH_LEEWAY_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::impl_domain_enum_conversions;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub oauth: OAuthSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub callback: CallbackConfig,
}

/// OAuth provider settings
///
/// Endpoint hostnames and the scope string are provider specific and always
/// come from configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthSettings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default, skip_serializing)]
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_refresh_leeway_secs")]
    pub refresh_leeway_secs: u64,
}

impl fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("scope", &self.scope)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("refresh_leeway_secs", &self.refresh_leeway_secs)
            .finish()
    }
}

/// Backing medium for the authorization state nonce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateStoreBackend {
    /// JSON file on disk; survives process restarts
    #[default]
    File,
    /// Platform keychain entry
    Keychain,
    /// Process memory; only valid when initiation and callback share a process
    Memory,
}

impl_domain_enum_conversions!(StateStoreBackend {
    File => "file",
    Keychain => "keychain",
    Memory => "memory",
});

/// Persistent state store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StateStoreBackend,
    /// State file location for the `file` backend. Defaults to the user's data
    /// directory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_keychain_service")]
    pub keychain_service: String,
}

/// Loopback callback listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackConfig {
    #[serde(default = "default_callback_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StateStoreBackend::default(),
            path: None,
            keychain_service: default_keychain_service(),
        }
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self { timeout_secs: default_callback_timeout_secs(), open_browser: default_open_browser() }
    }
}

/// Non-fatal configuration problem reported at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    MissingClientId,
    MissingClientSecret,
    EmptyScope,
    InsecureEndpoint { field: &'static str, value: String },
    InvalidEndpoint { field: &'static str, value: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingClientId => write!(f, "client id is not configured"),
            Self::MissingClientSecret => write!(f, "client secret is not configured"),
            Self::EmptyScope => {
                write!(f, "scope is empty; confirm the scope name with the provider")
            }
            Self::InsecureEndpoint { field, value } => {
                write!(f, "{field} uses plain http outside loopback: {value}")
            }
            Self::InvalidEndpoint { field, value } => {
                write!(f, "{field} is not an http(s) URL: {value}")
            }
        }
    }
}

impl Config {
    /// Collect configuration problems that should be surfaced but never abort
    /// startup.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let oauth = &self.oauth;
        let mut warnings = Vec::new();

        if oauth.client_id.trim().is_empty() {
            warnings.push(ConfigWarning::MissingClientId);
        }
        if oauth.client_secret.trim().is_empty() {
            warnings.push(ConfigWarning::MissingClientSecret);
        }
        if oauth.scope.trim().is_empty() {
            warnings.push(ConfigWarning::EmptyScope);
        }

        for (field, value) in [
            ("authorization_endpoint", &oauth.authorization_endpoint),
            ("token_endpoint", &oauth.token_endpoint),
            ("redirect_uri", &oauth.redirect_uri),
        ] {
            if let Some(warning) = check_endpoint(field, value) {
                warnings.push(warning);
            }
        }

        warnings
    }
}

fn check_endpoint(field: &'static str, value: &str) -> Option<ConfigWarning> {
    if value.starts_with("https://") {
        return None;
    }
    if let Some(rest) = value.strip_prefix("http://") {
        let is_loopback = matches!(http_host(rest), "localhost" | "127.0.0.1" | "[::1]");
        return (!is_loopback)
            .then(|| ConfigWarning::InsecureEndpoint { field, value: value.to_string() });
    }
    Some(ConfigWarning::InvalidEndpoint { field, value: value.to_string() })
}

/// Host of an `http://` URL with the scheme already stripped
fn http_host(rest: &str) -> &str {
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    if host_port.starts_with('[') {
        return host_port.find(']').map_or(host_port, |end| &host_port[..=end]);
    }
    host_port.split(':').next().unwrap_or_default()
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_refresh_leeway_secs() -> u64 {
    DEFAULT_REFRESH_LEEWAY_SECS
}

const fn default_callback_timeout_secs() -> u64 {
    DEFAULT_CALLBACK_TIMEOUT_SECS
}

const fn default_open_browser() -> bool {
    true
}

fn default_keychain_service() -> String {
    DEFAULT_KEYCHAIN_SERVICE.to_string()
}
