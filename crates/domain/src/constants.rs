//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFRESH_LEEWAY_SECS: u64 = 60;
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "ChainView.oauth";
pub const DEFAULT_STATE_FILE_NAME: &str = "state.json";
pub const APP_DIR_NAME: &str = "chainview";

// Environment variables
pub const ENV_CLIENT_ID: &str = "CHAINVIEW_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CHAINVIEW_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "CHAINVIEW_REDIRECT_URI";
pub const ENV_AUTHORIZATION_ENDPOINT: &str = "CHAINVIEW_AUTHORIZATION_ENDPOINT";
pub const ENV_TOKEN_ENDPOINT: &str = "CHAINVIEW_TOKEN_ENDPOINT";
pub const ENV_SCOPE: &str = "CHAINVIEW_SCOPE";
pub const ENV_REQUEST_TIMEOUT: &str = "CHAINVIEW_REQUEST_TIMEOUT";
pub const ENV_REFRESH_LEEWAY: &str = "CHAINVIEW_REFRESH_LEEWAY";
pub const ENV_STATE_BACKEND: &str = "CHAINVIEW_STATE_BACKEND";
pub const ENV_STATE_PATH: &str = "CHAINVIEW_STATE_PATH";
pub const ENV_CALLBACK_TIMEOUT: &str = "CHAINVIEW_CALLBACK_TIMEOUT";
pub const ENV_OPEN_BROWSER: &str = "CHAINVIEW_OPEN_BROWSER";
