//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. A `.env` file in the working directory (or a parent) is applied first
//! 2. An explicit `--config <path>` always wins
//! 3. Otherwise environment variables are tried
//! 4. If they are incomplete, config files found on the search path are used (JSON or TOML)
//!
//! ## Environment Variables
//! Required:
//! - `CHAINVIEW_REDIRECT_URI`: Redirect URI registered with the provider
//! - `CHAINVIEW_AUTHORIZATION_ENDPOINT`: Provider authorization endpoint
//! - `CHAINVIEW_TOKEN_ENDPOINT`: Provider token endpoint
//!
//! Optional:
//! - `CHAINVIEW_CLIENT_ID`, `CHAINVIEW_CLIENT_SECRET`, `CHAINVIEW_SCOPE`
//! - `CHAINVIEW_REQUEST_TIMEOUT`: Token request timeout in seconds
//! - `CHAINVIEW_REFRESH_LEEWAY`: Refresh this many seconds before expiry
//! - `CHAINVIEW_STATE_BACKEND`: `file`, `keychain` or `memory`
//! - `CHAINVIEW_STATE_PATH`: State file path for the `file` backend
//! - `CHAINVIEW_CALLBACK_TIMEOUT`: Seconds to wait for the browser callback
//! - `CHAINVIEW_OPEN_BROWSER`: Whether to launch the system browser
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./chainview.toml` or `./chainview.json` (current working directory)
//! 2. The same names in the parent and grandparent directories
//! 3. `<config dir>/chainview/config.toml` or `config.json`
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chainview_domain::constants::{
    APP_DIR_NAME, DEFAULT_CALLBACK_TIMEOUT_SECS, DEFAULT_KEYCHAIN_SERVICE,
    DEFAULT_REFRESH_LEEWAY_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, ENV_AUTHORIZATION_ENDPOINT,
    ENV_CALLBACK_TIMEOUT, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_OPEN_BROWSER, ENV_REDIRECT_URI,
    ENV_REFRESH_LEEWAY, ENV_REQUEST_TIMEOUT, ENV_SCOPE, ENV_STATE_BACKEND, ENV_STATE_PATH,
    ENV_TOKEN_ENDPOINT,
};
use chainview_domain::{
    CallbackConfig, ChainViewError, Config, OAuthSettings, Result, StateStoreBackend,
    StorageConfig,
};

/// Load configuration with automatic fallback strategy
///
/// An explicit path is loaded as-is. Otherwise environment variables are
/// tried first, falling back to a config file on the search path.
///
/// # Errors
/// Returns `ChainViewError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load(explicit: Option<PathBuf>) -> Result<Config> {
    load_dotenv();

    if let Some(path) = explicit {
        return load_from_file(Some(path));
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Apply a `.env` file to the process environment if one exists
///
/// Variables already present in the environment are not overridden.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }
}

/// Load configuration from environment variables
///
/// The three endpoint variables must be present. See module documentation
/// for the complete list.
///
/// # Errors
/// Returns `ChainViewError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let oauth = OAuthSettings {
        client_id: env_or_default(ENV_CLIENT_ID),
        client_secret: env_or_default(ENV_CLIENT_SECRET),
        redirect_uri: env_var(ENV_REDIRECT_URI)?,
        authorization_endpoint: env_var(ENV_AUTHORIZATION_ENDPOINT)?,
        token_endpoint: env_var(ENV_TOKEN_ENDPOINT)?,
        scope: env_or_default(ENV_SCOPE),
        request_timeout_secs: env_parse(ENV_REQUEST_TIMEOUT, DEFAULT_REQUEST_TIMEOUT_SECS)?,
        refresh_leeway_secs: env_parse(ENV_REFRESH_LEEWAY, DEFAULT_REFRESH_LEEWAY_SECS)?,
    };

    let backend = match std::env::var(ENV_STATE_BACKEND) {
        Ok(value) => StateStoreBackend::from_str(&value).map_err(ChainViewError::Config)?,
        Err(_) => StateStoreBackend::default(),
    };

    let storage = StorageConfig {
        backend,
        path: std::env::var_os(ENV_STATE_PATH).map(PathBuf::from),
        keychain_service: DEFAULT_KEYCHAIN_SERVICE.to_string(),
    };

    let callback = CallbackConfig {
        timeout_secs: env_parse(ENV_CALLBACK_TIMEOUT, DEFAULT_CALLBACK_TIMEOUT_SECS)?,
        open_browser: env_bool(ENV_OPEN_BROWSER, true),
    };

    Ok(Config { oauth, storage, callback })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ChainViewError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ChainViewError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => search_config_paths().ok_or_else(|| {
            ChainViewError::Config(
                "No configuration found: set CHAINVIEW_* variables or create chainview.toml"
                    .to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ChainViewError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ChainViewError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ChainViewError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ChainViewError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ChainViewError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn search_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for dir in [cwd.clone(), cwd.join(".."), cwd.join("../..")] {
            candidates.push(dir.join("chainview.toml"));
            candidates.push(dir.join("chainview.json"));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let app_dir = config_dir.join(APP_DIR_NAME);
        candidates.push(app_dir.join("config.toml"));
        candidates.push(app_dir.join("config.json"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join("chainview.toml"));
            candidates.push(exe_dir.join("chainview.json"));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `ChainViewError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ChainViewError::Config(format!(
            "Missing required environment variable: {key}"
        ))),
    }
}

fn env_or_default(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

/// Parse an optional numeric environment variable
///
/// # Errors
/// Returns `ChainViewError::Config` if the variable is set but not a number.
fn env_parse(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| ChainViewError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
