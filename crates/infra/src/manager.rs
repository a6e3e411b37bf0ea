//! Wiring from configuration to a ready [`CredentialManager`]

use std::sync::Arc;
use std::time::Duration;

use chainview_common::auth::{CredentialManager, ManagerOptions, OAuthClient, OAuthConfig};
use chainview_common::SystemClock;
use chainview_domain::{Config, OAuthSettings, Result};

use crate::browser::BrowserUserAgent;
use crate::storage::build_state_store;

/// Translate file/env settings into the client configuration
pub fn oauth_config(settings: &OAuthSettings) -> OAuthConfig {
    OAuthConfig::new(
        settings.client_id.clone(),
        settings.client_secret.clone(),
        settings.redirect_uri.clone(),
        settings.authorization_endpoint.clone(),
        settings.token_endpoint.clone(),
        settings.scope.clone(),
    )
    .with_request_timeout(Duration::from_secs(settings.request_timeout_secs))
}

/// Manager tunables from settings
pub fn manager_options(settings: &OAuthSettings) -> ManagerOptions {
    ManagerOptions {
        refresh_leeway: Duration::from_secs(settings.refresh_leeway_secs),
        request_timeout: Duration::from_secs(settings.request_timeout_secs),
    }
}

/// Build the process-wide manager: HTTP client, configured state store,
/// system browser and wall clock
///
/// # Errors
/// Returns an error if the state store cannot be constructed.
pub fn build_manager(config: &Config) -> Result<CredentialManager> {
    let client = OAuthClient::new(oauth_config(&config.oauth));
    let state_store = build_state_store(&config.storage)?;
    let user_agent = Arc::new(BrowserUserAgent::new(config.callback.open_browser));

    Ok(CredentialManager::new(
        client,
        state_store,
        user_agent,
        Arc::new(SystemClock),
        manager_options(&config.oauth),
    ))
}

#[cfg(test)]
mod tests {
    use chainview_domain::{CallbackConfig, StateStoreBackend, StorageConfig};

    use super::*;

    fn settings() -> OAuthSettings {
        OAuthSettings {
            client_id: "chainview".into(),
            client_secret: String::new(),
            redirect_uri: "http://127.0.0.1:8182/callback".into(),
            authorization_endpoint: "https://auth.example.com/authorize".into(),
            token_endpoint: "https://auth.example.com/token".into(),
            scope: "read".into(),
            request_timeout_secs: 5,
            refresh_leeway_secs: 90,
        }
    }

    #[test]
    fn oauth_config_carries_timeout_and_drops_empty_secret() {
        let config = oauth_config(&settings());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.client_secret(), None);
        assert_eq!(config.redirect_uri, "http://127.0.0.1:8182/callback");
    }

    #[test]
    fn manager_options_follow_settings() {
        let options = manager_options(&settings());
        assert_eq!(options.refresh_leeway, Duration::from_secs(90));
        assert_eq!(options.request_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn built_manager_starts_unauthenticated() {
        let config = Config {
            oauth: settings(),
            storage: StorageConfig {
                backend: StateStoreBackend::Memory,
                ..StorageConfig::default()
            },
            callback: CallbackConfig { open_browser: false, ..CallbackConfig::default() },
        };

        let manager = build_manager(&config).unwrap();
        assert!(!manager.is_authenticated());
        assert!(manager.get_access_token().is_none());
    }
}
