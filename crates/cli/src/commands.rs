use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chainview_common::auth::{AuthError, CallbackParams, CredentialManager, CredentialStatus};
use chainview_common::time::format_remaining;
use chainview_domain::{ChainViewError, Config};
use chainview_infra::{build_manager, CallbackOutcome, CallbackServer, InfraError};
use tracing::info;

/// Redirect delivered on the command line
#[derive(Debug, PartialEq, Eq)]
pub enum CallbackInput {
    Url(String),
    Params(CallbackParams),
}

impl CallbackInput {
    pub fn from_args(
        url: Option<String>,
        code: Option<String>,
        state: Option<String>,
    ) -> Result<Self> {
        match (url, code, state) {
            (Some(url), None, None) => Ok(Self::Url(url)),
            (None, Some(code), Some(state)) => Ok(Self::Params(CallbackParams { code, state })),
            _ => bail!("pass either --url or both --code and --state"),
        }
    }
}

fn domain_error(err: AuthError) -> ChainViewError {
    InfraError::from(err).into()
}

pub async fn authorize(config: &Config) -> Result<()> {
    let manager = build_manager(config)?;
    let request = manager.initiate_oauth_flow().await.map_err(domain_error)?;

    println!("Open this URL to authorize ChainView:\n\n  {}\n", request.url);
    println!("Then run `chainview callback --url '<redirect URL>'` with the address you land on.");
    Ok(())
}

pub async fn callback(config: &Config, input: CallbackInput) -> Result<()> {
    let manager = build_manager(config)?;

    let exchanged = match input {
        CallbackInput::Url(url) => manager.handle_callback_url(&url).await,
        CallbackInput::Params(params) => manager.handle_callback_params(&params).await,
    }
    .map_err(domain_error)?;

    if !exchanged {
        bail!("the provider did not issue tokens; start again with `chainview authorize`");
    }

    report_status(&manager);
    Ok(())
}

pub async fn login(config: &Config, keep_alive: bool) -> Result<()> {
    let manager = Arc::new(build_manager(config)?);
    let mut server = CallbackServer::start(&config.oauth.redirect_uri, Arc::clone(&manager))
        .await
        .context("could not listen on the redirect URI")?;

    let request = manager.initiate_oauth_flow().await.map_err(domain_error)?;
    println!("Waiting for authorization. If no browser opened, visit:\n\n  {}\n", request.url);

    let timeout = Duration::from_secs(config.callback.timeout_secs);
    let outcome = server.wait_for_outcome(timeout).await;
    server.shutdown().await?;

    match outcome? {
        CallbackOutcome::Authenticated => report_status(&manager),
        CallbackOutcome::ExchangeFailed => {
            bail!("the provider did not issue tokens; run `chainview login` again")
        }
    }

    if keep_alive {
        let refresher = manager.spawn_auto_refresh();
        info!("Keeping credentials fresh; press Ctrl-C to stop");
        tokio::signal::ctrl_c().await.context("failed to wait for Ctrl-C")?;
        refresher.abort();
    }

    Ok(())
}

pub fn show_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;
    println!("{rendered}");

    let secret = if config.oauth.client_secret.is_empty() { "<unset>" } else { "<redacted>" };
    println!("# client_secret = {secret}");

    for warning in config.validate() {
        println!("# warning: {warning}");
    }
    Ok(())
}

fn report_status(manager: &CredentialManager) {
    match manager.status() {
        CredentialStatus::Authenticated { expires_in_secs } => {
            println!("Authenticated; access token expires in {}", format_remaining(expires_in_secs));
        }
        CredentialStatus::Unauthenticated => println!("Not authenticated"),
    }
}

#[cfg(test)]
mod tests {
    use chainview_domain::StateStoreBackend;

    use super::*;

    #[test]
    fn url_argument_is_used_as_is() {
        let input = CallbackInput::from_args(
            Some("http://127.0.0.1:8182/callback?code=C&state=S".into()),
            None,
            None,
        )
        .unwrap();
        assert!(matches!(input, CallbackInput::Url(_)));
    }

    #[test]
    fn code_and_state_build_params() {
        let input = CallbackInput::from_args(None, Some("C".into()), Some("S".into())).unwrap();
        assert_eq!(
            input,
            CallbackInput::Params(CallbackParams { code: "C".into(), state: "S".into() })
        );
    }

    #[test]
    fn partial_arguments_are_rejected() {
        assert!(CallbackInput::from_args(None, Some("C".into()), None).is_err());
        assert!(CallbackInput::from_args(None, None, None).is_err());
    }

    #[test]
    fn auth_errors_map_to_domain_kinds() {
        assert!(matches!(
            domain_error(AuthError::OAuthStateMismatch),
            ChainViewError::InvalidInput(_)
        ));
        assert!(matches!(
            domain_error(AuthError::RefreshFailed("invalid_grant".into())),
            ChainViewError::Network(_)
        ));
    }

    #[tokio::test]
    async fn callback_without_pending_authorization_is_invalid_input() {
        let config: Config = toml::from_str(
            r#"
            [oauth]
            client_id = "cli-test"
            redirect_uri = "http://127.0.0.1:8182/callback"
            authorization_endpoint = "https://auth.example.com/authorize"
            token_endpoint = "https://auth.example.com/token"

            [storage]
            backend = "memory"

            [callback]
            open_browser = false
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StateStoreBackend::Memory);

        let input = CallbackInput::Params(CallbackParams { code: "C".into(), state: "S".into() });
        let err = callback(&config, input).await.unwrap_err();

        let domain = err.downcast_ref::<ChainViewError>().expect("domain error");
        assert_eq!(domain.label(), "invalid_input");
    }
}
