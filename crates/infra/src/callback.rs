//! Loopback HTTP server that receives the provider's authorization redirect.
//!
//! The server binds the host and port of the configured redirect URI, serves
//! exactly its path, and hands the query parameters to
//! [`CredentialManager::handle_callback_params`]. Only a callback that passes
//! the state check resolves the waiter. Forged, malformed, or denied
//! redirects get a 400 page and the server keeps waiting; requests after the
//! first accepted callback change nothing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use chainview_common::auth::{CallbackParams, CredentialManager, OAuthClientTrait};
use chainview_domain::{ChainViewError, Result};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use url::Url;

use crate::errors::InfraError;

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Complete</title></head>
<body><h1>Authorization Successful</h1><p>ChainView is signed in. You can close this window.</p></body>
</html>"#;

const EXCHANGE_FAILED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Failed</title></head>
<body><h1>Authorization Failed</h1><p>The provider did not issue tokens. Run the login again.</p></body>
</html>"#;

const REJECTED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Failed</title></head>
<body><h1>Authorization Failed</h1><p>Invalid or unexpected callback parameters.</p></body>
</html>"#;

/// What happened to the accepted authorization callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Code exchanged; the manager now holds tokens
    Authenticated,
    /// State matched but the token endpoint did not issue tokens
    ExchangeFailed,
}

type OutcomeSlot = Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>;

/// Loopback server bound to the redirect URI
pub struct CallbackServer {
    addr: SocketAddr,
    path: String,
    outcome_rx: Option<oneshot::Receiver<CallbackOutcome>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Bind the host and port of `redirect_uri` and start serving
    ///
    /// `localhost` binds `127.0.0.1`; port `0` picks an ephemeral port.
    ///
    /// # Errors
    /// Returns `ChainViewError::Config` if the redirect URI is not an
    /// `http` loopback address or the port is unavailable.
    pub async fn start<C>(redirect_uri: &str, manager: Arc<CredentialManager<C>>) -> Result<Self>
    where
        C: OAuthClientTrait + 'static,
    {
        let (bind_addr, path) = loopback_target(redirect_uri)?;

        let listener = TcpListener::bind(&bind_addr).await.map_err(|err| {
            ChainViewError::from(InfraError::from(err))
        })?;
        let addr = listener
            .local_addr()
            .map_err(|err| ChainViewError::Network(format!("failed to determine port: {err}")))?;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let outcome_slot: OutcomeSlot = Arc::new(Mutex::new(Some(outcome_tx)));

        let app = Router::new().route(
            &path,
            get(move |query: Query<HashMap<String, String>>| {
                handle_redirect(query, Arc::clone(&manager), Arc::clone(&outcome_slot))
            }),
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!(error = %err, "OAuth callback server error");
            }
        });

        info!(%addr, path = %path, "Callback server listening");

        Ok(Self {
            addr,
            path,
            outcome_rx: Some(outcome_rx),
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Callback URL served by this instance, with the bound port
    pub fn redirect_uri(&self) -> String {
        format!("http://{}{}", self.addr, self.path)
    }

    /// Await the first accepted callback with a timeout
    ///
    /// Rejected callbacks do not resolve the wait.
    ///
    /// # Errors
    /// Returns `ChainViewError::Network` if no accepted callback arrives in
    /// time and `ChainViewError::Internal` if the outcome was already taken.
    pub async fn wait_for_outcome(&mut self, timeout: Duration) -> Result<CallbackOutcome> {
        let rx = self.outcome_rx.take().ok_or_else(|| {
            ChainViewError::Internal("callback outcome already consumed".to_string())
        })?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => {
                Err(ChainViewError::Internal("callback server stopped before a callback".into()))
            }
            Err(_) => Err(ChainViewError::Network(format!(
                "no authorization callback within {}s",
                timeout.as_secs()
            ))),
        }
    }

    /// Shut down the loopback server gracefully.
    ///
    /// # Errors
    /// Returns `ChainViewError::Internal` if the server task panicked.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(ChainViewError::Internal(format!(
                        "OAuth callback server panicked: {err}"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

async fn handle_redirect<C>(
    Query(params): Query<HashMap<String, String>>,
    manager: Arc<CredentialManager<C>>,
    outcome_slot: OutcomeSlot,
) -> (StatusCode, Html<&'static str>)
where
    C: OAuthClientTrait + 'static,
{
    let result = match CallbackParams::from_pairs(params.iter()) {
        Ok(callback) => manager.handle_callback_params(&callback).await,
        Err(err) => Err(err),
    };

    let (outcome, response) = match result {
        Ok(true) => (CallbackOutcome::Authenticated, (StatusCode::OK, Html(SUCCESS_PAGE))),
        Ok(false) => (
            CallbackOutcome::ExchangeFailed,
            (StatusCode::BAD_GATEWAY, Html(EXCHANGE_FAILED_PAGE)),
        ),
        Err(err) => {
            warn!(error = %err, "Rejected callback; still waiting for the authorization redirect");
            return (StatusCode::BAD_REQUEST, Html(REJECTED_PAGE));
        }
    };

    match outcome_slot.lock().await.take() {
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => warn!("Ignoring repeated authorization callback"),
    }

    response
}

/// Resolve the socket address and path to serve for `redirect_uri`
fn loopback_target(redirect_uri: &str) -> Result<(String, String)> {
    let url = Url::parse(redirect_uri)
        .map_err(|err| ChainViewError::Config(format!("invalid redirect URI: {err}")))?;

    if url.scheme() != "http" {
        return Err(ChainViewError::Config(format!(
            "redirect URI {redirect_uri} is not served locally; use `chainview callback` instead"
        )));
    }

    let host = match url.host_str() {
        Some("localhost") => "127.0.0.1",
        Some(host @ ("127.0.0.1" | "[::1]")) => host,
        _ => {
            return Err(ChainViewError::Config(format!(
                "redirect URI {redirect_uri} is not a loopback address"
            )))
        }
    };

    let port = url.port_or_known_default().unwrap_or(80);
    let path = match url.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    };

    Ok((format!("{host}:{port}"), path))
}
