//! OAuth 2.0 credential lifecycle
//!
//! Obtains, stores, refreshes and hands out bearer tokens for the
//! authorization code grant.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ CredentialManager  │  Guarded accessor + auto-refresh
//! └─────────┬──────────┘
//!           │
//!           ├──► OAuthFlow          (initiate / callback / refresh)
//!           │       ├──► OAuthClient      (token endpoint over HTTP)
//!           │       ├──► StateStore       (persisted CSRF nonce)
//!           │       └──► UserAgent        (browser navigation)
//!           │
//!           └──► TokenStore         (in-memory credentials, clock-aware)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chainview_common::auth::{
//!     CredentialManager, ManagerOptions, MemoryStateStore, OAuthClient, OAuthConfig,
//! };
//! use chainview_common::testing::RecordingUserAgent;
//! use chainview_common::time::SystemClock;
//!
//! # async fn example() -> Result<(), chainview_common::auth::AuthError> {
//! let config = OAuthConfig::new(
//!     "client_id",
//!     "client_secret",
//!     "http://127.0.0.1:8182/callback",
//!     "https://auth.example.com/authorize",
//!     "https://auth.example.com/token",
//!     "read",
//! );
//! let manager = CredentialManager::new(
//!     OAuthClient::new(config),
//!     Arc::new(MemoryStateStore::new()),
//!     Arc::new(RecordingUserAgent::new()),
//!     Arc::new(SystemClock),
//!     ManagerOptions::default(),
//! );
//!
//! let request = manager.initiate_oauth_flow().await?;
//! // ... user authorizes, provider redirects with ?code=..&state=..
//! let logged_in = manager.handle_callback("code-from-redirect", &request.state).await?;
//! if logged_in {
//!     let token = manager.access_token().await?;
//!     println!("Bearer {token}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod client;
pub mod error;
pub mod flow;
pub mod service;
pub mod state;
pub mod state_store;
pub mod token_store;
pub mod traits;
pub mod types;

pub use callback::CallbackParams;
pub use client::{OAuthClient, OAuthClientError};
pub use error::{AuthError, StateStoreError};
pub use flow::{FlowState, OAuthFlow, OAUTH_STATE_KEY};
pub use service::{CredentialManager, ManagerOptions, DEFAULT_REFRESH_LEEWAY};
pub use state::{generate_state, validate_state};
#[cfg(feature = "platform")]
pub use state_store::KeychainStateStore;
pub use state_store::MemoryStateStore;
pub use token_store::TokenStore;
pub use traits::{OAuthClientTrait, StateStore, UserAgent};
pub use types::{
    AuthorizationRequest, CredentialStatus, OAuthConfig, OAuthError, TokenResponse, TokenSet,
};
