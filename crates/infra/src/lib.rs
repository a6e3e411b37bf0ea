//! # ChainView Infrastructure
//!
//! Adapters that connect the credential lifecycle in `chainview-common` to
//! the outside world.
//!
//! This crate contains:
//! - Configuration loading (`.env`, environment variables, TOML/JSON files)
//! - State store backends selected from configuration
//! - The loopback callback server that receives the provider redirect
//! - The system-browser user agent
//!
//! ## Architecture
//! - Implements traits defined in `chainview_common::auth`
//! - Depends on `chainview-domain` for configuration and errors
//! - Contains all "impure" code (filesystem, sockets, browser launch)

pub mod browser;
pub mod callback;
pub mod config;
pub mod errors;
pub mod manager;
pub mod storage;

// Re-export commonly used items
pub use browser::BrowserUserAgent;
pub use callback::{CallbackOutcome, CallbackServer};
pub use errors::InfraError;
pub use manager::build_manager;
pub use storage::{build_state_store, FileStateStore};
