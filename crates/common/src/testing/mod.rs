//! Testing utilities and helpers
//!
//! - **[`async_utils`]**: Async polling helpers
//! - **[`mocks`]**: Mock implementations of the auth seams
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use chainview_common::testing::{MockClock, RecordingUserAgent};
//! use chainview_common::auth::UserAgent;
//!
//! let clock = MockClock::new();
//! clock.advance(Duration::from_secs(5));
//!
//! let agent = RecordingUserAgent::new();
//! agent.navigate("https://auth.example.com/authorize").unwrap();
//! assert_eq!(agent.last_url().as_deref(), Some("https://auth.example.com/authorize"));
//! ```

pub mod async_utils;
pub mod mocks;

pub use async_utils::poll_until;
#[cfg(feature = "platform")]
pub use mocks::MockKeychainProvider;
pub use mocks::{MockOAuthClient, RecordingUserAgent};
pub use crate::time::{Clock, MockClock, SystemClock};
