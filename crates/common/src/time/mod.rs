//! Time utilities and abstractions
//!
//! - **[`clock`]**: Wall-clock abstraction with real and mock implementations
//! - **[`format`]**: Human-readable rendering of remaining token lifetimes
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use chainview_common::time::{format_remaining, Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!((clock.now() - start).num_seconds(), 5);
//!
//! assert_eq!(format_remaining(3665), "1h 1m 5s");
//! ```

pub mod clock;
pub mod format;

pub use clock::{Clock, MockClock, SystemClock};
pub use format::format_remaining;
