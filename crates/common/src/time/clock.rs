//! Wall-clock abstraction
//!
//! Token expiry is computed from the local clock at the moment a token
//! response arrives, so every component that reads or writes expiry instants
//! takes its notion of "now" from a [`Clock`]. Production code uses
//! [`SystemClock`]; tests drive a [`MockClock`] forward without sleeping.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of the current wall-clock instant
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same elapsed counter, so a clock handed to a component
/// can still be advanced from the test body.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use chainview_common::time::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// let start = clock.now();
///
/// // Simulate 11 seconds passing
/// clock.advance(Duration::from_secs(11));
///
/// assert_eq!((clock.now() - start).num_seconds(), 11);
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    base: DateTime<Utc>,
    elapsed: Arc<Mutex<chrono::Duration>>,
}

impl MockClock {
    /// Create a mock clock frozen at the current real time
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Create a mock clock frozen at `base`
    #[must_use]
    pub fn starting_at(base: DateTime<Utc>) -> Self {
        Self { base, elapsed: Arc::new(Mutex::new(chrono::Duration::zero())) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        let step = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
        let mut elapsed = self.elapsed.lock();
        *elapsed = elapsed.checked_add(&step).unwrap_or(chrono::Duration::MAX);
    }

    /// Total simulated time since creation
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + *self.elapsed.lock()
    }
}
