//! Error classification shared by every ChainView error type
//!
//! Module-specific errors (for example [`crate::auth::AuthError`]) implement
//! [`ErrorClassification`] so callers can make retry and reporting decisions
//! without matching on concrete variants.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | No refresh token held, user must log in |
//! | **Warning** | Degraded but recoverable | Token endpoint rejected a code |
//! | **Error** | Failure requiring attention | State store unreadable, bad config |
//! | **Critical** | Integrity at risk | CSRF state mismatch |
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use chainview_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     Timeout,
//!     Rejected,
//! }
//!
//! impl ErrorClassification for LookupError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Timeout)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Timeout => ErrorSeverity::Warning,
//!             Self::Rejected => ErrorSeverity::Error,
//!         }
//!     }
//!
//!     fn is_critical(&self) -> bool {
//!         false
//!     }
//!
//!     fn retry_after(&self) -> Option<Duration> {
//!         self.is_retryable().then(|| Duration::from_secs(1))
//!     }
//! }
//!
//! assert!(LookupError::Timeout.is_retryable());
//! assert_eq!(LookupError::Rejected.severity(), ErrorSeverity::Error);
//! ```

use std::fmt;
use std::time::Duration;

/// Standard interface for classifying errors
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if the same
    /// operation is attempted again.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
