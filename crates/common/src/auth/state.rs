//! CSRF state nonce generation
//!
//! Each authorization attempt carries a fresh nonce in its `state` parameter.
//! The nonce is persisted before the user agent is navigated and compared
//! against the callback's `state` when the provider redirects back.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes drawn per nonce
pub const STATE_BYTES: usize = 32;

/// Generate a URL-safe random state nonce
///
/// Draws [`STATE_BYTES`] bytes from the OS CSPRNG and encodes them as
/// unpadded base64url, giving 43 characters from `[A-Za-z0-9_-]`.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compare a persisted nonce against a callback's state in constant time
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let expected = expected.as_bytes();
    let actual = actual.as_bytes();
    if expected.len() != actual.len() {
        return false;
    }
    expected.iter().zip(actual).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Short prefix of a nonce for log lines
pub(crate) fn state_prefix(state: &str) -> &str {
    state.get(..6).unwrap_or(state)
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::state.
    use std::collections::HashSet;

    use super::*;

    /// Validates `generate_state` output shape.
    ///
    /// Assertions:
    /// - Confirms the nonce is 43 URL-safe characters.
    #[test]
    fn test_generate_state_is_url_safe() {
        let state = generate_state();
        assert_eq!(state.len(), 43);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    /// Validates `generate_state` uniqueness across many draws.
    ///
    /// Assertions:
    /// - Ensures 1000 draws produce 1000 distinct values.
    #[test]
    fn test_generate_state_is_unique() {
        let states: HashSet<String> = (0..1000).map(|_| generate_state()).collect();
        assert_eq!(states.len(), 1000);
    }

    /// Validates `validate_state` exact-match semantics.
    ///
    /// Assertions:
    /// - Ensures identical values match.
    /// - Ensures differing, truncated and empty values do not.
    #[test]
    fn test_validate_state() {
        let state = generate_state();
        assert!(validate_state(&state, &state));
        assert!(!validate_state(&state, &generate_state()));
        assert!(!validate_state(&state, &state[..10]));
        assert!(!validate_state(&state, ""));
    }

    /// Validates `state_prefix` on short input.
    ///
    /// Assertions:
    /// - Confirms short values are returned whole.
    #[test]
    fn test_state_prefix() {
        assert_eq!(state_prefix("abcdefghij"), "abcdef");
        assert_eq!(state_prefix("abc"), "abc");
    }
}
