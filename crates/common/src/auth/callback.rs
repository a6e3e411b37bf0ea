//! Parsing of the provider's redirect back to the application

use url::Url;

use super::error::AuthError;

/// `code` and `state` extracted from an authorization callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code to exchange
    pub code: String,
    /// State nonce echoed back by the provider
    pub state: String,
}

impl CallbackParams {
    /// Extract callback parameters from query pairs
    ///
    /// An `error` parameter takes precedence over `code`; empty values are
    /// treated as missing.
    ///
    /// # Errors
    /// Returns `AuthError::AuthorizationDenied` if the provider reported an
    /// error, or `AuthError::MissingCallbackParameters` if `code` or `state`
    /// is absent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut description = None;

        for (key, value) in pairs {
            let value = value.as_ref();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "code" => code = Some(value.to_string()),
                "state" => state = Some(value.to_string()),
                "error" => error = Some(value.to_string()),
                "error_description" => description = Some(value.to_string()),
                _ => {}
            }
        }

        if let Some(error) = error {
            return Err(AuthError::AuthorizationDenied { error, description });
        }

        match (code, state) {
            (Some(code), Some(state)) => Ok(Self { code, state }),
            _ => Err(AuthError::MissingCallbackParameters),
        }
    }

    /// Extract callback parameters from a full redirect URL
    ///
    /// # Errors
    /// Returns `AuthError::MissingCallbackParameters` if the URL cannot be
    /// parsed, plus every error [`Self::from_pairs`] returns.
    ///
    /// # Examples
    /// ```
    /// use chainview_common::auth::CallbackParams;
    ///
    /// let params =
    ///     CallbackParams::from_url("http://127.0.0.1:8182/callback?code=C1&state=S1").unwrap();
    /// assert_eq!(params.code, "C1");
    /// assert_eq!(params.state, "S1");
    /// ```
    pub fn from_url(url: &str) -> Result<Self, AuthError> {
        let url = Url::parse(url).map_err(|_| AuthError::MissingCallbackParameters)?;
        Self::from_pairs(url.query_pairs())
    }
}
