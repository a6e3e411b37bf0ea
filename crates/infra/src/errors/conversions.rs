//! Conversions from credential-lifecycle and I/O errors into domain errors.

use chainview_common::auth::{AuthError, StateStoreError};
use chainview_domain::ChainViewError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ChainViewError);

impl From<InfraError> for ChainViewError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ChainViewError> for InfraError {
    fn from(value: ChainViewError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoChainViewError {
    fn into_chainview(self) -> ChainViewError;
}

/* -------------------------------------------------------------------------- */
/* AuthError → ChainViewError */
/* -------------------------------------------------------------------------- */

impl IntoChainViewError for AuthError {
    fn into_chainview(self) -> ChainViewError {
        match self {
            AuthError::MissingCallbackParameters | AuthError::OAuthStateMismatch => {
                ChainViewError::InvalidInput(self.to_string())
            }
            AuthError::TokenExchangeFailed(_) | AuthError::RefreshFailed(_) => {
                ChainViewError::Network(self.to_string())
            }
            AuthError::StateStore(inner) => inner.into_chainview(),
            AuthError::Navigation(_) => ChainViewError::Internal(self.to_string()),
            AuthError::AuthorizationDenied { .. } | AuthError::ReauthenticationRequired { .. } => {
                ChainViewError::Auth(self.to_string())
            }
        }
    }
}

impl From<AuthError> for InfraError {
    fn from(value: AuthError) -> Self {
        InfraError(value.into_chainview())
    }
}

/* -------------------------------------------------------------------------- */
/* StateStoreError → ChainViewError */
/* -------------------------------------------------------------------------- */

impl IntoChainViewError for StateStoreError {
    fn into_chainview(self) -> ChainViewError {
        ChainViewError::Storage(self.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ChainViewError */
/* -------------------------------------------------------------------------- */

impl IntoChainViewError for std::io::Error {
    fn into_chainview(self) -> ChainViewError {
        match self.kind() {
            std::io::ErrorKind::AddrInUse | std::io::ErrorKind::AddrNotAvailable => {
                ChainViewError::Config(format!("callback address unavailable: {self}"))
            }
            _ => ChainViewError::Internal(format!("I/O failure: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_chainview())
    }
}
