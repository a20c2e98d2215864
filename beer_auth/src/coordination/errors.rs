//! Error types for the authentication flows

use thiserror::Error;

use crate::oauth2::OAuth2Error;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors that can occur while coordinating an authentication flow.
///
/// Every variant is opaque to the caller at the HTTP boundary; the kind is only
/// visible in the server log.
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// Exchange, verification or claims failure at the identity provider
    #[error("OAuth2 error: {0}")]
    OAuth2(OAuth2Error),

    /// Failure in the user repository
    #[error("Persistence error: {0}")]
    Persistence(UserError),

    /// Request body could not be decoded
    #[error("Request decode error: {0}")]
    DecodeRequest(String),

    /// `state` returned by the provider does not match the one bound to the browser
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Utils error: {0}")]
    Utils(UtilError),

    /// No `Authorization: Bearer` credential on the request
    #[error("Bearer token is missing")]
    MissingBearer,
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::OAuth2(err) => tracing::error!("OAuth2 error: {}", err),
            Self::Persistence(err) => tracing::error!("Persistence error: {}", err),
            Self::DecodeRequest(msg) => tracing::error!("Request decode error: {}", msg),
            Self::InvalidState(msg) => tracing::error!("Invalid state: {}", msg),
            Self::Utils(err) => tracing::error!("Utils error: {}", err),
            Self::MissingBearer => tracing::error!("Bearer token is missing"),
        }
        self
    }
}

impl From<OAuth2Error> for CoordinationError {
    fn from(err: OAuth2Error) -> Self {
        Self::OAuth2(err).log()
    }
}

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        Self::Persistence(err).log()
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        Self::Utils(err).log()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_user_error_keeps_inner_error() {
        let err: CoordinationError = UserError::Storage("disk full".to_string()).into();
        match err {
            CoordinationError::Persistence(UserError::Storage(msg)) => assert_eq!(msg, "disk full"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_from_oauth2_error() {
        let err: CoordinationError = OAuth2Error::MissingIdToken.into();
        assert!(matches!(
            err,
            CoordinationError::OAuth2(OAuth2Error::MissingIdToken)
        ));
        assert_eq!(
            err.to_string(),
            "OAuth2 error: ID token missing from token response"
        );
    }

    #[test]
    fn test_log_returns_self() {
        let err = CoordinationError::MissingBearer.log();
        assert!(matches!(err, CoordinationError::MissingBearer));
    }
}
