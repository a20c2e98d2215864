use thiserror::Error;

use super::discovery::OidcDiscoveryError;
use super::idtoken::TokenVerificationError;

#[derive(Debug, Error)]
pub enum OAuth2Error {
    #[error("Token exchange error: {0}")]
    Exchange(String),

    #[error("ID token missing from token response")]
    MissingIdToken,

    #[error("Id token error: {0}")]
    Verification(#[from] TokenVerificationError),

    #[error("Claims decode error: {0}")]
    ClaimsDecode(String),

    #[error("Discovery error: {0}")]
    Discovery(#[from] OidcDiscoveryError),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
