mod claims;
mod client;
mod config;
mod discovery;
mod errors;
mod idtoken;
mod platform;
mod state;

pub use claims::extract_identity;
pub use client::{ProviderClient, ProviderToken};
pub use config::{OAuth2Config, ProviderEndpoints};
pub use discovery::{OidcDiscoveryDocument, OidcDiscoveryError};
pub use errors::OAuth2Error;
pub use idtoken::{TokenVerificationError, VerifiedToken};
pub use platform::{PLATFORM_HEADER, Platform, PlatformClientIds};
pub use state::generate_state;

pub(crate) use client::build_http_client;
pub(crate) use config::{DEFAULT_ISSUER_URL, DEFAULT_SCOPE, EndpointOverrides};
pub(crate) use state::state_matches;

#[cfg(test)]
pub(crate) use client::test_support;
#[cfg(test)]
pub(crate) use idtoken::test_support as idtoken_test_support;
