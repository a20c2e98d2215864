//! Axum integration for beer-auth
//!
//! Mount [`beer_auth_router`] to expose the authentication endpoints under `/auth`.

mod auth;
mod error;
mod middleware;
mod router;

pub use error::IntoResponseError;
pub use middleware::require_bearer;
pub use router::{beer_auth_router, beer_auth_router_no_trace};
