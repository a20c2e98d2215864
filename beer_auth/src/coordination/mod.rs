mod auth;
mod context;
mod errors;
mod reconcile;
mod types;

pub use auth::{
    callback_core, consent_url_core, find_or_create_from_bearer_core, login_core, token_core,
    verify_bearer_core,
};
pub use context::AuthContext;
pub use errors::CoordinationError;
pub use reconcile::find_or_create;
pub use types::{CallbackQuery, ConsentUrlResponse, TokenRequest, TokenResponse};
