//! beer-auth - identity federation core for the beer gifting service
//!
//! Exchanges provider authorization codes or bearer ID tokens for a verified
//! identity, reconciles it with local user records and announces new users.

mod config;
mod coordination;
mod notify;
mod oauth2;
mod userdb;
mod utils;

pub use config::{AuthConfig, ConfigError, DEFAULT_STATE_COOKIE_NAME, STATE_COOKIE_MAX_AGE};

pub use coordination::{
    AuthContext, CallbackQuery, ConsentUrlResponse, CoordinationError, TokenRequest,
    TokenResponse, callback_core, consent_url_core, find_or_create, find_or_create_from_bearer_core,
    login_core, token_core, verify_bearer_core,
};

pub use notify::{BroadcastNotifier, Message, NotifyError, Notifier, USERS_TOPIC, notify_user_created};

pub use oauth2::{
    OAuth2Config, OAuth2Error, OidcDiscoveryDocument, OidcDiscoveryError, PLATFORM_HEADER,
    Platform, PlatformClientIds, ProviderClient, ProviderEndpoints, ProviderToken,
    TokenVerificationError, VerifiedToken, extract_identity, generate_state,
};

pub use userdb::{Identity, InMemoryUserStore, SqliteUserStore, User, UserError, UsersRepository};

pub use utils::UtilError;
