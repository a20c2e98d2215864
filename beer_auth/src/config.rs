//! Service configuration, built once at startup and shared read-only.

use std::env;
use thiserror::Error;

use crate::oauth2::{
    DEFAULT_ISSUER_URL, DEFAULT_SCOPE, EndpointOverrides, OAuth2Config, OAuth2Error,
    PlatformClientIds, ProviderEndpoints, build_http_client,
};

pub const DEFAULT_STATE_COOKIE_NAME: &str = "oauthstate";

/// Lifetime of the state cookie set by the login redirect: one year.
pub const STATE_COOKIE_MAX_AGE: i64 = 365 * 24 * 60 * 60;

const CALLBACK_PATH: &str = "/auth/google/callback";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Provider configuration error: {0}")]
    Provider(#[from] OAuth2Error),
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub origin: String,
    pub oauth2: OAuth2Config,
    pub state_cookie_name: String,
    pub state_cookie_max_age: i64,
    pub secure_cookies: bool,
}

impl AuthConfig {
    /// Config with default cookie settings for `origin`.
    pub fn new(origin: impl Into<String>, oauth2: OAuth2Config) -> Self {
        let origin = origin.into();
        Self {
            secure_cookies: origin.starts_with("https://"),
            origin,
            oauth2,
            state_cookie_name: DEFAULT_STATE_COOKIE_NAME.to_string(),
            state_cookie_max_age: STATE_COOKIE_MAX_AGE,
        }
    }

    /// Read `.env` and the process environment, then resolve provider endpoints.
    pub async fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok()).await
    }

    /// Build the config from variables supplied by `lookup`, then resolve provider endpoints.
    ///
    /// Blank values count as unset.
    pub async fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let settings = EnvSettings::read(lookup)?;
        let http = build_http_client()?;
        let endpoints =
            ProviderEndpoints::resolve(&http, &settings.issuer_url, settings.overrides.clone())
                .await?;

        let config = settings.into_config(endpoints);
        tracing::info!(
            origin = %config.origin,
            redirect_uri = %config.oauth2.redirect_uri,
            issuer = %config.oauth2.endpoints.issuer,
            "Auth configuration loaded"
        );
        Ok(config)
    }
}

/// Raw environment values, before provider endpoints are known.
#[derive(Debug)]
struct EnvSettings {
    origin: String,
    client_ids: PlatformClientIds,
    client_secret: String,
    redirect_uri: String,
    issuer_url: String,
    scope: String,
    state_cookie_name: String,
    overrides: EndpointOverrides,
}

impl EnvSettings {
    fn read(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let origin = required("ORIGIN")?.trim_end_matches('/').to_string();
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "ORIGIN must start with http:// or https://: {origin}"
            )));
        }

        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            client_ids: PlatformClientIds {
                web: required("OAUTH2_GOOGLE_CLIENT_ID")?,
                android: optional("OAUTH2_ANDROID_CLIENT_ID"),
                ios: optional("OAUTH2_IOS_CLIENT_ID"),
            },
            client_secret: required("OAUTH2_GOOGLE_CLIENT_SECRET")?,
            redirect_uri: optional("OAUTH2_REDIRECT_URI")
                .unwrap_or_else(|| format!("{origin}{CALLBACK_PATH}")),
            issuer_url: optional("OAUTH2_ISSUER_URL")
                .unwrap_or_else(|| DEFAULT_ISSUER_URL.to_string()),
            scope: optional("OAUTH2_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            state_cookie_name: optional("OAUTH2_STATE_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_STATE_COOKIE_NAME.to_string()),
            overrides: EndpointOverrides::read(optional),
            origin,
        })
    }

    fn into_config(self, endpoints: ProviderEndpoints) -> AuthConfig {
        let oauth2 = OAuth2Config {
            client_ids: self.client_ids,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            scope: self.scope,
            endpoints,
        };
        let mut config = AuthConfig::new(self.origin, oauth2);
        config.state_cookie_name = self.state_cookie_name;
        config
    }
}
