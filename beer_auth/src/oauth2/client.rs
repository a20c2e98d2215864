use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use super::config::OAuth2Config;
use super::errors::OAuth2Error;
use super::idtoken::{IdTokenVerifier, VerifiedToken};
use super::platform::Platform;

/// Token endpoint response. Fields beyond the standard ones land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderToken {
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Creates the HTTP client used for every call to the provider:
///
/// - `timeout`: 30 seconds so a hanging provider cannot pin a request forever.
/// - `pool_idle_timeout`: 90 seconds, the reqwest default.
/// - `pool_max_idle_per_host`: 32 idle connections per host.
pub(crate) fn build_http_client() -> Result<reqwest::Client, OAuth2Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| OAuth2Error::HttpClient(e.to_string()))
}

/// Talks to the identity provider on behalf of every configured platform.
#[derive(Debug)]
pub struct ProviderClient {
    config: OAuth2Config,
    http: reqwest::Client,
    verifier: IdTokenVerifier,
}

impl ProviderClient {
    pub fn new(config: OAuth2Config) -> Result<Self, OAuth2Error> {
        Ok(Self::with_http_client(config, build_http_client()?))
    }

    pub fn with_http_client(config: OAuth2Config, http: reqwest::Client) -> Self {
        let verifier = IdTokenVerifier::new(
            http.clone(),
            config.endpoints.jwks_url.clone(),
            config.endpoints.issuer.clone(),
        );
        Self {
            config,
            http,
            verifier,
        }
    }

    pub fn default_client_id(&self) -> &str {
        self.config.client_ids.default_client_id()
    }

    pub fn client_id_for(&self, platform: Platform) -> &str {
        self.config.client_ids.client_id_for(platform)
    }

    /// URL of the provider's consent page for the default client.
    pub fn build_consent_url(&self, state: &str, offline_access: bool) -> Result<String, OAuth2Error> {
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", self.default_client_id()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", self.config.scope.as_str()),
            ("state", state),
        ];
        if offline_access {
            params.push(("access_type", "offline"));
        }

        let url = Url::parse_with_params(&self.config.endpoints.auth_url, &params)
            .map_err(|e| OAuth2Error::InvalidUrl(format!("{}: {e}", self.config.endpoints.auth_url)))?;

        tracing::debug!("Consent URL: {}", url);
        Ok(url.into())
    }

    /// Exchange an authorization code at the token endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<ProviderToken, OAuth2Error> {
        let response = self
            .http
            .post(&self.config.endpoints.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.default_client_id()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::Exchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::Exchange(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!("Token Exchange Response: {} {}", status, body);
            return Err(OAuth2Error::Exchange(status.to_string()));
        }

        serde_json::from_str(&body).map_err(|e| OAuth2Error::Exchange(e.to_string()))
    }

    /// The `id_token` extension field of a token response.
    pub fn extract_id_token(token: &ProviderToken) -> Result<String, OAuth2Error> {
        token
            .extra("id_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(OAuth2Error::MissingIdToken)
    }

    /// Verify `raw_id_token` was issued by the provider for `expected_client_id`.
    pub async fn verify(
        &self,
        raw_id_token: &str,
        expected_client_id: &str,
    ) -> Result<VerifiedToken, OAuth2Error> {
        Ok(self.verifier.verify(raw_id_token, expected_client_id).await?)
    }

    #[cfg(test)]
    pub(crate) async fn seed_jwks(&self, jwks: super::idtoken::Jwks) {
        self.verifier.seed_jwks(jwks).await;
    }
}
