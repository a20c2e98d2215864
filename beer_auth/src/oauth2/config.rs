use super::discovery::fetch_oidc_discovery;
use super::errors::OAuth2Error;
use super::platform::PlatformClientIds;

pub(crate) const DEFAULT_ISSUER_URL: &str = "https://accounts.google.com";
pub(crate) const DEFAULT_SCOPE: &str = "openid email profile";

/// Provider endpoints the flows talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub jwks_url: String,
    pub issuer: String,
}

/// Endpoint values set explicitly in the environment; these win over discovery.
#[derive(Debug, Clone, Default)]
pub(crate) struct EndpointOverrides {
    pub(crate) auth_url: Option<String>,
    pub(crate) token_url: Option<String>,
    pub(crate) jwks_url: Option<String>,
    pub(crate) issuer: Option<String>,
}

impl EndpointOverrides {
    /// Collect overrides through `lookup`, which should already drop blank values.
    pub(crate) fn read(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            auth_url: lookup("OAUTH2_AUTH_URL"),
            token_url: lookup("OAUTH2_TOKEN_URL"),
            jwks_url: lookup("OAUTH2_JWKS_URL"),
            issuer: lookup("OAUTH2_EXPECTED_ISSUER"),
        }
    }

    fn complete(&self) -> Option<ProviderEndpoints> {
        Some(ProviderEndpoints {
            auth_url: self.auth_url.clone()?,
            token_url: self.token_url.clone()?,
            jwks_url: self.jwks_url.clone()?,
            issuer: self.issuer.clone()?,
        })
    }
}

impl ProviderEndpoints {
    /// Resolve endpoints, using environment overrides first and OIDC discovery for the rest.
    pub(crate) async fn resolve(
        http: &reqwest::Client,
        issuer_url: &str,
        overrides: EndpointOverrides,
    ) -> Result<Self, OAuth2Error> {
        if let Some(endpoints) = overrides.complete() {
            tracing::debug!("All provider endpoints set from environment");
            return Ok(endpoints);
        }

        tracing::debug!("Fetching OIDC discovery for issuer: {}", issuer_url);
        let document = fetch_oidc_discovery(http, issuer_url).await?;

        Ok(Self {
            auth_url: overrides
                .auth_url
                .unwrap_or(document.authorization_endpoint),
            token_url: overrides.token_url.unwrap_or(document.token_endpoint),
            jwks_url: overrides.jwks_url.unwrap_or(document.jwks_uri),
            issuer: overrides.issuer.unwrap_or(document.issuer),
        })
    }
}

/// Settings of the OAuth2 client registration shared by all platforms.
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    pub client_ids: PlatformClientIds,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub endpoints: ProviderEndpoints,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_overrides() -> EndpointOverrides {
        EndpointOverrides {
            auth_url: Some("https://idp.example.com/auth".to_string()),
            token_url: Some("https://idp.example.com/token".to_string()),
            jwks_url: Some("https://idp.example.com/certs".to_string()),
            issuer: Some("https://idp.example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_resolve_uses_overrides_without_network() {
        // The issuer URL is unreachable, so success proves discovery was skipped.
        let endpoints = ProviderEndpoints::resolve(
            &reqwest::Client::new(),
            "http://127.0.0.1:9",
            full_overrides(),
        )
        .await
        .unwrap();

        assert_eq!(endpoints.token_url, "https://idp.example.com/token");
        assert_eq!(endpoints.issuer, "https://idp.example.com");
    }

    #[tokio::test]
    async fn test_resolve_partial_overrides_needs_discovery() {
        let mut overrides = full_overrides();
        overrides.jwks_url = None;

        let result =
            ProviderEndpoints::resolve(&reqwest::Client::new(), "http://127.0.0.1:9", overrides)
                .await;
        assert!(matches!(result, Err(OAuth2Error::Discovery(_))));
    }
}
