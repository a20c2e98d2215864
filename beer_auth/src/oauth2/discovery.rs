use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subset of the OpenID Connect Discovery 1.0 provider metadata used by the auth flows.
/// https://openid.net/specs/openid-connect-discovery-1_0.html
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OidcDiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    pub userinfo_endpoint: Option<String>,
    pub id_token_signing_alg_values_supported: Option<Vec<String>>,
}

#[derive(Error, Debug, Clone)]
pub enum OidcDiscoveryError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),
    #[error("HTTP status error: {0}")]
    HttpStatusError(reqwest::StatusCode),
    #[error("JSON parsing failed: {0}")]
    JsonError(String),
    #[error("Issuer mismatch: discovered={0}, expected={1}")]
    IssuerMismatch(String, String),
}

impl From<reqwest::Error> for OidcDiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

fn discovery_url(issuer_url: &str) -> String {
    format!(
        "{}/.well-known/openid-configuration",
        issuer_url.trim_end_matches('/')
    )
}

/// Fetch the discovery document from `{issuer}/.well-known/openid-configuration`.
///
/// The `issuer` inside the document must equal the issuer it was fetched from.
pub(crate) async fn fetch_oidc_discovery(
    client: &reqwest::Client,
    issuer_url: &str,
) -> Result<OidcDiscoveryDocument, OidcDiscoveryError> {
    let issuer_url = issuer_url.trim_end_matches('/');
    let url = discovery_url(issuer_url);

    tracing::debug!("Fetching OIDC discovery from: {}", url);

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        tracing::error!("OIDC discovery failed with status: {}", response.status());
        return Err(OidcDiscoveryError::HttpStatusError(response.status()));
    }

    let body = response.text().await?;
    let document: OidcDiscoveryDocument =
        serde_json::from_str(&body).map_err(|e| OidcDiscoveryError::JsonError(e.to_string()))?;

    if document.issuer.trim_end_matches('/') != issuer_url {
        tracing::error!(
            "Issuer mismatch in discovery document. Expected: {}, Found: {}",
            issuer_url,
            document.issuer
        );
        return Err(OidcDiscoveryError::IssuerMismatch(
            document.issuer,
            issuer_url.to_string(),
        ));
    }

    tracing::debug!(
        authorization_endpoint = %document.authorization_endpoint,
        token_endpoint = %document.token_endpoint,
        jwks_uri = %document.jwks_uri,
        "Fetched OIDC discovery document"
    );

    Ok(document)
}
