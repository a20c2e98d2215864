use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct Jwks {
    pub(crate) keys: Vec<Jwk>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct Jwk {
    pub(crate) kty: String,
    pub(crate) kid: String,
    pub(crate) alg: Option<String>,
    pub(crate) n: Option<String>,
    pub(crate) e: Option<String>,
    pub(crate) x: Option<String>,
    pub(crate) y: Option<String>,
    pub(crate) crv: Option<String>,
    pub(crate) k: Option<String>,
}

#[derive(Error, Debug)]
pub enum TokenVerificationError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Base64 decoding failed: {0}")]
    Base64Error(#[from] base64::DecodeError),
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token format")]
    InvalidTokenFormat,
    #[error("Invalid token signature")]
    InvalidTokenSignature,
    #[error("Invalid token audience, expected: {0}, actual: {1}")]
    InvalidTokenAudience(String, String),
    #[error("Invalid token issuer, expected: {0}, actual: {1}")]
    InvalidTokenIssuer(String, String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Token not yet valid, now: {0}, nbf: {1}")]
    TokenNotYetValidNotBeFore(i64, i64),
    #[error("Token not yet valid, now: {0}, iat: {1}")]
    TokenNotYetValidIssuedAt(i64, i64),
    #[error("No matching key found in JWKS")]
    NoMatchingKey,
    #[error("Missing key component: {0}")]
    MissingKeyComponent(String),
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Key algorithm {0} does not match token algorithm {1}")]
    AlgorithmMismatch(String, String),
    #[error("JWKS fetch error: {0}")]
    JwksFetch(String),
}

impl From<reqwest::Error> for TokenVerificationError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

/// An ID token whose signature, issuer, audience and lifetime have been checked.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub subject: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expires_at: i64,
    /// Full claim set of the token, registered claims included.
    pub claims: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(aud) => vec![aud],
            Self::Multiple(auds) => auds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegisteredClaims {
    iss: String,
    sub: String,
    aud: Audience,
    exp: i64,
    iat: i64,
    nbf: Option<i64>,
}

const CACHE_EXPIRATION_SECS: i64 = 600;
/// Minimum age of the cached key set before an unknown `kid` may trigger a refetch.
const REFETCH_FLOOR_SECS: i64 = 60;
const CLOCK_SKEW_SECS: i64 = 30;
const GOOGLE_ISSUER: &str = "https://accounts.google.com";

#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: Jwks,
    fetched_at: DateTime<Utc>,
}

impl CachedJwks {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.fetched_at + Duration::seconds(CACHE_EXPIRATION_SECS)
    }

    fn may_refetch(&self, now: DateTime<Utc>) -> bool {
        now >= self.fetched_at + Duration::seconds(REFETCH_FLOOR_SECS)
    }
}

/// Provider signing keys, shared by all requests and refreshed on expiry or unknown `kid`.
#[derive(Debug, Default)]
pub(crate) struct JwksCache {
    entry: RwLock<Option<CachedJwks>>,
}

impl JwksCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    async fn get_valid(&self) -> Option<CachedJwks> {
        let entry = self.entry.read().await;
        match entry.as_ref() {
            Some(cached) if !cached.is_expired(Utc::now()) => Some(cached.clone()),
            Some(_) => {
                tracing::debug!("Cached JWKs expired");
                None
            }
            None => None,
        }
    }

    async fn store(&self, jwks: Jwks, fetched_at: DateTime<Utc>) {
        *self.entry.write().await = Some(CachedJwks { jwks, fetched_at });
    }
}

/// Checks ID tokens against one issuer's published keys.
#[derive(Debug)]
pub(crate) struct IdTokenVerifier {
    http: reqwest::Client,
    jwks_url: String,
    issuer: String,
    cache: JwksCache,
}

impl IdTokenVerifier {
    pub(crate) fn new(http: reqwest::Client, jwks_url: String, issuer: String) -> Self {
        Self {
            http,
            jwks_url,
            issuer,
            cache: JwksCache::new(),
        }
    }

    #[cfg(test)]
    pub(crate) async fn seed_jwks(&self, jwks: Jwks) {
        self.cache.store(jwks, Utc::now()).await;
    }

    #[cfg(test)]
    pub(crate) async fn seed_jwks_fetched_at(&self, jwks: Jwks, fetched_at: DateTime<Utc>) {
        self.cache.store(jwks, fetched_at).await;
    }

    async fn fetch_jwks(&self) -> Result<Jwks, TokenVerificationError> {
        let response = self.http.get(&self.jwks_url).send().await?;
        if !response.status().is_success() {
            return Err(TokenVerificationError::JwksFetch(format!(
                "{} returned {}",
                self.jwks_url,
                response.status()
            )));
        }
        let body = response.text().await?;
        let jwks: Jwks = serde_json::from_str(&body)?;
        tracing::debug!(keys = jwks.keys.len(), "JWKs fetched from URL");
        self.cache.store(jwks.clone(), Utc::now()).await;
        Ok(jwks)
    }

    async fn find_jwk(&self, kid: &str) -> Result<Jwk, TokenVerificationError> {
        if let Some(cached) = self.cache.get_valid().await {
            if let Some(jwk) = find_jwk(&cached.jwks, kid) {
                tracing::debug!("Returning valid cached JWK");
                return Ok(jwk.clone());
            }
            if !cached.may_refetch(Utc::now()) {
                tracing::debug!(kid, "Key not in recently fetched JWKs");
                return Err(TokenVerificationError::NoMatchingKey);
            }
            tracing::debug!(kid, "Key not in cached JWKs, refetching");
        }

        let jwks = self.fetch_jwks().await?;
        find_jwk(&jwks, kid)
            .cloned()
            .ok_or(TokenVerificationError::NoMatchingKey)
    }

    fn accepts_issuer(&self, iss: &str) -> bool {
        iss == self.issuer
            || (self.issuer == GOOGLE_ISSUER && iss == "accounts.google.com")
    }

    pub(crate) async fn verify(
        &self,
        token: &str,
        audience: &str,
    ) -> Result<VerifiedToken, TokenVerificationError> {
        let header = jsonwebtoken::decode_header(token)?;
        let kid = header
            .kid
            .ok_or(TokenVerificationError::MissingKeyComponent(
                "kid".to_string(),
            ))?;
        let alg = header.alg;
        tracing::debug!("Algorithm from JWT header: {:?}", alg);

        let jwk = self.find_jwk(&kid).await?;
        let decoding_key = convert_jwk_to_decoding_key(&jwk, alg)?;

        if !verify_signature(token, &decoding_key, alg)? {
            return Err(TokenVerificationError::InvalidTokenSignature);
        }

        let claims = decode_payload(token)?;
        let registered: RegisteredClaims = serde_json::from_value(Value::Object(claims.clone()))?;
        check_lifetime(&registered, Utc::now().timestamp())?;

        let RegisteredClaims { iss, sub, aud, exp, .. } = registered;
        let audiences = aud.into_vec();
        if !audiences.iter().any(|candidate| candidate == audience) {
            return Err(TokenVerificationError::InvalidTokenAudience(
                audience.to_string(),
                audiences.join(","),
            ));
        }

        if !self.accepts_issuer(&iss) {
            return Err(TokenVerificationError::InvalidTokenIssuer(
                self.issuer.clone(),
                iss,
            ));
        }

        Ok(VerifiedToken {
            subject: sub,
            issuer: iss,
            audience: audiences,
            expires_at: exp,
            claims,
        })
    }
}

fn find_jwk<'a>(jwks: &'a Jwks, kid: &str) -> Option<&'a Jwk> {
    jwks.keys.iter().find(|key| key.kid == kid)
}

fn component<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, TokenVerificationError> {
    value
        .as_deref()
        .ok_or_else(|| TokenVerificationError::MissingKeyComponent(name.to_string()))
}

fn convert_jwk_to_decoding_key(
    jwk: &Jwk,
    alg: Algorithm,
) -> Result<DecodingKey, TokenVerificationError> {
    // A key published for one algorithm must not verify tokens claiming another.
    if let Some(jwk_alg) = jwk.alg.as_deref() {
        let expected = Algorithm::from_str(jwk_alg)
            .map_err(|_| TokenVerificationError::UnsupportedAlgorithm(jwk_alg.to_string()))?;
        if expected != alg {
            return Err(TokenVerificationError::AlgorithmMismatch(
                jwk_alg.to_string(),
                format!("{alg:?}"),
            ));
        }
    }

    match (alg, jwk.kty.as_str()) {
        (
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512,
            "RSA",
        ) => Ok(DecodingKey::from_rsa_components(
            component(&jwk.n, "n")?,
            component(&jwk.e, "e")?,
        )?),
        (Algorithm::ES256 | Algorithm::ES384, "EC") => Ok(DecodingKey::from_ec_components(
            component(&jwk.x, "x")?,
            component(&jwk.y, "y")?,
        )?),
        (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512, "oct") => {
            let k = URL_SAFE_NO_PAD.decode(component(&jwk.k, "k")?)?;
            Ok(DecodingKey::from_secret(&k))
        }
        (alg, kty) => Err(TokenVerificationError::UnsupportedAlgorithm(format!(
            "{alg:?} with key type {kty}"
        ))),
    }
}

fn split_token(token: &str) -> Result<[&str; 3], TokenVerificationError> {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.as_slice() {
        [header, payload, signature] => Ok([*header, *payload, *signature]),
        _ => Err(TokenVerificationError::InvalidTokenFormat),
    }
}

fn decode_payload(token: &str) -> Result<Map<String, Value>, TokenVerificationError> {
    let [_, payload, _] = split_token(token)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    match serde_json::from_slice(&decoded)? {
        Value::Object(claims) => Ok(claims),
        _ => Err(TokenVerificationError::InvalidTokenFormat),
    }
}

fn verify_signature(
    token: &str,
    decoding_key: &DecodingKey,
    alg: Algorithm,
) -> Result<bool, TokenVerificationError> {
    let [header, payload, signature] = split_token(token)?;
    let message = format!("{header}.{payload}");
    Ok(jsonwebtoken::crypto::verify(
        signature,
        message.as_bytes(),
        decoding_key,
        alg,
    )?)
}

fn check_lifetime(claims: &RegisteredClaims, now: i64) -> Result<(), TokenVerificationError> {
    if let Some(nbf) = claims.nbf {
        if now + CLOCK_SKEW_SECS < nbf {
            return Err(TokenVerificationError::TokenNotYetValidNotBeFore(now, nbf));
        }
    }
    if now + CLOCK_SKEW_SECS < claims.iat {
        return Err(TokenVerificationError::TokenNotYetValidIssuedAt(
            now, claims.iat,
        ));
    }
    if now > claims.exp {
        return Err(TokenVerificationError::TokenExpired);
    }
    Ok(())
}
