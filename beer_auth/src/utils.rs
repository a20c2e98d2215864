use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Fills `len` bytes from the system CSPRNG and returns them base64url encoded.
///
/// A failing RNG is reported as an error; there is no fallback source.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(&bytes))
}

/// Attributes of a `Set-Cookie` header written by [`header_set_cookie`].
#[derive(Debug, Clone)]
pub struct CookieSpec<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub max_age: i64,
    pub secure: bool,
}

pub fn header_set_cookie<'h>(
    headers: &'h mut HeaderMap,
    spec: &CookieSpec<'_>,
) -> Result<&'h HeaderMap, UtilError> {
    let mut cookie = format!(
        "{}={}; SameSite=Lax; HttpOnly; Path=/; Max-Age={}",
        spec.name, spec.value, spec.max_age
    );
    if spec.secure {
        cookie.push_str("; Secure");
    }
    tracing::debug!(cookie_name = spec.name, max_age = spec.max_age, "Setting cookie");
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?,
    );
    Ok(headers)
}
