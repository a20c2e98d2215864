use serde::Deserialize;
use serde_json::Value;

use crate::userdb::Identity;

use super::errors::OAuth2Error;
use super::idtoken::VerifiedToken;

/// Profile claims read from a verified ID token. Absent or null claims become empty strings.
#[derive(Debug, Deserialize)]
struct ProfileClaims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

pub fn extract_identity(token: &VerifiedToken) -> Result<Identity, OAuth2Error> {
    let claims: ProfileClaims = serde_json::from_value(Value::Object(token.claims.clone()))
        .map_err(|e| OAuth2Error::ClaimsDecode(e.to_string()))?;

    Ok(Identity {
        subject: token.subject.clone(),
        name: claims.name.unwrap_or_default(),
        email: claims.email.unwrap_or_default(),
        picture: claims.picture.unwrap_or_default(),
    })
}
