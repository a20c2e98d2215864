use serde::{Deserialize, Serialize};

/// Body of `/auth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub code: String,
}

/// The provider's raw ID token, returned unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "Token")]
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentUrlResponse {
    #[serde(rename = "URL")]
    pub url: String,
}

/// Query string the provider redirects back with.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}
