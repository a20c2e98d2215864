use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Verified identity of a caller, derived per request from ID token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned, stable subject identifier
    pub subject: String,
    pub name: String,
    pub email: String,
    pub picture: String,
}

/// A local user record. Its `id` is the provider subject of the identity that created it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn from_identity(identity: &Identity) -> Self {
        let now = Utc::now();
        Self {
            id: identity.subject.clone(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            picture: identity.picture.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}
