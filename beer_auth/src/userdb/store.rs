use async_trait::async_trait;

use super::errors::UserError;
use super::types::{Identity, User};

/// Persistence for local user records.
#[async_trait]
pub trait UsersRepository: Send + Sync + 'static {
    /// Return the user whose id is `identity.subject`, creating it first if absent.
    ///
    /// The boolean is `true` only when this call created the record.
    async fn find_or_create_user(&self, identity: &Identity) -> Result<(User, bool), UserError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, UserError>;
}

pub(super) fn validate_identity(identity: &Identity) -> Result<(), UserError> {
    if identity.subject.is_empty() {
        return Err(UserError::InvalidData(
            "Identity subject cannot be empty".to_string(),
        ));
    }
    Ok(())
}
