use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::errors::UserError;
use super::store::{UsersRepository, validate_identity};
use super::types::{Identity, User};

/// Process-local user store, used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory user store");
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUserStore {
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.subject))]
    async fn find_or_create_user(&self, identity: &Identity) -> Result<(User, bool), UserError> {
        validate_identity(identity)?;

        // One write lock for lookup and insert keeps concurrent first logins from racing.
        let mut users = self.users.write().await;
        if let Some(existing) = users.get(&identity.subject) {
            tracing::debug!("User found");
            return Ok((existing.clone(), false));
        }

        let user = User::from_identity(identity);
        users.insert(user.id.clone(), user.clone());
        tracing::info!("User created");
        Ok((user, true))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn identity(subject: &str) -> Identity {
        Identity {
            subject: subject.to_string(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            picture: String::new(),
        }
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let store = InMemoryUserStore::new();

        let (first, created) = store.find_or_create_user(&identity("sub-1")).await.unwrap();
        assert!(created);

        let (second, created) = store.find_or_create_user(&identity("sub-1")).await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(store.get_user("sub-1").await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_existing_user_is_not_overwritten() {
        let store = InMemoryUserStore::new();
        store.find_or_create_user(&identity("sub-1")).await.unwrap();

        let mut renamed = identity("sub-1");
        renamed.name = "B".to_string();
        let (user, created) = store.find_or_create_user(&renamed).await.unwrap();
        assert!(!created);
        assert_eq!(user.name, "A");
    }

    #[tokio::test]
    async fn test_empty_subject_is_rejected() {
        let store = InMemoryUserStore::new();
        assert!(matches!(
            store.find_or_create_user(&identity("")).await,
            Err(UserError::InvalidData(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_first_login_creates_once() {
        let store = Arc::new(InMemoryUserStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.find_or_create_user(&identity("sub-race")).await.unwrap().1
            }));
        }

        let mut created_count = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created_count += 1;
            }
        }
        assert_eq!(created_count, 1);
    }

    #[tokio::test]
    async fn test_get_user() {
        let store = InMemoryUserStore::new();
        assert!(store.get_user("sub-1").await.unwrap().is_none());
        store.find_or_create_user(&identity("sub-1")).await.unwrap();
        assert_eq!(store.get_user("sub-1").await.unwrap().unwrap().id, "sub-1");
    }
}
