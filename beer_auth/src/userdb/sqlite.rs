use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use super::errors::UserError;
use super::store::{UsersRepository, validate_identity};
use super::types::{Identity, User};

pub(crate) const DB_TABLE_USERS: &str = "users";

/// SQLite-backed user store.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: Pool<Sqlite>,
}

impl SqliteUserStore {
    /// Wrap `pool` and make sure the users table exists.
    pub async fn new(pool: Pool<Sqlite>) -> Result<Self, UserError> {
        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<(), UserError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {DB_TABLE_USERS} (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                picture TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UsersRepository for SqliteUserStore {
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.subject))]
    async fn find_or_create_user(&self, identity: &Identity) -> Result<(User, bool), UserError> {
        validate_identity(identity)?;
        let now = Utc::now();

        // The primary key makes the insert a no-op for known subjects.
        let inserted = sqlx::query(&format!(
            r#"
            INSERT INTO {DB_TABLE_USERS} (id, name, email, picture, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO NOTHING
            "#
        ))
        .bind(&identity.subject)
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.picture)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "User insert failed");
            UserError::from(e)
        })?
        .rows_affected();

        let user = self.get_user(&identity.subject).await?.ok_or_else(|| {
            UserError::Storage(format!("User {} missing after insert", identity.subject))
        })?;

        let created = inserted == 1;
        if created {
            tracing::info!("User created");
        } else {
            tracing::debug!("User found");
        }
        Ok((user, created))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        Ok(sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT id, name, email, picture, created_at, updated_at
            FROM {DB_TABLE_USERS} WHERE id = ?
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
