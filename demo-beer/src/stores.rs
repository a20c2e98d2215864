use std::env;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::broadcast::{Receiver, error::RecvError};

use beer_auth::{InMemoryUserStore, Message, SqliteUserStore, UsersRepository};

/// SQLite store when `DATABASE_URL` is set, otherwise a process-local one.
pub(crate) async fn users_repository() -> Result<Arc<dyn UsersRepository>, Box<dyn std::error::Error>> {
    match env::var("DATABASE_URL") {
        Ok(url) => {
            tracing::info!("Using SQLite user store at {}", url);
            let pool = SqlitePoolOptions::new().connect(&url).await?;
            Ok(Arc::new(SqliteUserStore::new(pool).await?))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory");
            Ok(Arc::new(InMemoryUserStore::new()))
        }
    }
}

/// Logs every announced user. Stands in for a real-time transport.
pub(crate) fn spawn_announcement_logger(mut rx: Receiver<Message>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => tracing::info!(topic = %message.topic, "Announcement: {:?}", message.payload),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Announcement logger skipped {} messages", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
