use std::collections::HashMap;
use std::sync::Arc;

use crate::userdb::User;

use super::errors::NotifyError;
use super::types::Notifier;

/// Topic new users are announced on.
pub const USERS_TOPIC: &str = "users";

pub(crate) fn user_created_payload(user: &User) -> Result<HashMap<String, String>, NotifyError> {
    let json = serde_json::to_string(user)?;
    Ok(HashMap::from([("user".to_string(), json)]))
}

/// Announce `user` on [`USERS_TOPIC`] from a detached task.
///
/// The task outlives the calling request. Failures are logged and dropped.
pub fn notify_user_created(notifier: Arc<dyn Notifier>, user: User) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let payload = match user_created_payload(&user) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Failed to encode new user");
                return;
            }
        };

        match notifier.message_all(USERS_TOPIC, payload).await {
            Ok(()) => tracing::debug!(user_id = %user.id, "New user announced"),
            Err(e) => tracing::error!(user_id = %user.id, error = %e, "Failed to announce new user"),
        }
    })
}
