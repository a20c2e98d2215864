mod broadcast;
mod errors;
mod types;
mod users;

pub use broadcast::BroadcastNotifier;
pub use errors::NotifyError;
pub use types::{Message, Notifier};
pub use users::{USERS_TOPIC, notify_user_created};
