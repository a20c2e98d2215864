use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::NotifyError;

/// A message published to every subscriber of `topic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub payload: HashMap<String, String>,
}

/// Real-time fan-out to connected subscribers.
///
/// Delivery is best effort. Implementations report failure but callers in the
/// authentication flows never surface it to the requester.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn message_all(
        &self,
        topic: &str,
        payload: HashMap<String, String>,
    ) -> Result<(), NotifyError>;
}
