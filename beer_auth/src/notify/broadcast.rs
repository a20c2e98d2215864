use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::broadcast;

use super::errors::NotifyError;
use super::types::{Message, Notifier};

const DEFAULT_CAPACITY: usize = 64;

/// In-process notifier backed by a tokio broadcast channel.
///
/// Transports such as a websocket layer call [`BroadcastNotifier::subscribe`]
/// and forward what they receive to their clients.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Message>,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn message_all(
        &self,
        topic: &str,
        payload: HashMap<String, String>,
    ) -> Result<(), NotifyError> {
        let message = Message {
            topic: topic.to_string(),
            payload,
        };

        // send only fails when nobody is listening
        let delivered = self
            .sender
            .send(message)
            .map_err(|_| NotifyError::NoSubscribers(topic.to_string()))?;

        tracing::debug!(topic, delivered, "Broadcast message");
        Ok(())
    }
}
