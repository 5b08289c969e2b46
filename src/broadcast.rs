use crate::protocol::ServerMessage;
use crate::state::{Action, AppState};
use crate::types::ChatId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

const CHANNEL_CAPACITY: usize = 100;

/// Fan-out channels keyed by chat id. A user's private channel with the bot
/// is the chat whose id equals their user id.
#[derive(Clone, Default)]
pub struct Hub {
    channels: Arc<RwLock<HashMap<ChatId, broadcast::Sender<ServerMessage>>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, chat_id: &ChatId) -> broadcast::Receiver<ServerMessage> {
        self.channels
            .write()
            .await
            .entry(chat_id.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Send to everyone connected to `chat_id`.
    /// Returns false when nobody is listening.
    pub async fn send(&self, chat_id: &ChatId, msg: ServerMessage) -> bool {
        match self.channels.read().await.get(chat_id) {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        }
    }

    /// Drop `chat_id`'s channel once its last subscriber is gone
    pub async fn release(&self, chat_id: &ChatId) {
        let mut channels = self.channels.write().await;
        if channels
            .get(chat_id)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(chat_id);
            tracing::debug!("Released channel for chat {}", chat_id);
        }
    }

    /// Drop channels nobody listens to anymore
    pub async fn prune(&self) {
        self.channels
            .write()
            .await
            .retain(|_, tx| tx.receiver_count() > 0);
    }
}

/// Spawn a background task that forces the vote in games whose association
/// phase has outlasted the configured timeout
pub fn spawn_association_deadline_watcher(state: Arc<AppState>) {
    let Some(timeout) = state.config.association_timeout else {
        return;
    };
    tracing::info!("Association timeout enabled: {:?}", timeout);

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;

            for chat_id in state.association_overdue(timeout).await {
                tracing::info!("Association deadline passed in chat {}", chat_id);
                // The phase may have moved on since the scan; that is a no-op
                let _ = state.dispatch(&chat_id, Action::ForceVote).await;
            }

            state.hub.prune().await;
        }
    });
}
