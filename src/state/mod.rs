pub mod roles;
pub mod session;
pub mod turn;
pub mod vote;

pub use session::{Action, Session};

use crate::broadcast::Hub;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::protocol::{Notification, Recipient, ServerMessage};
use crate::types::*;
use crate::words::WordPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Shared application state
///
/// Holds at most one session per chat. Each action takes the write lock for
/// its whole transition and delivery, so actions on a chat are applied one at
/// a time and their notifications reach the chat in that same order.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<ChatId, Session>>>,
    pub words: Arc<WordPool>,
    pub config: GameConfig,
    /// Per-chat channels for delivering server messages
    pub hub: Hub,
}

impl AppState {
    pub fn new(words: WordPool, config: GameConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            words: Arc::new(words),
            config,
            hub: Hub::new(),
        }
    }

    /// Apply an action to the chat's session, creating it for a lobby-start,
    /// and deliver the resulting notifications. Sessions that end up idle are
    /// discarded. Returns what was delivered.
    pub async fn dispatch(&self, chat_id: &ChatId, action: Action) -> GameResult<Vec<Notification>> {
        let mut sessions = self.sessions.write().await;

        let result = {
            let mut rng = rand::rng();
            match sessions.get_mut(chat_id) {
                Some(session) => session.apply(action, &self.config, &self.words, &mut rng),
                None => match action {
                    Action::StartLobby {
                        starter,
                        target_player_count,
                    } => Session::open(
                        chat_id.clone(),
                        starter,
                        target_player_count,
                        &self.config,
                        &self.words,
                        &mut rng,
                    )
                    .map(|(session, out)| {
                        sessions.insert(chat_id.clone(), session);
                        out
                    }),
                    _ => Err(GameError::NoSession),
                },
            }
        };

        if let Ok(out) = &result {
            // Still under the write lock; an aborted session is kept until
            // after delivery so its player names can be resolved
            self.deliver(chat_id, sessions.get(chat_id), out).await;
        }

        if sessions.get(chat_id).is_some_and(Session::is_idle) {
            sessions.remove(chat_id);
            tracing::info!("Session in chat {} discarded", chat_id);
        }

        result
    }

    /// Current phase of the chat's game; `Idle` when there is none
    pub async fn phase(&self, chat_id: &ChatId) -> GamePhase {
        self.sessions
            .read()
            .await
            .get(chat_id)
            .map(|s| s.phase)
            .unwrap_or(GamePhase::Idle)
    }

    pub async fn get_session(&self, chat_id: &ChatId) -> Option<Session> {
        self.sessions.read().await.get(chat_id).cloned()
    }

    /// Chats whose association phase has run longer than `timeout`
    pub async fn association_overdue(&self, timeout: Duration) -> Vec<ChatId> {
        let now = chrono::Utc::now();
        let Ok(timeout) = chrono::Duration::from_std(timeout) else {
            return Vec::new();
        };

        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.phase == GamePhase::Association && now - s.phase_started_at >= timeout)
            .map(|s| s.chat_id.clone())
            .collect()
    }

    /// Deliver notifications produced for `chat_id`.
    ///
    /// Private messages that cannot reach their player are replaced by a
    /// warning in the game chat; the game carries on regardless.
    async fn deliver(
        &self,
        chat_id: &ChatId,
        session: Option<&Session>,
        notifications: &[Notification],
    ) {
        for notification in notifications {
            match &notification.recipient {
                Recipient::Chat => {
                    self.hub.send(chat_id, notification.message.clone()).await;
                }
                Recipient::Player(player_id) => {
                    if self.hub.send(player_id, notification.message.clone()).await {
                        continue;
                    }

                    tracing::warn!(
                        "Private message to {} in game {} could not be delivered",
                        player_id,
                        chat_id
                    );
                    let player = session
                        .and_then(|s| s.player(player_id).cloned())
                        .unwrap_or_else(|| Player {
                            id: player_id.clone(),
                            display_name: player_id.clone(),
                        });
                    self.hub
                        .send(chat_id, ServerMessage::DeliveryFailed { player })
                        .await;
                }
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(WordPool::default(), GameConfig::default())
    }
}
