//! WebSocket message dispatch
//!
//! Classifies client messages into session actions and dispatches them;
//! dispatch delivers the resulting notifications. The return value is a
//! direct reply for the sending connection only.

use crate::error::GameError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{Action, AppState};
use crate::types::{ChatId, Player};
use std::sync::Arc;

const PRIVATE_GREETING: &str =
    "Hi! This is our private chat. Your role and secret word will arrive here.";
const GROUP_GREETING: &str = "Hello everyone! Let's play.";

/// Who is talking, and where
#[derive(Debug, Clone)]
pub struct Connection {
    pub chat_id: ChatId,
    pub user: Player,
}

impl Connection {
    /// A user's private chat with the bot shares the user's id
    pub fn is_private(&self) -> bool {
        self.chat_id == self.user.id
    }
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    conn: &Connection,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    if let ClientMessage::Hello = msg {
        return greet(conn, state).await;
    }

    if conn.is_private() {
        return Some(ServerMessage::Error {
            code: "GROUP_CHAT_ONLY".to_string(),
            msg: "Games are played in group chats".to_string(),
        });
    }

    let action = match msg {
        ClientMessage::Hello => return None,
        ClientMessage::StartLobby { player_count } => Action::StartLobby {
            starter: conn.user.clone(),
            target_player_count: player_count.unwrap_or(state.config.lobby_size),
        },
        ClientMessage::Join => Action::Join {
            player: conn.user.clone(),
        },
        ClientMessage::Associate { text } => Action::SubmitAssociation {
            player_id: conn.user.id.clone(),
            text,
        },
        ClientMessage::Vote { target } => Action::CastVote {
            voter_id: conn.user.id.clone(),
            target_id: target,
        },
        ClientMessage::ForceVote => Action::ForceVote,
        ClientMessage::Exit => Action::Exit,
    };

    match state.dispatch(&conn.chat_id, action).await {
        Ok(_) => None,
        Err(e) => reject(conn, e),
    }
}

async fn greet(conn: &Connection, state: &Arc<AppState>) -> Option<ServerMessage> {
    if conn.is_private() {
        tracing::info!("Private greeting for {}", conn.user.display_name);
        return Some(ServerMessage::Greeting {
            private: true,
            msg: PRIVATE_GREETING.to_string(),
        });
    }

    state
        .hub
        .send(
            &conn.chat_id,
            ServerMessage::Greeting {
                private: false,
                msg: GROUP_GREETING.to_string(),
            },
        )
        .await;
    None
}

/// Player-caused rejections go back to the player; the rest are dropped
fn reject(conn: &Connection, e: GameError) -> Option<ServerMessage> {
    if e.is_player_facing() {
        tracing::info!(
            "Rejected action from {} in chat {}: {}",
            conn.user.id,
            conn.chat_id,
            e
        );
        Some(ServerMessage::Rejected {
            code: e.code().to_string(),
            msg: e.to_string(),
        })
    } else {
        tracing::debug!(
            "Ignored action from {} in chat {}: {}",
            conn.user.id,
            conn.chat_id,
            e
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::types::GamePhase;
    use crate::words::WordPool;

    fn conn(chat: &str, user: &str) -> Connection {
        Connection {
            chat_id: chat.to_string(),
            user: Player {
                id: user.to_string(),
                display_name: user.to_uppercase(),
            },
        }
    }

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            WordPool::parse("tide:sea").unwrap(),
            GameConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_private_hello() {
        let state = test_state();
        let reply = handle_message(ClientMessage::Hello, &conn("u1", "u1"), &state).await;
        assert!(matches!(
            reply,
            Some(ServerMessage::Greeting { private: true, .. })
        ));
    }

    #[tokio::test]
    async fn test_group_hello_is_broadcast() {
        let state = test_state();
        let mut rx = state.hub.subscribe(&"g".to_string()).await;

        let reply = handle_message(ClientMessage::Hello, &conn("g", "u1"), &state).await;
        assert!(reply.is_none());
        assert!(matches!(
            rx.try_recv(),
            Ok(ServerMessage::Greeting { private: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_games_only_in_groups() {
        let state = test_state();
        let reply = handle_message(
            ClientMessage::StartLobby { player_count: None },
            &conn("u1", "u1"),
            &state,
        )
        .await;
        assert!(matches!(reply, Some(ServerMessage::Error { .. })));
        assert_eq!(state.phase(&"u1".to_string()).await, GamePhase::Idle);
    }

    #[tokio::test]
    async fn test_default_lobby_size() {
        let state = test_state();
        handle_message(
            ClientMessage::StartLobby { player_count: None },
            &conn("g", "u1"),
            &state,
        )
        .await;

        let session = state.get_session(&"g".to_string()).await.unwrap();
        assert_eq!(session.target_player_count, state.config.lobby_size);
    }

    #[tokio::test]
    async fn test_player_facing_error_is_replied() {
        let state = test_state();
        let c = conn("g", "u1");
        handle_message(ClientMessage::StartLobby { player_count: Some(3) }, &c, &state).await;

        let reply = handle_message(ClientMessage::Join, &c, &state).await;
        match reply {
            Some(ServerMessage::Rejected { code, .. }) => assert_eq!(code, "DUPLICATE_JOIN"),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_phase_is_silent() {
        let state = test_state();
        let reply = handle_message(
            ClientMessage::Vote {
                target: "u2".to_string(),
            },
            &conn("g", "u1"),
            &state,
        )
        .await;
        assert!(reply.is_none());
    }
}
