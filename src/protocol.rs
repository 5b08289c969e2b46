use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Greeting; tells a private chat that roles will arrive there
    Hello,
    /// Open a lobby; `player_count` overrides the configured lobby size
    StartLobby {
        #[serde(default)]
        player_count: Option<usize>,
    },
    Join,
    Associate {
        text: String,
    },
    Vote {
        target: PlayerId,
    },
    /// Skip the remaining association rounds
    ForceVote,
    Exit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        chat_id: ChatId,
        phase: GamePhase,
        server_now: String,
        valid_transitions: Vec<GamePhase>,
    },
    Greeting {
        private: bool,
        msg: String,
    },
    LobbyOpened {
        session_id: SessionId,
        target_player_count: usize,
        players: Vec<Player>,
    },
    PlayerJoined {
        player: Player,
        players: Vec<Player>,
        target_player_count: usize,
    },
    GameStarted {
        speaking_order: Vec<Player>,
        max_rounds: u32,
    },
    /// Private: the recipient's secret role
    RoleAssigned {
        role: Role,
    },
    TurnStarted {
        speaker: Player,
        round: u32,
        max_rounds: u32,
    },
    AssociationPosted {
        player: Player,
        text: String,
        round: u32,
    },
    VotingStarted {
        /// Choice list of players that can be voted for
        candidates: Vec<Player>,
    },
    VoteRecorded {
        voter: Player,
        votes_cast: usize,
        votes_needed: usize,
    },
    GameFinished {
        outcome: Outcome,
        winner: Winner,
        impostors: Vec<Player>,
        word: String,
        theme: String,
        votes: HashMap<PlayerId, u32>,
    },
    GameAborted {
        reason: String,
    },
    /// Private: the recipient's action was refused
    Rejected {
        code: String,
        msg: String,
    },
    /// A private message to `player` could not be delivered
    DeliveryFailed {
        player: Player,
    },
    Error {
        code: String,
        msg: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    /// Everyone in the game chat
    Chat,
    /// One player's private channel
    Player(PlayerId),
}

/// Outbound message produced by the game core, delivered by the transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub recipient: Recipient,
    pub message: ServerMessage,
}

impl Notification {
    pub fn chat(message: ServerMessage) -> Self {
        Self {
            recipient: Recipient::Chat,
            message,
        }
    }

    pub fn player(id: impl Into<PlayerId>, message: ServerMessage) -> Self {
        Self {
            recipient: Recipient::Player(id.into()),
            message,
        }
    }
}
