use crate::types::GamePhase;

/// Result type for game-session operations
pub type GameResult<T> = Result<T, GameError>;

/// Reasons a session action was not applied. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("No game is running in this chat")]
    NoSession,

    #[error("A game is already running in this chat")]
    SessionExists,

    #[error("Cannot {action} during {phase:?}")]
    InvalidTransition {
        phase: GamePhase,
        action: &'static str,
    },

    #[error("Lobby size must be between 1 and {max}")]
    InvalidLobbySize { max: usize },

    #[error("The lobby is already full")]
    LobbyFull,

    #[error("You already joined this game")]
    DuplicateJoin,

    #[error("You are not playing in this game")]
    NotAPlayer,

    #[error("It is not your turn")]
    NotYourTurn,

    #[error("An association cannot be empty")]
    EmptyAssociation,

    #[error("You cannot vote for yourself")]
    SelfVote,

    #[error("You already voted")]
    RepeatVote,

    #[error("That player is not in this game")]
    UnknownTarget,

    #[error("The word pool is empty")]
    EmptyPool,
}

impl GameError {
    /// Constraint violations caused by the acting player. These are reported
    /// back to that player only; everything else is ignored silently.
    pub fn is_player_facing(&self) -> bool {
        matches!(
            self,
            GameError::SessionExists
                | GameError::InvalidLobbySize { .. }
                | GameError::LobbyFull
                | GameError::DuplicateJoin
                | GameError::NotAPlayer
                | GameError::NotYourTurn
                | GameError::EmptyAssociation
                | GameError::SelfVote
                | GameError::RepeatVote
                | GameError::UnknownTarget
        )
    }

    /// Stable machine-readable code for `ServerMessage::Rejected`
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NoSession => "NO_SESSION",
            GameError::SessionExists => "SESSION_EXISTS",
            GameError::InvalidTransition { .. } => "INVALID_TRANSITION",
            GameError::InvalidLobbySize { .. } => "INVALID_LOBBY_SIZE",
            GameError::LobbyFull => "LOBBY_FULL",
            GameError::DuplicateJoin => "DUPLICATE_JOIN",
            GameError::NotAPlayer => "NOT_A_PLAYER",
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::EmptyAssociation => "EMPTY_ASSOCIATION",
            GameError::SelfVote => "SELF_VOTE",
            GameError::RepeatVote => "REPEAT_VOTE",
            GameError::UnknownTarget => "UNKNOWN_TARGET",
            GameError::EmptyPool => "EMPTY_POOL",
        }
    }
}
