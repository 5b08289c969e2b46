use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque ID types for type safety
pub type ChatId = String;
pub type PlayerId = String;
pub type SessionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Idle,
    Lobby,
    RoleDistribution,
    Association,
    Voting,
    Finished,
}

impl GamePhase {
    /// Phases reachable from this one through the transition table.
    /// `Idle` is always reachable via exit and is listed explicitly.
    pub fn valid_transitions(&self) -> Vec<GamePhase> {
        use GamePhase::*;

        match self {
            Idle => vec![Lobby],
            Lobby => vec![Lobby, RoleDistribution, Idle],
            RoleDistribution => vec![Association, Idle],
            Association => vec![Association, Voting, Idle],
            Voting => vec![Voting, Finished, Idle],
            // Finished may be reset straight into a new lobby
            Finished => vec![Lobby, Idle],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
}

/// One secret word and the theme it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub theme: String,
}

/// What a player privately learns at game start
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    /// Knows the word and its theme
    Civilian { word: String, theme: String },
    /// Knows only the theme
    Impostor { theme: String },
}

/// Classification of a completed vote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "suspects", rename_all = "snake_case")]
pub enum Outcome {
    NoImpostor,
    UniqueSuspect(PlayerId),
    TiedSuspects(BTreeSet<PlayerId>),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Civilians,
    Impostors,
    /// No impostor was dealt, so the vote decides nothing
    Nobody,
}

impl Outcome {
    /// Whether the players found the impostors.
    ///
    /// A tie only counts when every tied suspect is an impostor. `NoImpostor`
    /// is never "correct"; see [`Outcome::winner`].
    pub fn is_correct(&self, impostors: &BTreeSet<PlayerId>) -> bool {
        match self {
            Outcome::NoImpostor => false,
            Outcome::UniqueSuspect(id) => impostors.contains(id),
            Outcome::TiedSuspects(ids) => !ids.is_empty() && ids.is_subset(impostors),
        }
    }

    pub fn winner(&self, impostors: &BTreeSet<PlayerId>) -> Winner {
        match self {
            Outcome::NoImpostor => Winner::Nobody,
            _ if self.is_correct(impostors) => Winner::Civilians,
            _ => Winner::Impostors,
        }
    }
}
