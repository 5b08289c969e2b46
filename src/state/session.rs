//! The per-chat game session and its transition table.
//!
//! A [`Session`] is created by a lobby-start and then driven by [`Action`]s.
//! Every accepted action mutates the session in place and yields the
//! [`Notification`]s the transport should deliver; a rejected action yields a
//! [`GameError`] and leaves the session untouched. The session never talks to
//! the transport itself.

use super::roles::select_impostors;
use super::turn::{random_order, TurnAdvance, TurnCursor};
use super::vote::VoteTally;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::protocol::{Notification, ServerMessage};
use crate::types::*;
use crate::words::WordPool;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeSet;

/// A typed request against a chat's session
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    StartLobby {
        starter: Player,
        target_player_count: usize,
    },
    Join {
        player: Player,
    },
    SubmitAssociation {
        player_id: PlayerId,
        text: String,
    },
    ForceVote,
    CastVote {
        voter_id: PlayerId,
        target_id: PlayerId,
    },
    Exit,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartLobby { .. } => "start a lobby",
            Action::Join { .. } => "join",
            Action::SubmitAssociation { .. } => "submit an association",
            Action::ForceVote => "force the vote",
            Action::CastVote { .. } => "vote",
            Action::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub chat_id: ChatId,
    pub phase: GamePhase,
    pub phase_started_at: DateTime<Utc>,
    pub target_player_count: usize,
    /// In join order
    pub players: Vec<Player>,
    pub impostor_ids: BTreeSet<PlayerId>,
    pub secret: Option<WordEntry>,
    pub turns: TurnCursor,
    pub tally: VoteTally,
    pub max_rounds: u32,
    pub max_association_chars: usize,
}

impl Session {
    /// Open a lobby with `starter` as its first player.
    ///
    /// A lobby of one is full immediately and goes straight to role
    /// distribution, which may abort the session if the pool is empty.
    pub fn open<R: Rng + ?Sized>(
        chat_id: ChatId,
        starter: Player,
        target_player_count: usize,
        config: &GameConfig,
        pool: &WordPool,
        rng: &mut R,
    ) -> GameResult<(Self, Vec<Notification>)> {
        if !(1..=config.max_lobby_size).contains(&target_player_count) {
            return Err(GameError::InvalidLobbySize {
                max: config.max_lobby_size,
            });
        }

        let mut session = Self {
            id: ulid::Ulid::new().to_string(),
            chat_id,
            phase: GamePhase::Lobby,
            phase_started_at: Utc::now(),
            target_player_count,
            players: vec![starter],
            impostor_ids: BTreeSet::new(),
            secret: None,
            turns: TurnCursor::new(Vec::new(), config.association_rounds),
            tally: VoteTally::new(),
            max_rounds: config.association_rounds,
            max_association_chars: config.max_association_chars,
        };

        tracing::info!(
            "Lobby {} opened in chat {} for {} players",
            session.id,
            session.chat_id,
            target_player_count
        );

        let mut out = vec![Notification::chat(ServerMessage::LobbyOpened {
            session_id: session.id.clone(),
            target_player_count,
            players: session.players.clone(),
        })];

        if session.is_full() {
            out.extend(session.distribute_roles(pool, rng));
        }

        Ok((session, out))
    }

    /// Apply one action. Rejected actions leave the session unchanged.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        action: Action,
        config: &GameConfig,
        pool: &WordPool,
        rng: &mut R,
    ) -> GameResult<Vec<Notification>> {
        match (self.phase, action) {
            (_, Action::Exit) => Ok(self.abort("The game was ended")),

            (
                GamePhase::Finished,
                Action::StartLobby {
                    starter,
                    target_player_count,
                },
            ) => {
                let (fresh, out) = Self::open(
                    self.chat_id.clone(),
                    starter,
                    target_player_count,
                    config,
                    pool,
                    rng,
                )?;
                *self = fresh;
                Ok(out)
            }

            (GamePhase::Lobby, Action::Join { player }) => self.join(player, pool, rng),

            (GamePhase::Association, Action::SubmitAssociation { player_id, text }) => {
                self.submit_association(&player_id, &text)
            }

            (GamePhase::Association, Action::ForceVote) => {
                tracing::info!("Vote forced in chat {}", self.chat_id);
                Ok(self.begin_voting())
            }

            (
                GamePhase::Voting,
                Action::CastVote {
                    voter_id,
                    target_id,
                },
            ) => self.cast_vote(&voter_id, &target_id),

            (_, Action::StartLobby { .. }) => Err(GameError::SessionExists),

            (phase, action) => Err(GameError::InvalidTransition {
                phase,
                action: action.name(),
            }),
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.target_player_count
    }

    pub fn current_speaker(&self) -> Option<&Player> {
        if self.phase != GamePhase::Association {
            return None;
        }
        self.turns.current_speaker().and_then(|id| self.player(id))
    }

    /// Whether the session has been discarded and should be dropped
    pub fn is_idle(&self) -> bool {
        self.phase == GamePhase::Idle
    }

    fn enter(&mut self, phase: GamePhase) {
        tracing::debug!("Chat {}: {:?} -> {:?}", self.chat_id, self.phase, phase);
        self.phase = phase;
        self.phase_started_at = Utc::now();
    }

    fn players_for(&self, ids: impl IntoIterator<Item = PlayerId>) -> Vec<Player> {
        ids.into_iter()
            .filter_map(|id| self.player(&id).cloned())
            .collect()
    }

    fn join<R: Rng + ?Sized>(
        &mut self,
        player: Player,
        pool: &WordPool,
        rng: &mut R,
    ) -> GameResult<Vec<Notification>> {
        if self.player(&player.id).is_some() {
            return Err(GameError::DuplicateJoin);
        }
        if self.is_full() {
            return Err(GameError::LobbyFull);
        }

        tracing::info!("{} joined lobby in chat {}", player.display_name, self.chat_id);
        self.players.push(player.clone());

        let mut out = vec![Notification::chat(ServerMessage::PlayerJoined {
            player,
            players: self.players.clone(),
            target_player_count: self.target_player_count,
        })];

        if self.is_full() {
            out.extend(self.distribute_roles(pool, rng));
        }
        Ok(out)
    }

    /// Deal the word, the impostors and the speaking order, then open the
    /// first association turn. An empty pool aborts the session.
    fn distribute_roles<R: Rng + ?Sized>(
        &mut self,
        pool: &WordPool,
        rng: &mut R,
    ) -> Vec<Notification> {
        self.enter(GamePhase::RoleDistribution);

        let secret = match pool.pick(rng) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!("Cannot start game in chat {}: {}", self.chat_id, e);
                return self.abort("No words are available, the game cannot start");
            }
        };

        self.impostor_ids = select_impostors(&self.players, rng);
        self.turns = TurnCursor::new(random_order(&self.players, rng), self.max_rounds);
        self.tally = VoteTally::new();

        tracing::info!(
            "Game {} started in chat {} with {} players, {} impostor(s)",
            self.id,
            self.chat_id,
            self.players.len(),
            self.impostor_ids.len()
        );

        let mut out = vec![Notification::chat(ServerMessage::GameStarted {
            speaking_order: self.players_for(self.turns.order.clone()),
            max_rounds: self.max_rounds,
        })];

        for player in &self.players {
            let role = if self.impostor_ids.contains(&player.id) {
                Role::Impostor {
                    theme: secret.theme.clone(),
                }
            } else {
                Role::Civilian {
                    word: secret.word.clone(),
                    theme: secret.theme.clone(),
                }
            };
            out.push(Notification::player(
                player.id.clone(),
                ServerMessage::RoleAssigned { role },
            ));
        }

        self.secret = Some(secret);
        self.enter(GamePhase::Association);
        out.extend(self.turn_started());
        out
    }

    fn turn_started(&self) -> Option<Notification> {
        self.current_speaker().map(|speaker| {
            Notification::chat(ServerMessage::TurnStarted {
                speaker: speaker.clone(),
                round: self.turns.round,
                max_rounds: self.max_rounds,
            })
        })
    }

    fn submit_association(
        &mut self,
        player_id: &PlayerId,
        text: &str,
    ) -> GameResult<Vec<Notification>> {
        let player = self.player(player_id).cloned().ok_or(GameError::NotAPlayer)?;
        if self.turns.current_speaker() != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::EmptyAssociation);
        }
        let text: String = text.chars().take(self.max_association_chars).collect();

        let mut out = vec![Notification::chat(ServerMessage::AssociationPosted {
            player,
            text,
            round: self.turns.round,
        })];

        match self.turns.advance() {
            TurnAdvance::NextSpeaker | TurnAdvance::NextRound => out.extend(self.turn_started()),
            TurnAdvance::Exhausted => out.extend(self.begin_voting()),
        }
        Ok(out)
    }

    /// Open the vote. A lone player has nobody to vote for, so the game is
    /// resolved on the spot with an empty tally.
    fn begin_voting(&mut self) -> Vec<Notification> {
        self.tally = VoteTally::new();
        self.enter(GamePhase::Voting);

        let mut out = vec![Notification::chat(ServerMessage::VotingStarted {
            candidates: self.players.clone(),
        })];
        if self.players.len() < 2 {
            out.push(self.finish());
        }
        out
    }

    fn cast_vote(
        &mut self,
        voter_id: &PlayerId,
        target_id: &PlayerId,
    ) -> GameResult<Vec<Notification>> {
        let voter = self.player(voter_id).cloned().ok_or(GameError::NotAPlayer)?;
        if self.player(target_id).is_none() {
            return Err(GameError::UnknownTarget);
        }

        self.tally.cast(voter_id, target_id)?;

        let mut out = vec![Notification::chat(ServerMessage::VoteRecorded {
            voter,
            votes_cast: self.tally.voted_ids.len(),
            votes_needed: self.players.len(),
        })];

        if self.tally.is_complete(&self.players) {
            out.push(self.finish());
        }
        Ok(out)
    }

    fn finish(&mut self) -> Notification {
        let outcome = self.tally.resolve(&self.impostor_ids);
        let winner = outcome.winner(&self.impostor_ids);
        self.enter(GamePhase::Finished);

        tracing::info!(
            "Game {} in chat {} finished: {:?}, winner {:?}",
            self.id,
            self.chat_id,
            outcome,
            winner
        );

        let (word, theme) = self
            .secret
            .as_ref()
            .map(|s| (s.word.clone(), s.theme.clone()))
            .unwrap_or_default();

        Notification::chat(ServerMessage::GameFinished {
            outcome,
            winner,
            impostors: self.players_for(self.impostor_ids.clone()),
            word,
            theme,
            votes: self.tally.votes.clone(),
        })
    }

    fn abort(&mut self, reason: &str) -> Vec<Notification> {
        tracing::info!("Session {} in chat {} aborted: {}", self.id, self.chat_id, reason);
        self.enter(GamePhase::Idle);

        vec![Notification::chat(ServerMessage::GameAborted {
            reason: reason.to_string(),
        })]
    }
}
