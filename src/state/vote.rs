//! Vote tally: one ballot per player and the outcome of a finished vote.

use crate::error::{GameError, GameResult};
use crate::types::{Outcome, Player, PlayerId};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One-vote-per-player tally for the voting phase
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    /// Votes received per target
    pub votes: HashMap<PlayerId, u32>,
    /// Players who have already cast their vote
    pub voted_ids: HashSet<PlayerId>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `voter`'s vote for `target`. Self-votes and repeat votes are
    /// rejected without touching the tally.
    pub fn cast(&mut self, voter: &PlayerId, target: &PlayerId) -> GameResult<()> {
        if voter == target {
            return Err(GameError::SelfVote);
        }
        if self.voted_ids.contains(voter) {
            return Err(GameError::RepeatVote);
        }

        *self.votes.entry(target.clone()).or_insert(0) += 1;
        self.voted_ids.insert(voter.clone());
        Ok(())
    }

    pub fn is_complete(&self, players: &[Player]) -> bool {
        players.iter().all(|p| self.voted_ids.contains(&p.id))
    }

    /// Classify the vote. Players holding the maximum count are the suspects.
    pub fn resolve(&self, impostors: &BTreeSet<PlayerId>) -> Outcome {
        if impostors.is_empty() {
            return Outcome::NoImpostor;
        }

        let max_count = self.votes.values().copied().max().unwrap_or(0);
        let mut top: BTreeSet<PlayerId> = self
            .votes
            .iter()
            .filter(|(_, &count)| count == max_count)
            .map(|(id, _)| id.clone())
            .collect();

        if top.len() == 1 {
            if let Some(id) = top.pop_first() {
                return Outcome::UniqueSuspect(id);
            }
        }
        Outcome::TiedSuspects(top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Winner;

    fn id(s: &str) -> PlayerId {
        s.to_string()
    }

    fn set(ids: &[&str]) -> BTreeSet<PlayerId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn votes_for(t: &VoteTally, target: &str) -> u32 {
        t.votes.get(target).copied().unwrap_or(0)
    }

    fn tally(counts: &[(&str, u32)]) -> VoteTally {
        VoteTally {
            votes: counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            voted_ids: HashSet::new(),
        }
    }

    #[test]
    fn test_cast_counts_vote() {
        let mut t = VoteTally::new();
        t.cast(&id("a"), &id("b")).unwrap();
        t.cast(&id("c"), &id("b")).unwrap();

        assert_eq!(votes_for(&t, "b"), 2);
        assert!(t.voted_ids.contains("a"));
        assert!(t.voted_ids.contains("c"));
    }

    #[test]
    fn test_self_vote_rejected_without_change() {
        let mut t = VoteTally::new();
        assert_eq!(t.cast(&id("a"), &id("a")), Err(GameError::SelfVote));
        assert!(t.votes.is_empty());
        assert!(t.voted_ids.is_empty());
    }

    #[test]
    fn test_repeat_vote_rejected_without_change() {
        let mut t = VoteTally::new();
        t.cast(&id("a"), &id("b")).unwrap();
        assert_eq!(t.cast(&id("a"), &id("c")), Err(GameError::RepeatVote));
        assert_eq!(votes_for(&t, "b"), 1);
        assert_eq!(votes_for(&t, "c"), 0);
        assert_eq!(t.voted_ids.len(), 1);
    }

    #[test]
    fn test_is_complete() {
        let players: Vec<Player> = ["a", "b"]
            .iter()
            .map(|s| Player {
                id: id(s),
                display_name: s.to_uppercase(),
            })
            .collect();
        let mut t = VoteTally::new();
        assert!(!t.is_complete(&players));
        t.cast(&id("a"), &id("b")).unwrap();
        assert!(!t.is_complete(&players));
        t.cast(&id("b"), &id("a")).unwrap();
        assert!(t.is_complete(&players));
    }

    #[test]
    fn test_tie_including_non_impostor_loses() {
        let impostors = set(&["a"]);
        let outcome = tally(&[("a", 2), ("b", 2)]).resolve(&impostors);

        assert_eq!(outcome, Outcome::TiedSuspects(set(&["a", "b"])));
        assert_eq!(outcome.winner(&impostors), Winner::Impostors);
    }

    #[test]
    fn test_unique_suspect_caught() {
        let impostors = set(&["a"]);
        let outcome = tally(&[("a", 3), ("b", 1)]).resolve(&impostors);

        assert_eq!(outcome, Outcome::UniqueSuspect(id("a")));
        assert_eq!(outcome.winner(&impostors), Winner::Civilians);
    }

    #[test]
    fn test_unique_suspect_innocent() {
        let impostors = set(&["a"]);
        let outcome = tally(&[("a", 1), ("b", 3)]).resolve(&impostors);

        assert_eq!(outcome, Outcome::UniqueSuspect(id("b")));
        assert_eq!(outcome.winner(&impostors), Winner::Impostors);
    }

    #[test]
    fn test_no_impostor_ignores_votes() {
        let outcome = tally(&[("a", 3), ("b", 1)]).resolve(&BTreeSet::new());
        assert_eq!(outcome, Outcome::NoImpostor);

        let outcome = tally(&[]).resolve(&BTreeSet::new());
        assert_eq!(outcome, Outcome::NoImpostor);
    }
}
