//! Turn sequencing: a shuffled speaking order walked round by round.

use crate::types::{Player, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniformly shuffled speaking order; every player appears exactly once
pub fn random_order<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> Vec<PlayerId> {
    let mut order: Vec<PlayerId> = players.iter().map(|p| p.id.clone()).collect();
    order.shuffle(rng);
    order
}

/// Result of moving past the current speaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAdvance {
    NextSpeaker,
    NextRound,
    /// The last round is done; association is over
    Exhausted,
}

/// Tracks whose turn it is across association rounds.
#[derive(Debug, Clone)]
pub struct TurnCursor {
    pub order: Vec<PlayerId>,
    pub speaker_index: usize,
    /// 1-based
    pub round: u32,
    pub max_rounds: u32,
}

impl TurnCursor {
    pub fn new(order: Vec<PlayerId>, max_rounds: u32) -> Self {
        Self {
            order,
            speaker_index: 0,
            round: 1,
            max_rounds,
        }
    }

    pub fn current_speaker(&self) -> Option<&PlayerId> {
        self.order.get(self.speaker_index)
    }

    pub fn advance(&mut self) -> TurnAdvance {
        if self.speaker_index + 1 < self.order.len() {
            self.speaker_index += 1;
            return TurnAdvance::NextSpeaker;
        }

        self.speaker_index = 0;
        if self.round >= self.max_rounds {
            // Leave round at max_rounds; the cursor is no longer consulted
            return TurnAdvance::Exhausted;
        }
        self.round += 1;
        TurnAdvance::NextRound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn ids(n: usize) -> Vec<PlayerId> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    #[test]
    fn test_random_order_is_permutation() {
        let mut rng = StdRng::seed_from_u64(11);
        let players: Vec<Player> = ids(7)
            .into_iter()
            .map(|id| Player {
                display_name: id.to_uppercase(),
                id,
            })
            .collect();

        for _ in 0..100 {
            let order = random_order(&players, &mut rng);
            assert_eq!(order.len(), players.len());
            let unique: HashSet<_> = order.iter().collect();
            assert_eq!(unique.len(), players.len());
            assert!(players.iter().all(|p| unique.contains(&p.id)));
        }
    }

    #[test]
    fn test_cursor_cycles_and_exhausts() {
        let n = 4;
        let rounds = 3;
        let mut cursor = TurnCursor::new(ids(n), rounds);
        let mut seen = Vec::new();

        loop {
            seen.push((cursor.round, cursor.speaker_index));
            match cursor.advance() {
                TurnAdvance::Exhausted => break,
                _ => continue,
            }
        }

        assert_eq!(seen.len(), n * rounds as usize);
        for (i, (round, speaker)) in seen.iter().enumerate() {
            assert_eq!(*speaker, i % n);
            assert_eq!(*round as usize, i / n + 1);
        }
    }

    #[test]
    fn test_single_player_single_round() {
        let mut cursor = TurnCursor::new(ids(1), 1);
        assert_eq!(cursor.current_speaker().map(String::as_str), Some("p0"));
        assert_eq!(cursor.advance(), TurnAdvance::Exhausted);
    }

    #[test]
    fn test_round_rollover() {
        let mut cursor = TurnCursor::new(ids(2), 2);
        assert_eq!(cursor.advance(), TurnAdvance::NextSpeaker);
        assert_eq!(cursor.advance(), TurnAdvance::NextRound);
        assert_eq!(cursor.round, 2);
        assert_eq!(cursor.speaker_index, 0);
    }
}
