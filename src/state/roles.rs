//! Role assignment: how many impostors a game gets, and who they are.

use crate::types::{Player, PlayerId};
use rand::distr::{weighted::WeightedIndex, Distribution};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Relative likelihood of dealing exactly `k` impostors.
///
/// One impostor dominates, "no impostor" stays possible, and larger counts
/// fade out but never reach zero weight.
pub fn impostor_weight(k: usize) -> u32 {
    match k {
        0 => 50,
        1 => 200,
        k => {
            let weight = 100i64 - 15 * k as i64;
            weight.max(1) as u32
        }
    }
}

/// Draw an impostor count in `0..=player_count`
pub fn choose_impostor_count<R: Rng + ?Sized>(player_count: usize, rng: &mut R) -> usize {
    if player_count == 0 {
        return 0;
    }

    let weights: Vec<u32> = (0..=player_count).map(impostor_weight).collect();
    WeightedIndex::new(&weights)
        .map(|dist| dist.sample(rng))
        .unwrap_or(0)
}

/// Pick distinct impostors uniformly from `players`. An empty set means the
/// game has no impostor.
pub fn select_impostors<R: Rng + ?Sized>(players: &[Player], rng: &mut R) -> BTreeSet<PlayerId> {
    let count = choose_impostor_count(players.len(), rng);
    players
        .choose_multiple(rng, count)
        .map(|p| p.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                id: format!("p{}", i),
                display_name: format!("Player {}", i),
            })
            .collect()
    }

    #[test]
    fn test_weights() {
        assert_eq!(impostor_weight(0), 50);
        assert_eq!(impostor_weight(1), 200);
        assert_eq!(impostor_weight(2), 70);
        assert_eq!(impostor_weight(6), 10);
        assert_eq!(impostor_weight(7), 1);
        assert_eq!(impostor_weight(40), 1);
    }

    #[test]
    fn test_zero_players_means_zero_impostors() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(choose_impostor_count(0, &mut rng), 0);
        assert!(select_impostors(&[], &mut rng).is_empty());
    }

    #[test]
    fn test_count_always_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..=12 {
            for _ in 0..200 {
                let count = choose_impostor_count(n, &mut rng);
                assert!(count <= n, "count {} out of range for {} players", count, n);
            }
        }
    }

    #[test]
    fn test_one_impostor_is_most_frequent() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 6;
        let mut freq = vec![0u32; n + 1];
        for _ in 0..5000 {
            freq[choose_impostor_count(n, &mut rng)] += 1;
        }

        for (k, &f) in freq.iter().enumerate() {
            if k != 1 {
                assert!(freq[1] > f, "1 impostor ({}) not above {} ({})", freq[1], k, f);
            }
        }
    }

    #[test]
    fn test_impostors_are_distinct_members() {
        let mut rng = StdRng::seed_from_u64(3);
        let roster = players(5);
        for _ in 0..500 {
            let impostors = select_impostors(&roster, &mut rng);
            assert!(impostors.len() <= roster.len());
            for id in &impostors {
                assert!(roster.iter().any(|p| &p.id == id));
            }
        }
    }
}
