//! Round role assignment
//!
//! Picks the imposter seat and the round's topic. Assignment is redone
//! every round and never cached.

use serde::{Deserialize, Serialize};

use crate::{constants::topics::FALLBACK_TOPIC, topics::TopicCatalog};

/// Outcome of drawing roles for a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Zero-based position of the imposter in the roster
    pub imposter_index: usize,
    /// Topic every other player will see
    pub topic: String,
}

/// Draws an assignment using the thread-local generator
///
/// # Arguments
///
/// * `player_count` - Number of seats, must be positive
/// * `catalog` - Source of topics, an empty catalog yields the fallback topic
pub fn assign<C: TopicCatalog + ?Sized>(player_count: usize, catalog: &C) -> Assignment {
    assign_with(&mut fastrand::Rng::new(), player_count, catalog)
}

/// Draws an assignment from the given generator
///
/// Both the imposter seat and the topic are uniform. The caller guarantees
/// `player_count > 0`; a zero count is treated as a single seat.
pub fn assign_with<C: TopicCatalog + ?Sized>(
    rng: &mut fastrand::Rng,
    player_count: usize,
    catalog: &C,
) -> Assignment {
    let imposter_index = rng.usize(..player_count.max(1));
    let topic = rng
        .choice(catalog.names())
        .unwrap_or(FALLBACK_TOPIC)
        .to_owned();

    Assignment {
        imposter_index,
        topic,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::topics::Catalog;

    #[test]
    fn test_imposter_in_range() {
        let catalog = Catalog::builtin();
        for count in 1..=12 {
            for _ in 0..50 {
                let assignment = assign(count, &catalog);
                assert!(assignment.imposter_index < count);
            }
        }
    }

    #[test]
    fn test_topic_from_catalog() {
        let catalog = Catalog::new([("Beach", None), ("Zoo", None)]);
        for _ in 0..50 {
            let assignment = assign(4, &catalog);
            assert!(["Beach", "Zoo"].contains(&assignment.topic.as_str()));
        }
    }

    #[test]
    fn test_empty_catalog_falls_back() {
        let assignment = assign(3, &Catalog::default());
        assert_eq!(assignment.topic, FALLBACK_TOPIC);
    }

    #[test]
    fn test_imposter_distribution_is_uniform() {
        let mut rng = fastrand::Rng::with_seed(7);
        let catalog = Catalog::builtin();
        let player_count = 5;
        let draws = 50_000;

        let mut counts = vec![0usize; player_count];
        for _ in 0..draws {
            counts[assign_with(&mut rng, player_count, &catalog).imposter_index] += 1;
        }

        let expected = draws as f64 / player_count as f64;
        for count in counts {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.05, "seat drawn {count} times, expected ~{expected}");
        }
    }

    #[test]
    fn test_topic_distribution_covers_catalog() {
        let mut rng = fastrand::Rng::with_seed(11);
        let catalog = Catalog::new([("A", None), ("B", None), ("C", None)]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(assign_with(&mut rng, 3, &catalog).topic);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let catalog = Catalog::builtin();
        let first = assign_with(&mut fastrand::Rng::with_seed(3), 6, &catalog);
        let second = assign_with(&mut fastrand::Rng::with_seed(3), 6, &catalog);
        assert_eq!(first, second);
    }
}
