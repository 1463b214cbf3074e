/// Next-comparison selection.
///
/// The default policy pairs the least-compared item with the opponent that
/// scores highest on a weighted composite of rating proximity, experience
/// proximity and idleness. Internal functions work on registry slot indices;
/// the engine maps them back to ids.
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::constants::{
    COMPARISON_PROXIMITY_WEIGHT, ELO_SCALE, RATING_PROXIMITY_WEIGHT, RECENCY_WEIGHT,
    RECENCY_WINDOW_DAYS,
};
use crate::types::RankableItem;

/// Breakdown of how attractive `opponent` is as the next match for a subject item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpponentScore {
    /// `1 / (1 + |ΔR| / 400)`
    pub rating: f64,
    /// `1 / (1 + |Δcomparisons|)`
    pub comparisons: f64,
    /// Idle time as a fraction of the recency window, capped at 1.
    pub recency: f64,
    pub composite: f64,
}

/// Score `opponent` as a match for `subject` at time `now`.
pub fn score_opponent(
    subject: &RankableItem,
    opponent: &RankableItem,
    now: DateTime<Utc>,
) -> OpponentScore {
    let rating_gap = (subject.current_rating - opponent.current_rating).abs();
    let rating = 1.0 / (1.0 + rating_gap / ELO_SCALE);

    let comparison_gap = subject.comparisons.abs_diff(opponent.comparisons);
    let comparisons = 1.0 / (1.0 + comparison_gap as f64);

    let recency = recency_score(opponent.last_comparison_time, now);

    let composite = RATING_PROXIMITY_WEIGHT * rating
        + COMPARISON_PROXIMITY_WEIGHT * comparisons
        + RECENCY_WEIGHT * recency;

    OpponentScore {
        rating,
        comparisons,
        recency,
        composite,
    }
}

/// 1.0 for never-compared items, otherwise elapsed time over the window, capped at 1.
/// A last-comparison time in the future of `now` scores below 0.
fn recency_score(last_comparison_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(last) = last_comparison_time else {
        return 1.0;
    };
    let window = Duration::days(RECENCY_WINDOW_DAYS);
    let elapsed = (now - last).num_milliseconds() as f64;
    (elapsed / window.num_milliseconds() as f64).min(1.0)
}

/// Slot of the item with the fewest comparisons. Ties go to the earliest slot.
pub(crate) fn least_compared_indexed(items: &[RankableItem]) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .min_by_key(|(_, item)| item.comparisons)
        .map(|(idx, _)| idx)
}

/// Slot of the highest-scoring opponent for `subject_idx`.
///
/// Only a strictly higher composite displaces the current best, so equal
/// scores resolve to the earliest slot.
pub(crate) fn best_opponent_indexed(
    items: &[RankableItem],
    subject_idx: usize,
    now: DateTime<Utc>,
) -> Option<usize> {
    let subject = &items[subject_idx];
    let mut best: Option<(usize, f64)> = None;

    for (idx, opponent) in items.iter().enumerate() {
        if idx == subject_idx {
            continue;
        }
        let score = score_opponent(subject, opponent, now);
        tracing::trace!(
            subject = %subject.id,
            opponent = %opponent.id,
            composite = score.composite,
            "scored opponent"
        );
        match best {
            Some((_, best_score)) if score.composite <= best_score => {}
            _ => best = Some((idx, score.composite)),
        }
    }

    best.map(|(idx, _)| idx)
}

/// Uniformly random distinct pair drawn from `candidates` (slot indices).
pub(crate) fn random_pair_indexed(
    candidates: &[usize],
    rng: &mut impl Rng,
) -> Option<(usize, usize)> {
    if candidates.len() < 2 {
        return None;
    }
    let picked = rand::seq::index::sample(rng, candidates.len(), 2);
    Some((candidates[picked.index(0)], candidates[picked.index(1)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn item(id: &str, rating: f64, comparisons: u32) -> RankableItem {
        let mut item = RankableItem::new(id.to_string(), rating);
        item.comparisons = comparisons;
        item.wins = comparisons;
        item
    }

    #[test]
    fn test_identical_fresh_items_score_one() {
        let a = item("a", 1500.0, 0);
        let b = item("b", 1500.0, 0);
        let score = score_opponent(&a, &b, now());
        assert_eq!(score.rating, 1.0);
        assert_eq!(score.comparisons, 1.0);
        assert_eq!(score.recency, 1.0);
        assert!((score.composite - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rating_proximity_halves_at_400_points() {
        let a = item("a", 1500.0, 0);
        let b = item("b", 1900.0, 0);
        let score = score_opponent(&a, &b, now());
        assert!((score.rating - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_comparison_proximity() {
        let a = item("a", 1500.0, 1);
        let b = item("b", 1500.0, 4);
        let score = score_opponent(&a, &b, now());
        assert!((score.comparisons - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_recency_scales_with_idle_time() {
        let a = item("a", 1500.0, 0);
        let mut b = item("b", 1500.0, 0);

        b.last_comparison_time = Some(now() - Duration::hours(84));
        let half = score_opponent(&a, &b, now());
        assert!((half.recency - 0.5).abs() < 1e-9);

        b.last_comparison_time = Some(now() - Duration::days(30));
        assert_eq!(score_opponent(&a, &b, now()).recency, 1.0);

        b.last_comparison_time = Some(now());
        assert_eq!(score_opponent(&a, &b, now()).recency, 0.0);

        b.last_comparison_time = Some(now() + Duration::days(1));
        assert!((score_opponent(&a, &b, now()).recency + 1.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_future_timestamps_rank_by_distance() {
        let mut far_future = item("far_future", 1500.0, 0);
        far_future.last_comparison_time = Some(now() + Duration::days(1));
        let mut near_future = item("near_future", 1500.0, 0);
        near_future.last_comparison_time = Some(now() + Duration::hours(1));
        let items = vec![item("s", 1500.0, 0), far_future, near_future];

        assert!(
            score_opponent(&items[0], &items[2], now()).recency
                > score_opponent(&items[0], &items[1], now()).recency
        );
        assert_eq!(best_opponent_indexed(&items, 0, now()), Some(2));
    }

    #[test]
    fn test_least_compared_prefers_earliest_on_ties() {
        let items = vec![item("a", 1500.0, 3), item("b", 1500.0, 1), item("c", 1500.0, 1)];
        assert_eq!(least_compared_indexed(&items), Some(1));
        assert_eq!(least_compared_indexed(&[]), None);
    }

    #[test]
    fn test_best_opponent_prefers_close_rating() {
        let items = vec![
            item("subject", 1500.0, 0),
            item("far", 2200.0, 0),
            item("near", 1520.0, 0),
        ];
        assert_eq!(best_opponent_indexed(&items, 0, now()), Some(2));
    }

    #[test]
    fn test_best_opponent_tie_goes_to_earliest() {
        let items = vec![
            item("x", 1600.0, 0),
            item("subject", 1500.0, 0),
            item("y", 1400.0, 0),
        ];
        assert_eq!(best_opponent_indexed(&items, 1, now()), Some(0));
    }

    #[test]
    fn test_best_opponent_none_when_alone() {
        let items = vec![item("solo", 1500.0, 0)];
        assert_eq!(best_opponent_indexed(&items, 0, now()), None);
    }

    #[test]
    fn test_random_pair_is_distinct_and_seeded() {
        let candidates = vec![2, 5, 7, 9];
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let (a, b) = random_pair_indexed(&candidates, &mut rng).unwrap();
            assert_ne!(a, b);
            assert!(candidates.contains(&a) && candidates.contains(&b));
        }

        let first = random_pair_indexed(&candidates, &mut SmallRng::seed_from_u64(42));
        let second = random_pair_indexed(&candidates, &mut SmallRng::seed_from_u64(42));
        assert_eq!(first, second);

        assert_eq!(random_pair_indexed(&[3], &mut rng), None);
    }
}
