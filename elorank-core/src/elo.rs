/// Elo rating math: expected scores and single-comparison updates.
///
/// Pure functions over plain `f64` ratings. The engine applies them to items.
use crate::constants::ELO_SCALE;
use crate::types::Outcome;

/// Expected score of an item rated `rating_a` against one rated `rating_b`.
///
/// `E_A = 1 / (1 + 10^((R_B - R_A) / 400))`, always in `(0, 1)`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / ELO_SCALE))
}

/// New ratings after one comparison, clamped to `min_rating`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloUpdate {
    pub rating_a: f64,
    pub rating_b: f64,
    pub expected_a: f64,
    pub expected_b: f64,
}

impl EloUpdate {
    /// Total absolute rating movement relative to the old ratings.
    pub fn delta(&self, old_a: f64, old_b: f64) -> f64 {
        (self.rating_a - old_a).abs() + (self.rating_b - old_b).abs()
    }
}

/// Apply one outcome (from `a`'s perspective) to a pair of ratings.
pub fn update_ratings(
    rating_a: f64,
    rating_b: f64,
    outcome: Outcome,
    k_factor: f64,
    min_rating: f64,
) -> EloUpdate {
    let expected_a = expected_score(rating_a, rating_b);
    let expected_b = 1.0 - expected_a;
    let (score_a, score_b) = outcome.scores();

    let new_a = rating_a + k_factor * (score_a - expected_a);
    let new_b = rating_b + k_factor * (score_b - expected_b);

    EloUpdate {
        rating_a: new_a.max(min_rating),
        rating_b: new_b.max(min_rating),
        expected_a,
        expected_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_score_equal_ratings() {
        assert!((expected_score(1500.0, 1500.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_expected_score_symmetry() {
        let e_ab = expected_score(1700.0, 1450.0);
        let e_ba = expected_score(1450.0, 1700.0);
        assert!((e_ab + e_ba - 1.0).abs() < 1e-12);
        assert!(e_ab > 0.5);
    }

    #[test]
    fn test_expected_score_400_points_is_ten_to_one() {
        let e = expected_score(1900.0, 1500.0);
        assert!((e - 10.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_win_between_equals() {
        let update = update_ratings(1500.0, 1500.0, Outcome::Win, 32.0, 100.0);
        assert!((update.rating_a - 1516.0).abs() < 1e-9);
        assert!((update.rating_b - 1484.0).abs() < 1e-9);
        assert!((update.delta(1500.0, 1500.0) - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_upset_moves_more_than_expected_win() {
        let favourite_wins = update_ratings(1800.0, 1500.0, Outcome::Win, 32.0, 100.0);
        let underdog_wins = update_ratings(1500.0, 1800.0, Outcome::Win, 32.0, 100.0);
        let favourite_gain = favourite_wins.rating_a - 1800.0;
        let underdog_gain = underdog_wins.rating_a - 1500.0;
        assert!(favourite_gain > 0.0);
        assert!(underdog_gain > favourite_gain);
    }

    #[test]
    fn test_tie_pulls_ratings_together() {
        let update = update_ratings(1600.0, 1400.0, Outcome::Tie, 32.0, 100.0);
        assert!(update.rating_a < 1600.0);
        assert!(update.rating_b > 1400.0);
    }

    #[test]
    fn test_floor_clamps_loser() {
        let update = update_ratings(110.0, 110.0, Outcome::Loss, 32.0, 100.0);
        assert_eq!(update.rating_a, 100.0);
        assert!((update.rating_b - 126.0).abs() < 1e-9);
    }

    #[test]
    fn test_tie_clamps_favourite_at_floor() {
        let update = update_ratings(101.0, 100.0, Outcome::Tie, 10_000.0, 100.0);
        let expected_a = expected_score(101.0, 100.0);
        assert!(101.0 + 10_000.0 * (0.5 - expected_a) < 100.0);
        assert_eq!(update.rating_a, 100.0);
        assert!(update.rating_b > 100.0);
        assert!((update.rating_b - (100.0 + 10_000.0 * (expected_a - 0.5))).abs() < 1e-9);
    }
}
