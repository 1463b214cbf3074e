/// Ranking engine: owns the item registry, applies comparison outcomes and
/// answers "who should be compared next" and "how converged are we".
///
/// Pure computation: no IO, no clock, no locking. The caller performs
/// comparisons externally, feeds results back, and supplies the current time
/// when asking for the next pair.
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::constants::{
    DEFAULT_INITIAL_RATING, DEFAULT_K_FACTOR, DEFAULT_MINIMUM_COMPARISONS, DEFAULT_MIN_RATING,
};
use crate::elo::update_ratings;
use crate::error::{RankingError, Result};
use crate::pairing::{best_opponent_indexed, least_compared_indexed, random_pair_indexed};
use crate::stability::{is_stable, progress, StabilityCriteria};
use crate::types::{ComparisonResult, Outcome, Pair, RankableItem, RatingSnapshot, Registry};

/// Configuration for the ranking engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Maximum rating movement per comparison, shared by all items.
    pub k_factor: f64,
    /// Once the least-compared item reaches this count, selection reports nothing to do.
    pub minimum_comparisons: u32,
    /// Rating for items added without one.
    pub default_initial_rating: f64,
    /// Ratings are clamped to this floor after every update.
    pub min_rating: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            k_factor: DEFAULT_K_FACTOR,
            minimum_comparisons: DEFAULT_MINIMUM_COMPARISONS,
            default_initial_rating: DEFAULT_INITIAL_RATING,
            min_rating: DEFAULT_MIN_RATING,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(RankingError::ConfigurationRange {
                parameter: "k_factor",
                value: self.k_factor,
                reason: "must be a positive finite number",
            });
        }
        if !self.min_rating.is_finite() {
            return Err(RankingError::ConfigurationRange {
                parameter: "min_rating",
                value: self.min_rating,
                reason: "must be finite",
            });
        }
        self.check_rating("default_initial_rating", self.default_initial_rating)
    }

    fn check_rating(&self, parameter: &'static str, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(RankingError::ConfigurationRange {
                parameter,
                value,
                reason: "must be finite",
            });
        }
        if value < self.min_rating {
            return Err(RankingError::ConfigurationRange {
                parameter,
                value,
                reason: "must not be below min_rating",
            });
        }
        Ok(())
    }
}

/// An item to register at construction time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialItem {
    pub id: String,
    /// `None` uses the configured default.
    pub initial_rating: Option<f64>,
}

impl InitialItem {
    pub fn new(id: impl Into<String>) -> Self {
        InitialItem {
            id: id.into(),
            initial_rating: None,
        }
    }

    pub fn with_rating(id: impl Into<String>, rating: f64) -> Self {
        InitialItem {
            id: id.into(),
            initial_rating: Some(rating),
        }
    }
}

impl From<&str> for InitialItem {
    fn from(id: &str) -> Self {
        InitialItem::new(id)
    }
}

impl From<String> for InitialItem {
    fn from(id: String) -> Self {
        InitialItem::new(id)
    }
}

#[derive(Debug, Clone)]
pub struct RankingEngine {
    registry: Registry,
    config: EngineConfig,
}

impl RankingEngine {
    /// Build an engine over an initial item list.
    ///
    /// Fails on an invalid config, a duplicate id, or an out-of-range initial rating.
    pub fn new<I, T>(items: I, config: EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<InitialItem>,
    {
        config.validate()?;
        let mut engine = RankingEngine {
            registry: Registry::default(),
            config,
        };
        for item in items {
            let item = item.into();
            engine.add_item(item.id, item.initial_rating)?;
        }
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    pub fn add_item(&mut self, id: impl Into<String>, initial_rating: Option<f64>) -> Result<()> {
        let id = id.into();
        if self.registry.contains(&id) {
            return Err(RankingError::DuplicateItem { id });
        }
        let rating = initial_rating.unwrap_or(self.config.default_initial_rating);
        self.config.check_rating("initial_rating", rating)?;

        tracing::debug!(item = %id, rating, "adding item");
        self.registry.insert(RankableItem::new(id, rating))
    }

    /// Remove an item permanently. Its history is discarded.
    pub fn remove_item(&mut self, id: &str) -> Result<()> {
        let removed = self.registry.remove(id)?;
        tracing::debug!(item = %id, comparisons = removed.comparisons, "removed item");
        Ok(())
    }

    /// Apply one comparison outcome. Returns the total absolute rating change
    /// across both items.
    ///
    /// Both ids are validated before anything is touched, so a rejected
    /// result leaves the engine unchanged.
    pub fn record_comparison(&mut self, result: &ComparisonResult) -> Result<f64> {
        if result.item_id1 == result.item_id2 {
            return Err(RankingError::SelfComparison {
                id: result.item_id1.clone(),
            });
        }
        let idx1 = self.registry.index_of(&result.item_id1)?;
        let idx2 = self.registry.index_of(&result.item_id2)?;

        let k_factor = self.config.k_factor;
        let min_rating = self.config.min_rating;
        let (a, b) = self.registry.pair_mut(idx1, idx2);

        let (old_a, old_b) = (a.current_rating, b.current_rating);
        let update = update_ratings(old_a, old_b, result.outcome, k_factor, min_rating);

        apply_result(a, update.rating_a, result.outcome, result.timestamp);
        apply_result(b, update.rating_b, result.outcome.reversed(), result.timestamp);

        let delta = update.delta(old_a, old_b);
        tracing::debug!(
            item1 = %result.item_id1,
            item2 = %result.item_id2,
            outcome = ?result.outcome,
            expected = update.expected_a,
            rating1 = update.rating_a,
            rating2 = update.rating_b,
            delta,
            "recorded comparison"
        );
        Ok(delta)
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Suggest the next pair to compare, or `None` when there is nothing to do.
    ///
    /// The least-compared item (earliest added on ties) is paired with its
    /// highest-scoring opponent (earliest added on ties). The population counts
    /// as saturated as soon as the least-compared item has reached
    /// `minimum_comparisons`.
    pub fn next_comparison(&self, now: DateTime<Utc>) -> Result<Option<Pair>> {
        let items = self.registry.items();
        if items.len() < 2 {
            return Ok(None);
        }
        let Some(subject_idx) = least_compared_indexed(items) else {
            return Ok(None);
        };
        let subject = &items[subject_idx];
        if subject.comparisons >= self.config.minimum_comparisons {
            tracing::debug!(
                least_compared = %subject.id,
                comparisons = subject.comparisons,
                "population saturated"
            );
            return Ok(None);
        }

        let opponent_idx = best_opponent_indexed(items, subject_idx, now).ok_or_else(|| {
            RankingError::NoOpponent {
                id: subject.id.clone(),
            }
        })?;
        Ok(Some((subject.id.clone(), items[opponent_idx].id.clone())))
    }

    /// Alternate policy: a uniformly random pair among items that are not yet
    /// stable. `None` when fewer than two unstable items remain.
    pub fn random_unstable_pair(
        &self,
        rng: &mut impl Rng,
        criteria: &StabilityCriteria,
    ) -> Option<Pair> {
        let items = self.registry.items();
        let candidates: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !is_stable(item, criteria))
            .map(|(idx, _)| idx)
            .collect();

        random_pair_indexed(&candidates, rng)
            .map(|(a, b)| (items[a].id.clone(), items[b].id.clone()))
    }

    /// Whether the least-compared item has reached `minimum_comparisons`.
    ///
    /// Vacuously true for an empty engine. A lone item below the minimum is not
    /// saturated, although `next_comparison` has no pair to offer for it.
    pub fn is_saturated(&self) -> bool {
        least_compared_indexed(self.registry.items())
            .map(|idx| self.registry.items()[idx].comparisons >= self.config.minimum_comparisons)
            .unwrap_or(true)
    }

    /// Lower bound on the comparisons still needed for every item to reach
    /// `minimum_comparisons`.
    pub fn remaining_comparisons(&self) -> usize {
        let counts: Vec<u32> = self.registry.items().iter().map(|i| i.comparisons).collect();
        calculate_remaining_comparisons(&counts, self.config.minimum_comparisons)
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Fraction of items currently stable, in `[0, 1]`. Empty engines report 1.
    pub fn progress(&self, criteria: &StabilityCriteria) -> f64 {
        progress(self.registry.items(), criteria)
    }

    /// Ids of items currently stable, in insertion order.
    pub fn stable_items(&self, criteria: &StabilityCriteria) -> Vec<String> {
        self.registry
            .items()
            .iter()
            .filter(|item| is_stable(item, criteria))
            .map(|item| item.id.clone())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Queries. Everything returned is an owned copy.
    // -----------------------------------------------------------------------

    pub fn item(&self, id: &str) -> Result<RankableItem> {
        self.registry.get(id).cloned()
    }

    pub fn rating_history(&self, id: &str) -> Result<Vec<RatingSnapshot>> {
        Ok(self.registry.get(id)?.rating_history.clone())
    }

    /// All items in insertion order.
    pub fn items(&self) -> Vec<RankableItem> {
        self.registry.items().to_vec()
    }

    /// All items by descending current rating. Equal ratings keep insertion order.
    pub fn rankings(&self) -> Vec<RankableItem> {
        let mut ranked = self.items();
        ranked.sort_by(|a, b| {
            b.current_rating
                .partial_cmp(&a.current_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    pub fn contains(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }
}

fn apply_result(item: &mut RankableItem, new_rating: f64, outcome: Outcome, timestamp: DateTime<Utc>) {
    match outcome {
        Outcome::Win => item.wins += 1,
        Outcome::Loss => item.losses += 1,
        Outcome::Tie => item.ties += 1,
    }
    item.comparisons += 1;
    item.current_rating = new_rating;
    item.last_comparison_time = Some(timestamp);
    item.rating_history.push(RatingSnapshot {
        rating: new_rating,
        timestamp,
    });
}

/// Comparisons still needed before every count reaches `minimum`.
///
/// Each comparison serves two items, so this is half the total shortfall,
/// rounded up.
pub fn calculate_remaining_comparisons(comparison_counts: &[u32], minimum: u32) -> usize {
    let shortfall: usize = comparison_counts
        .iter()
        .map(|&c| minimum.saturating_sub(c) as usize)
        .sum();
    shortfall.div_ceil(2)
}
