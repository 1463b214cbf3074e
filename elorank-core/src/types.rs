use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::error::{RankingError, Result};

/// One rating snapshot, appended after every comparison an item takes part in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingSnapshot {
    pub rating: f64,
    pub timestamp: DateTime<Utc>,
}

/// A participant being ranked.
///
/// Values handed out by the engine are independent copies; mutating them has
/// no effect on the engine's state.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankableItem {
    /// Caller-assigned identifier, unique within an engine.
    pub id: String,
    /// Rating at creation. Never changes.
    pub initial_rating: f64,
    pub current_rating: f64,
    /// Always equals `wins + losses + ties`.
    pub comparisons: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// `None` until the first comparison.
    pub last_comparison_time: Option<DateTime<Utc>>,
    /// Append-only, one entry per comparison.
    pub rating_history: Vec<RatingSnapshot>,
}

impl RankableItem {
    pub(crate) fn new(id: String, initial_rating: f64) -> Self {
        RankableItem {
            id,
            initial_rating,
            current_rating: initial_rating,
            comparisons: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            last_comparison_time: None,
            rating_history: Vec::new(),
        }
    }

    /// Fraction of comparisons won, counting ties as half a win.
    /// `None` before the first comparison.
    pub fn win_rate(&self) -> Option<f64> {
        if self.comparisons == 0 {
            return None;
        }
        Some((self.wins as f64 + 0.5 * self.ties as f64) / self.comparisons as f64)
    }
}

/// Outcome of a comparison, from the perspective of the first item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    /// Actual scores `(first, second)`.
    pub fn scores(self) -> (f64, f64) {
        match self {
            Outcome::Win => (1.0, 0.0),
            Outcome::Loss => (0.0, 1.0),
            Outcome::Tie => (0.5, 0.5),
        }
    }

    /// The same outcome seen from the second item's side.
    pub fn reversed(self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
        }
    }
}

/// An immutable comparison event fed into the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonResult {
    pub item_id1: String,
    pub item_id2: String,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
    /// Opaque to the engine. Carried for the caller's own bookkeeping.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl ComparisonResult {
    pub fn new(
        item_id1: impl Into<String>,
        item_id2: impl Into<String>,
        outcome: Outcome,
        timestamp: DateTime<Utc>,
    ) -> Self {
        ComparisonResult {
            item_id1: item_id1.into(),
            item_id2: item_id2.into(),
            outcome,
            timestamp,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A suggested pairing: two item ids to be compared.
pub type Pair = (String, String);

/// Owned id → item store. Items live in insertion order in a `Vec`;
/// the map points each id at its slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    items: Vec<RankableItem>,
    id_to_idx: HashMap<String, usize>,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_idx.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Result<usize> {
        self.id_to_idx
            .get(id)
            .copied()
            .ok_or_else(|| RankingError::not_found(id))
    }

    pub fn get(&self, id: &str) -> Result<&RankableItem> {
        let idx = self.index_of(id)?;
        Ok(&self.items[idx])
    }

    pub fn items(&self) -> &[RankableItem] {
        &self.items
    }

    pub fn insert(&mut self, item: RankableItem) -> Result<()> {
        if self.contains(&item.id) {
            return Err(RankingError::DuplicateItem { id: item.id });
        }
        self.id_to_idx.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<RankableItem> {
        let idx = self.index_of(id)?;
        self.id_to_idx.remove(id);
        let removed = self.items.remove(idx);
        // Slots after the removed one shift down by one.
        for item in &self.items[idx..] {
            if let Some(slot) = self.id_to_idx.get_mut(&item.id) {
                *slot -= 1;
            }
        }
        Ok(removed)
    }

    /// Mutable access to two distinct slots at once.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> (&mut RankableItem, &mut RankableItem) {
        assert_ne!(a, b, "pair_mut requires two distinct slots");
        if a < b {
            let (left, right) = self.items.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.items.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }
}
