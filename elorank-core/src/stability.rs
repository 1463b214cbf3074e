/// Convergence accounting.
///
/// Stability is recomputed from rating history on every query; nothing is
/// cached on the item, so an item that starts moving again is reported as
/// unstable on the next call.
use crate::constants::{DEFAULT_RATING_CHANGE_THRESHOLD, DEFAULT_STABLE_COMPARISONS};
use crate::types::RankableItem;

/// Per-call parameters for the stability check.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StabilityCriteria {
    /// Every consecutive rating change in the window must be strictly below this.
    pub rating_change_threshold: f64,
    /// Minimum comparisons, and the length of the trailing history window.
    pub stable_comparisons: usize,
}

impl Default for StabilityCriteria {
    fn default() -> Self {
        StabilityCriteria {
            rating_change_threshold: DEFAULT_RATING_CHANGE_THRESHOLD,
            stable_comparisons: DEFAULT_STABLE_COMPARISONS,
        }
    }
}

impl StabilityCriteria {
    pub fn new(rating_change_threshold: f64, stable_comparisons: usize) -> Self {
        StabilityCriteria {
            rating_change_threshold,
            stable_comparisons,
        }
    }
}

/// Whether `item` has settled under `criteria`.
///
/// Requires at least `stable_comparisons` comparisons, and every step between
/// consecutive snapshots in the last `stable_comparisons` history entries to
/// move the rating by strictly less than the threshold.
pub fn is_stable(item: &RankableItem, criteria: &StabilityCriteria) -> bool {
    let window = criteria.stable_comparisons;
    if (item.comparisons as usize) < window {
        return false;
    }

    let history = &item.rating_history;
    let start = history.len().saturating_sub(window);
    history[start..]
        .windows(2)
        .all(|pair| (pair[1].rating - pair[0].rating).abs() < criteria.rating_change_threshold)
}

/// Fraction of `items` that are stable. An empty population is complete.
pub fn progress(items: &[RankableItem], criteria: &StabilityCriteria) -> f64 {
    if items.is_empty() {
        return 1.0;
    }
    let stable = items.iter().filter(|item| is_stable(item, criteria)).count();
    stable as f64 / items.len() as f64
}
