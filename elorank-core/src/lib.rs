/// elorank-core: Elo-style rating engine for pairwise comparisons.
///
/// Outcome (win / loss / tie) → rating update → next pair to compare → progress.
/// No IO and no clock. State and math only; bring your own judge.
///
/// Items are identified by caller-provided string ids. The engine owns every
/// item; all queries hand back copies.
///
/// # Quick start
///
/// ```rust
/// use chrono::Utc;
/// use elorank_core::{ComparisonResult, EngineConfig, Outcome, RankingEngine, StabilityCriteria};
///
/// let mut engine = RankingEngine::new(["pizza", "sushi", "tacos"], EngineConfig::default())?;
///
/// while let Some((a, b)) = engine.next_comparison(Utc::now())? {
///     // Ask your judge. Here the alphabetically-first item always wins.
///     let outcome = if a < b { Outcome::Win } else { Outcome::Loss };
///     engine.record_comparison(&ComparisonResult::new(a, b, outcome, Utc::now()))?;
/// }
///
/// for item in engine.rankings() {
///     println!("{}: {:.1}", item.id, item.current_rating);
/// }
/// let done = engine.progress(&StabilityCriteria::default());
/// assert!((0.0..=1.0).contains(&done));
/// # Ok::<(), elorank_core::RankingError>(())
/// ```

pub mod constants;
pub mod elo;
pub mod engine;
pub mod error;
pub mod pairing;
pub mod stability;
pub mod types;

// Re-export primary public API at crate root.
pub use engine::{calculate_remaining_comparisons, EngineConfig, InitialItem, RankingEngine};
pub use error::{RankingError, Result};
pub use pairing::{score_opponent, OpponentScore};
pub use stability::{is_stable, StabilityCriteria};
pub use types::{ComparisonResult, Outcome, Pair, RankableItem, RatingSnapshot};
