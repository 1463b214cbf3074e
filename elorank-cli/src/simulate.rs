/// Simulate command: ranks synthetic items with hidden true strengths.
///
/// The engine picks every pair; outcomes are sampled from the Elo expectation
/// between the hidden strengths. Seeded, so a given `--seed` replays exactly.
use chrono::{DateTime, Duration};
use elorank_core::elo::expected_score;
use elorank_core::{ComparisonResult, EngineConfig, Outcome, RankableItem, RankingEngine, StabilityCriteria};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use crate::bail;

/// Spread of the hidden strengths around the default rating, in rating points.
const TRUE_STRENGTH_SPREAD: f64 = 200.0;

/// 2025-01-01T00:00:00Z. A fixed start keeps runs reproducible.
const SIMULATION_EPOCH_SECS: i64 = 1_735_689_600;

/// Simulated time between consecutive comparisons.
const COMPARISON_INTERVAL_MINUTES: i64 = 1;

pub struct SimulationOptions {
    pub num_items: usize,
    pub seed: u64,
    /// Probability that any comparison ends in a tie.
    pub tie_rate: f64,
    /// Hard stop, in case the minimum comparison count is very large.
    pub max_comparisons: usize,
}

pub struct SimulationResult {
    pub engine: RankingEngine,
    pub true_strengths: HashMap<String, f64>,
    pub total_comparisons: usize,
}

/// Box-Muller for N(0,1), kept local to avoid an extra distribution crate.
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn sample_outcome(rng: &mut impl Rng, strength_a: f64, strength_b: f64, tie_rate: f64) -> Outcome {
    if rng.random::<f64>() < tie_rate {
        return Outcome::Tie;
    }
    if rng.random::<f64>() < expected_score(strength_a, strength_b) {
        Outcome::Win
    } else {
        Outcome::Loss
    }
}

/// Run a full simulation until the engine reports nothing left to compare.
pub fn run_simulation(
    options: &SimulationOptions,
    config: EngineConfig,
    criteria: &StabilityCriteria,
) -> SimulationResult {
    if options.num_items < 2 {
        bail(format!("Need at least 2 items to simulate, got {}", options.num_items));
    }
    if !(0.0..=1.0).contains(&options.tie_rate) {
        bail(format!("--tie-rate must be between 0.0 and 1.0, got {}", options.tie_rate));
    }

    let mut rng = SmallRng::seed_from_u64(options.seed);
    let width = options.num_items.to_string().len();
    let centre = config.default_initial_rating;

    let ids: Vec<String> = (1..=options.num_items)
        .map(|i| format!("item-{i:0width$}"))
        .collect();
    let true_strengths: HashMap<String, f64> = ids
        .iter()
        .map(|id| (id.clone(), centre + TRUE_STRENGTH_SPREAD * standard_normal(&mut rng)))
        .collect();

    let mut engine = RankingEngine::new(ids, config)
        .unwrap_or_else(|e| bail(format!("Invalid engine configuration: {e}")));

    let mut now = DateTime::from_timestamp(SIMULATION_EPOCH_SECS, 0).unwrap_or_default();
    let mut total_comparisons = 0;
    let report_every = (options.num_items * 2).max(10);

    while total_comparisons < options.max_comparisons {
        let next = engine
            .next_comparison(now)
            .unwrap_or_else(|e| bail(format!("Pair selection failed: {e}")));
        let Some((a, b)) = next else {
            break;
        };

        let outcome = sample_outcome(&mut rng, true_strengths[&a], true_strengths[&b], options.tie_rate);
        engine
            .record_comparison(&ComparisonResult::new(a, b, outcome, now))
            .unwrap_or_else(|e| bail(format!("Failed to record comparison: {e}")));

        total_comparisons += 1;
        now += Duration::minutes(COMPARISON_INTERVAL_MINUTES);

        if total_comparisons % report_every == 0 {
            tracing::info!(
                comparisons = total_comparisons,
                progress = engine.progress(criteria),
                remaining = engine.remaining_comparisons(),
                "simulation progress"
            );
        }
    }

    if total_comparisons >= options.max_comparisons && !engine.is_saturated() {
        tracing::warn!(
            max = options.max_comparisons,
            "stopped at --max-comparisons before saturation"
        );
    }

    SimulationResult {
        engine,
        true_strengths,
        total_comparisons,
    }
}

/// Spearman rank correlation between the engine's order and the true order.
/// `None` for fewer than two items.
pub fn rank_correlation(rankings: &[RankableItem], true_strengths: &HashMap<String, f64>) -> Option<f64> {
    let n = rankings.len();
    if n < 2 {
        return None;
    }

    let mut by_truth: Vec<&str> = rankings.iter().map(|r| r.id.as_str()).collect();
    by_truth.sort_by(|a, b| {
        true_strengths[*b]
            .partial_cmp(&true_strengths[*a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let true_rank: HashMap<&str, usize> = by_truth.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let sum_sq: f64 = rankings
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let d = i as f64 - true_rank[r.id.as_str()] as f64;
            d * d
        })
        .sum();
    let n = n as f64;
    Some(1.0 - 6.0 * sum_sq / (n * (n * n - 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(num_items: usize, seed: u64) -> SimulationOptions {
        SimulationOptions {
            num_items,
            seed,
            tie_rate: 0.05,
            max_comparisons: 10_000,
        }
    }

    #[test]
    fn test_simulation_runs_to_saturation() {
        let config = EngineConfig {
            minimum_comparisons: 6,
            ..EngineConfig::default()
        };
        let result = run_simulation(&options(8, 11), config, &StabilityCriteria::default());

        assert!(result.engine.is_saturated());
        assert!(result.engine.items().iter().all(|i| i.comparisons >= 6));
        let recorded: u32 = result.engine.items().iter().map(|i| i.comparisons).sum();
        assert_eq!(recorded as usize, result.total_comparisons * 2);
        assert_eq!(result.true_strengths.len(), 8);
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let run = |seed| {
            let result = run_simulation(&options(6, seed), EngineConfig::default(), &StabilityCriteria::default());
            result
                .engine
                .rankings()
                .into_iter()
                .map(|i| (i.id, i.current_rating))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_simulation_respects_max_comparisons() {
        let mut opts = options(5, 1);
        opts.max_comparisons = 3;
        let result = run_simulation(&opts, EngineConfig::default(), &StabilityCriteria::default());
        assert_eq!(result.total_comparisons, 3);
        assert!(!result.engine.is_saturated());
    }

    #[test]
    fn test_rank_correlation_extremes() {
        let engine = RankingEngine::new(
            vec![
                elorank_core::InitialItem::with_rating("a", 1700.0),
                elorank_core::InitialItem::with_rating("b", 1600.0),
                elorank_core::InitialItem::with_rating("c", 1500.0),
            ],
            EngineConfig::default(),
        )
        .unwrap();
        let rankings = engine.rankings();

        let same: HashMap<String, f64> =
            [("a", 3.0), ("b", 2.0), ("c", 1.0)].iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let reversed: HashMap<String, f64> =
            [("a", 1.0), ("b", 2.0), ("c", 3.0)].iter().map(|(k, v)| (k.to_string(), *v)).collect();

        assert!((rank_correlation(&rankings, &same).unwrap() - 1.0).abs() < 1e-12);
        assert!((rank_correlation(&rankings, &reversed).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(rank_correlation(&rankings[..1], &same), None);
    }
}
