/// Replay command: feeds a parsed comparison log into the engine.
use elorank_core::{ComparisonResult, RankingEngine, RankingError};

/// Counts from one replay pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub rejected: usize,
    pub unparseable: usize,
}

/// Apply `results` in order.
///
/// Lines that failed to parse and comparisons naming an unknown item or the
/// same item twice are skipped with a warning, or turned into an error when
/// `strict` is set. Any other engine error is always returned.
pub fn replay_log(
    engine: &mut RankingEngine,
    results: &[ComparisonResult],
    parse_failures: &[(usize, String)],
    strict: bool,
) -> Result<ReplayStats, String> {
    for (line, error) in parse_failures {
        if strict {
            return Err(format!("Comparison log line {line}: {error}"));
        }
        tracing::warn!(line, %error, "skipping unparseable comparison");
    }

    let mut stats = ReplayStats {
        unparseable: parse_failures.len(),
        ..ReplayStats::default()
    };
    for result in results {
        match engine.record_comparison(result) {
            Ok(_) => stats.applied += 1,
            Err(e @ (RankingError::ItemNotFound { .. } | RankingError::SelfComparison { .. })) => {
                if strict {
                    return Err(format!(
                        "Rejected comparison {} vs {}: {e}",
                        result.item_id1, result.item_id2
                    ));
                }
                stats.rejected += 1;
                tracing::warn!(item1 = %result.item_id1, item2 = %result.item_id2, error = %e, "skipping comparison");
            }
            Err(e) => return Err(e.to_string()),
        }
    }

    tracing::info!(
        applied = stats.applied,
        rejected = stats.rejected,
        unparseable = stats.unparseable,
        "replayed comparison log"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use elorank_core::{EngineConfig, Outcome};

    fn log() -> Vec<ComparisonResult> {
        let ts = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();
        vec![
            ComparisonResult::new("a", "b", Outcome::Win, ts),
            ComparisonResult::new("a", "ghost", Outcome::Win, ts),
            ComparisonResult::new("b", "b", Outcome::Tie, ts),
            ComparisonResult::new("b", "a", Outcome::Loss, ts),
        ]
    }

    fn engine() -> RankingEngine {
        RankingEngine::new(["a", "b"], EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_lenient_replay_skips_rejected() {
        let mut engine = engine();
        let failures = vec![(3, "expected value".to_string())];
        let stats = replay_log(&mut engine, &log(), &failures, false).unwrap();

        assert_eq!(
            stats,
            ReplayStats {
                applied: 2,
                rejected: 2,
                unparseable: 1
            }
        );
        assert_eq!(engine.item("a").unwrap().wins, 2);
        assert_eq!(engine.item("b").unwrap().comparisons, 2);
    }

    #[test]
    fn test_strict_replay_stops_at_rejected_comparison() {
        let mut engine = engine();
        let err = replay_log(&mut engine, &log(), &[], true).unwrap_err();

        assert!(err.contains("a vs ghost"));
        assert!(err.contains("Item not found: ghost"));
        // Only the comparison before the rejected one was applied.
        assert_eq!(engine.item("a").unwrap().comparisons, 1);
    }

    #[test]
    fn test_strict_replay_fails_on_unparseable_line() {
        let mut engine = engine();
        let failures = vec![(7, "missing field `outcome`".to_string())];
        let err = replay_log(&mut engine, &log(), &failures, true).unwrap_err();

        assert!(err.starts_with("Comparison log line 7"));
        assert_eq!(engine.item("a").unwrap().comparisons, 0);
    }
}
