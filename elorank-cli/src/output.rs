/// Output formatting: terminal table and JSON.
use elorank_core::{Pair, RankableItem};
use serde::Serialize;

/// Run-level summary printed below the rankings.
pub struct Summary<'a> {
    pub total_comparisons: usize,
    pub progress: f64,
    pub stable: &'a [String],
    pub next: Option<&'a Pair>,
    pub remaining: usize,
}

#[derive(Serialize)]
struct JsonRankedItem<'a> {
    rank: usize,
    id: &'a str,
    rating: f64,
    initial_rating: f64,
    comparisons: u32,
    wins: u32,
    losses: u32,
    ties: u32,
    stable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    true_strength: Option<f64>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    items: Vec<JsonRankedItem<'a>>,
    total_comparisons: usize,
    progress: f64,
    next_comparison: Option<&'a Pair>,
    remaining_comparisons: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    rank_correlation: Option<f64>,
}

/// Print results as a formatted terminal table.
///
/// `true_strength`, when given, adds a column with the hidden strength of each
/// item (simulation runs only).
pub fn print_table(
    rankings: &[RankableItem],
    summary: &Summary,
    true_strength: Option<&dyn Fn(&str) -> f64>,
) {
    let id_width = rankings
        .iter()
        .map(|r| r.id.len())
        .max()
        .unwrap_or(4)
        .max(4); // at least "Item"

    let truth_header = if true_strength.is_some() { " |    True" } else { "" };
    let truth_rule = if true_strength.is_some() { "-|--------" } else { "" };
    println!(" # | {:<id_width$} |  Rating |   W |   L |   T | Stable{truth_header}", "Item");
    println!("---|-{}-|---------|-----|-----|-----|-------{truth_rule}", "-".repeat(id_width));

    for (i, r) in rankings.iter().enumerate() {
        let stable = if summary.stable.contains(&r.id) { "yes" } else { "" };
        let truth = true_strength
            .map(|f| format!(" | {:>7.1}", f(r.id.as_str())))
            .unwrap_or_default();
        println!(
            "{:>2} | {:<id_width$} | {:>7.1} | {:>3} | {:>3} | {:>3} | {:<6}{truth}",
            i + 1,
            r.id,
            r.current_rating,
            r.wins,
            r.losses,
            r.ties,
            stable,
        );
    }

    println!(
        "\n{} items, {} comparisons, {:.0}% stable",
        rankings.len(),
        summary.total_comparisons,
        summary.progress * 100.0,
    );
    match summary.next {
        Some((a, b)) => println!(
            "Next comparison: {a} vs {b} (at least {} more needed)",
            summary.remaining
        ),
        None => println!("Next comparison: none (minimum comparisons reached)"),
    }
}

/// Print results as JSON.
pub fn print_json(
    rankings: &[RankableItem],
    summary: &Summary,
    true_strength: Option<&dyn Fn(&str) -> f64>,
    rank_correlation: Option<f64>,
) {
    println!("{}", render_json(rankings, summary, true_strength, rank_correlation));
}

fn render_json(
    rankings: &[RankableItem],
    summary: &Summary,
    true_strength: Option<&dyn Fn(&str) -> f64>,
    rank_correlation: Option<f64>,
) -> String {
    let items: Vec<JsonRankedItem> = rankings
        .iter()
        .enumerate()
        .map(|(i, r)| JsonRankedItem {
            rank: i + 1,
            id: &r.id,
            rating: r.current_rating,
            initial_rating: r.initial_rating,
            comparisons: r.comparisons,
            wins: r.wins,
            losses: r.losses,
            ties: r.ties,
            stable: summary.stable.contains(&r.id),
            true_strength: true_strength.map(|f| f(r.id.as_str())),
        })
        .collect();

    let output = JsonOutput {
        items,
        total_comparisons: summary.total_comparisons,
        progress: summary.progress,
        next_comparison: summary.next,
        remaining_comparisons: summary.remaining,
        rank_correlation,
    };

    serde_json::to_string_pretty(&output).unwrap_or_else(|e| crate::bail(format!("Failed to serialize output: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use elorank_core::{EngineConfig, RankingEngine};

    #[test]
    fn test_render_json_shape() {
        let engine = RankingEngine::new(["a", "b"], EngineConfig::default()).unwrap();
        let rankings = engine.rankings();
        let stable = vec!["b".to_string()];
        let next = ("a".to_string(), "b".to_string());
        let summary = Summary {
            total_comparisons: 0,
            progress: 0.5,
            stable: &stable,
            next: Some(&next),
            remaining: 10,
        };

        let json = render_json(&rankings, &summary, None, None);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["items"][0]["id"], "a");
        assert_eq!(value["items"][0]["stable"], false);
        assert_eq!(value["items"][1]["stable"], true);
        assert_eq!(value["next_comparison"][1], "b");
        assert!(value["items"][0].get("true_strength").is_none());
        assert!(value.get("rank_correlation").is_none());
    }
}
