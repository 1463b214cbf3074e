/// Input parsing: item lists and JSONL comparison logs.
use chrono::{DateTime, Utc};
use elorank_core::{ComparisonResult, InitialItem, Outcome};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One entry of a JSON item list: a bare id or an id with a starting rating.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemEntry {
    Id(String),
    Full(InitialItem),
}

/// Parse a string as either a JSON array (of ids or `{"id", "initial_rating"}`
/// objects) or plain text, one id per line.
pub fn parse_items_from_str(content: &str) -> Result<Vec<InitialItem>, String> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        let entries: Vec<ItemEntry> = serde_json::from_str(trimmed)
            .map_err(|e| format!("File looks like JSON but failed to parse: {e}"))?;
        Ok(entries
            .into_iter()
            .map(|entry| match entry {
                ItemEntry::Id(id) => InitialItem::new(id.trim()),
                ItemEntry::Full(item) => item,
            })
            .filter(|item| !item.id.trim().is_empty())
            .collect())
    } else {
        Ok(trimmed
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(InitialItem::new)
            .collect())
    }
}

/// One line of a comparison log.
#[derive(Deserialize)]
struct LogEntry {
    item1: String,
    item2: String,
    outcome: Outcome,
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    metadata: Option<BTreeMap<String, String>>,
}

/// Parse a JSONL comparison log. Blank lines are skipped. Entries without a
/// timestamp are stamped with `fallback_time`.
///
/// Returns the parsed results plus `(line_number, error)` for every line that
/// failed to parse.
pub fn parse_comparison_log(
    content: &str,
    fallback_time: DateTime<Utc>,
) -> (Vec<ComparisonResult>, Vec<(usize, String)>) {
    let mut results = Vec::new();
    let mut failures = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => {
                let mut result = ComparisonResult::new(
                    entry.item1,
                    entry.item2,
                    entry.outcome,
                    entry.timestamp.unwrap_or(fallback_time),
                );
                result.metadata = entry.metadata;
                results.push(result);
            }
            Err(e) => failures.push((idx + 1, e.to_string())),
        }
    }

    (results, failures)
}
