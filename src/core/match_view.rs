use crate::models::{ContentId, EnabledRatio, MatchResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Shown next to a match from a bank that is not fully enabled
pub const PARTIAL_ROLLOUT_WARNING: &str = "This bank is only partially enabled, and may not count \
     as matching in production based on coinflip. Enable the bank at 100% to ensure it matches \
     consistently.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    pub bank_name: String,
    pub content_id: ContentId,
    pub signal_type: String,
    pub distance: String,
    pub enabled_ratio: String,
    pub partially_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashRow {
    pub signal_type: String,
    pub value: String,
}

/// Everything the operator sees after a match lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchView {
    pub matches: Vec<MatchRow>,
    pub hashes: Vec<HashRow>,
    pub matched_banks: Vec<String>,
}

/// Bank names to look up, first occurrence order, duplicates removed
pub fn distinct_banks(result: &MatchResult) -> Vec<String> {
    let mut seen = HashSet::new();
    result
        .banks
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Build the match view from a lookup result and the resolved bank ratios
///
/// Rows keep the order of `result.matches`. A bank missing from `ratios`
/// renders as `Unknown`.
pub fn build_match_view(
    result: &MatchResult,
    ratios: &BTreeMap<String, EnabledRatio>,
) -> MatchView {
    let matches = result
        .matches
        .iter()
        .map(|entry| {
            let ratio = ratios
                .get(&entry.bank_name)
                .copied()
                .unwrap_or(EnabledRatio::Unknown);
            let partially_enabled = ratio.is_partial();

            MatchRow {
                bank_name: entry.bank_name.clone(),
                content_id: entry.content_id.clone(),
                signal_type: entry.signal_type.clone(),
                distance: entry.distance.clone(),
                enabled_ratio: ratio.percent_text(),
                partially_enabled,
                warning: partially_enabled.then_some(PARTIAL_ROLLOUT_WARNING),
            }
        })
        .collect();

    let hashes = result
        .hashes
        .iter()
        .map(|(signal_type, value)| HashRow {
            signal_type: signal_type.clone(),
            value: value.clone(),
        })
        .collect();

    MatchView {
        matches,
        hashes,
        matched_banks: distinct_banks(result),
    }
}
