use crate::models::{HashComparison, SignalMap};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub fn part_name(&self) -> &'static str {
        match self {
            Slot::Left => "left",
            Slot::Right => "right",
        }
    }
}

/// Two-slot buffer for the hashes of the photos being compared
///
/// Hashing finishes in any order. [`ComparePair::fill`] hands back both
/// maps once the second slot lands and empties the buffer again.
#[derive(Debug, Clone, Default)]
pub struct ComparePair {
    left: Option<SignalMap>,
    right: Option<SignalMap>,
}

impl ComparePair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(&mut self, slot: Slot, hashes: SignalMap) -> Option<(SignalMap, SignalMap)> {
        match slot {
            Slot::Left => self.left = Some(hashes),
            Slot::Right => self.right = Some(hashes),
        }
        self.on_both_present()
    }

    fn on_both_present(&mut self) -> Option<(SignalMap, SignalMap)> {
        if self.left.is_some() && self.right.is_some() {
            self.left.take().zip(self.right.take())
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// `/m/compare` body: `{signal_type: [left, right]}` for types hashed on both sides
pub fn compare_request(left: &SignalMap, right: &SignalMap) -> BTreeMap<String, [String; 2]> {
    left.iter()
        .filter_map(|(signal_type, left_value)| {
            right
                .get(signal_type)
                .map(|right_value| (signal_type.clone(), [left_value.clone(), right_value.clone()]))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRow {
    pub signal_type: String,
    pub left: String,
    pub right: String,
    pub matched: bool,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareView {
    pub left: SignalMap,
    pub right: SignalMap,
    pub rows: Vec<CompareRow>,
}

pub fn build_compare_view(
    left: SignalMap,
    right: SignalMap,
    results: &BTreeMap<String, HashComparison>,
) -> CompareView {
    let rows = results
        .iter()
        .map(|(signal_type, (matched, detail))| CompareRow {
            signal_type: signal_type.clone(),
            left: left.get(signal_type).cloned().unwrap_or_default(),
            right: right.get(signal_type).cloned().unwrap_or_default(),
            matched: *matched,
            distance: detail.distance.clone(),
        })
        .collect();
    CompareView { left, right, rows }
}
