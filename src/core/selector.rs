//! Main category selection
//!
//! Picks the label that best represents a group of exploded classification
//! results, pairing the fallback label with the next-best signal when the
//! fallback dominates.

use std::collections::HashMap;

use crate::core::categories::CategoryDictionary;

/// Pick the dominant category of a group of labels
///
/// Labels are ranked by descending count; equal counts follow the dictionary
/// declaration order (the fallback after every declared category, unknown
/// labels last in first-seen order).
///
/// # Arguments
///
/// * `labels` - Exploded labels of every review in the group
/// * `dictionary` - Dictionary providing tie-break order and the fallback
///
/// # Returns
///
/// The top label, `"<fallback>, <second>"` when the fallback is on top and
/// another label exists, or the fallback for an empty group.
pub fn main_category<S: AsRef<str>>(labels: &[S], dictionary: &CategoryDictionary) -> String {
    let fallback = dictionary.fallback();

    // label -> (count, first seen)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, label) in labels.iter().enumerate() {
        let entry = counts.entry(label.as_ref()).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(label, (count, first_seen))| (label, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| dictionary.rank(a.0).cmp(&dictionary.rank(b.0)))
            .then_with(|| a.2.cmp(&b.2))
    });

    match ranked.as_slice() {
        [] => fallback.to_string(),
        [(top, ..), (second, ..), ..] if *top == fallback => format!("{}, {}", fallback, second),
        [(top, ..), ..] => top.to_string(),
    }
}
