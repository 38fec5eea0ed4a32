use crate::result::DeltaResult;
use delta_model::FieldSet;
use std::collections::{HashMap, HashSet, VecDeque};

/// In-memory set-based delta computation (spec §4.4 "SetDiff strategy"),
/// recommended up to roughly 200,000 records per side.
pub fn compute(previous: &[FieldSet], current: &[FieldSet], pk_fields: &[String]) -> DeltaResult {
    let previous_hashes: HashSet<&str> = previous.iter().filter_map(|r| r.hash.as_deref()).collect();
    let current_hashes: HashSet<&str> = current.iter().filter_map(|r| r.hash.as_deref()).collect();

    let added_or_updated: Vec<FieldSet> = current
        .iter()
        .filter(|r| match &r.hash {
            Some(h) => !previous_hashes.contains(h.as_str()),
            None => false,
        })
        .cloned()
        .collect();

    let removed_or_updated: Vec<FieldSet> = previous
        .iter()
        .filter(|r| match &r.hash {
            Some(h) => !current_hashes.contains(h.as_str()),
            None => false,
        })
        .cloned()
        .collect();

    if pk_fields.is_empty() {
        // Spec §4.4 step 6: no way to pair added/removed without a key.
        return DeltaResult {
            added: added_or_updated,
            updated: Vec::new(),
            removed: removed_or_updated,
        };
    }

    // Index removed_or_updated by pk so each `a` finds its *first* unmatched
    // candidate in original order, and is removed from future matches.
    let mut by_pk: HashMap<String, VecDeque<usize>> = HashMap::new();
    for (idx, r) in removed_or_updated.iter().enumerate() {
        by_pk.entry(r.pk_joined(pk_fields)).or_default().push_back(idx);
    }

    let mut consumed = vec![false; removed_or_updated.len()];
    let mut added = Vec::new();
    let mut updated = Vec::new();

    for a in added_or_updated {
        let pk = a.pk_joined(pk_fields);
        let matched_idx = by_pk.get_mut(&pk).and_then(|queue| queue.pop_front());
        match matched_idx {
            Some(idx) => {
                consumed[idx] = true;
                updated.push(a);
            }
            None => added.push(a),
        }
    }

    let removed: Vec<FieldSet> = removed_or_updated
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !consumed[*idx])
        .map(|(_, r)| r)
        .collect();

    DeltaResult {
        added,
        updated,
        removed,
    }
}
