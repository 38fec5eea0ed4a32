use delta_engine::compute_set_diff;
use delta_model::{Field, FieldSet};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use std::collections::HashSet;

const PK: &str = "id";

fn pk_fields() -> Vec<String> {
    vec![PK.to_string()]
}

fn record(id: i64, hash: &str) -> FieldSet {
    let mut fs = FieldSet::new(vec![Field::new(PK, id)]);
    fs.hash = Some(hash.to_string());
    fs
}

#[derive(Clone, Debug)]
struct Population {
    previous: Vec<(i64, u8)>,
    current: Vec<(i64, u8)>,
}

impl Arbitrary for Population {
    fn arbitrary(g: &mut Gen) -> Self {
        let ids: Vec<i64> = (0..8).collect();
        let previous_ids: Vec<i64> = ids.iter().filter(|_| bool::arbitrary(g)).copied().collect();
        let previous = previous_ids
            .into_iter()
            .map(|id| (id, u8::arbitrary(g) % 4))
            .collect();
        let current_ids: Vec<i64> = ids.iter().filter(|_| bool::arbitrary(g)).copied().collect();
        let current = current_ids
            .into_iter()
            .map(|id| (id, u8::arbitrary(g) % 4))
            .collect();
        Population { previous, current }
    }
}

fn to_records(pairs: &[(i64, u8)]) -> Vec<FieldSet> {
    // Hash is namespaced by id so that two different ids never collide on
    // hash value; only the `variant` distinguishes "changed" from "same".
    pairs
        .iter()
        .map(|(id, variant)| record(*id, &format!("h{id}-{variant}")))
        .collect()
}

#[quickcheck]
fn delta_partitioning_invariants(pop: Population) -> bool {
    let previous = to_records(&pop.previous);
    let current = to_records(&pop.current);
    let result = compute_set_diff(&previous, &current, &pk_fields());

    let prev_pks: HashSet<i64> = pop.previous.iter().map(|(id, _)| *id).collect();
    let cur_pks: HashSet<i64> = pop.current.iter().map(|(id, _)| *id).collect();

    let added_pks: HashSet<i64> = result
        .added
        .iter()
        .map(|r| r.pk_joined(&pk_fields()).parse().unwrap())
        .collect();
    let updated_pks: HashSet<i64> = result
        .updated
        .iter()
        .map(|r| r.pk_joined(&pk_fields()).parse().unwrap())
        .collect();
    let removed_pks: HashSet<i64> = result
        .removed
        .iter()
        .map(|r| r.pk_joined(&pk_fields()).parse().unwrap())
        .collect();

    // added ∩ updated = ∅
    if !added_pks.is_disjoint(&updated_pks) {
        return false;
    }
    // updated ⊆ previous ∩ current
    if !updated_pks.is_subset(&prev_pks.intersection(&cur_pks).cloned().collect()) {
        return false;
    }
    // removed = previous \ current (restricted to hash-bearing, always true here)
    if removed_pks != prev_pks.difference(&cur_pks).cloned().collect() {
        return false;
    }
    // added = current \ previous
    if added_pks != cur_pks.difference(&prev_pks).cloned().collect() {
        return false;
    }

    true
}
