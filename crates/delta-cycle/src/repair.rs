use crate::adapters::BatchResult;
use delta_model::{Field, FieldSet};
use std::collections::{HashMap, HashSet};

pub struct RepairOutcome {
    pub current: Vec<FieldSet>,
    pub restored: usize,
}

/// A record's pk tuple joined the same way `FieldSet::pk_joined` does,
/// computed directly from a push result's `primary_key` field list rather
/// than via a separate `pk_fields` slice — the two are equivalent as long
/// as the target adapter reports primary-key fields in the record's own
/// pk order, which every adapter in this codebase does.
fn pk_key(primary_key: &[Field]) -> String {
    let names: Vec<String> = primary_key.iter().map(|f| f.name.clone()).collect();
    FieldSet::new(primary_key.to_vec()).pk_joined(&names)
}

/// Spec §4.8: reverts fingerprints for records that failed to push or
/// failed validation so they are re-detected as changed next cycle, and
/// drops failed-new records so nothing unsynchronized is ever committed.
pub fn repair(
    mut current: Vec<FieldSet>,
    previous: &[FieldSet],
    push: &BatchResult,
    pk_fields: &[String],
) -> RepairOutcome {
    let prev_by_pk: HashMap<String, &FieldSet> =
        previous.iter().map(|r| (r.pk_joined(pk_fields), r)).collect();

    let mut restored = 0usize;
    let mut dropped: HashSet<String> = HashSet::new();

    for failure in &push.failures {
        let pk = pk_key(&failure.primary_key);
        restored += 1;
        match prev_by_pk.get(&pk) {
            Some(prev) => {
                if let Some(rec) = current.iter_mut().find(|r| r.pk_joined(pk_fields) == pk) {
                    rec.hash = prev.hash.clone();
                }
            }
            None => {
                dropped.insert(pk);
            }
        }
    }
    if !dropped.is_empty() {
        current.retain(|r| !dropped.contains(&r.pk_joined(pk_fields)));
    }

    let mut invalid_dropped: HashSet<String> = HashSet::new();
    for rec in current.iter_mut() {
        if rec.hash.is_some() || rec.validation_messages.is_empty() {
            continue;
        }
        let pk = rec.pk_joined(pk_fields);
        restored += 1;
        match prev_by_pk.get(&pk) {
            Some(prev) => rec.hash = prev.hash.clone(),
            None => {
                invalid_dropped.insert(pk);
            }
        }
    }
    if !invalid_dropped.is_empty() {
        current.retain(|r| !invalid_dropped.contains(&r.pk_joined(pk_fields)));
    }

    RepairOutcome { current, restored }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Crud, PushStatus, SingleResult};
    use delta_model::Value;

    fn kv(id: i64, hash: &str) -> FieldSet {
        let mut r = FieldSet::new(vec![Field::new("id", Value::from(id))]);
        r.hash = Some(hash.to_string());
        r
    }

    fn failure(id: i64) -> SingleResult {
        SingleResult {
            status: PushStatus::Failure,
            primary_key: vec![Field::new("id", Value::from(id))],
            crud: Crud::Update,
            message: Some("rejected".to_string()),
        }
    }

    #[test]
    fn s4_partial_failure_on_update_reverts_the_failed_record() {
        let previous = vec![kv(1, "ha"), kv(2, "hb")];
        let current = vec![kv(1, "ha-prime"), kv(2, "hb-prime")];
        let push = BatchResult {
            status: crate::adapters::BatchStatus::Partial,
            successes: vec![],
            failures: vec![failure(1)],
            message: None,
        };
        let outcome = repair(current, &previous, &push, &["id".to_string()]);
        assert_eq!(outcome.restored, 1);
        let one = outcome.current.iter().find(|r| r.get("id").unwrap() == &Value::from(1i64)).unwrap();
        assert_eq!(one.hash.as_deref(), Some("ha"));
        let two = outcome.current.iter().find(|r| r.get("id").unwrap() == &Value::from(2i64)).unwrap();
        assert_eq!(two.hash.as_deref(), Some("hb-prime"));
    }

    #[test]
    fn s5_failed_new_is_dropped() {
        let previous: Vec<FieldSet> = vec![];
        let current = vec![kv(1, "hx"), kv(2, "hy")];
        let push = BatchResult {
            status: crate::adapters::BatchStatus::Partial,
            successes: vec![],
            failures: vec![failure(1)],
            message: None,
        };
        let outcome = repair(current, &previous, &push, &["id".to_string()]);
        assert_eq!(outcome.restored, 1);
        assert_eq!(outcome.current.len(), 1);
        assert_eq!(outcome.current[0].get("id").unwrap(), &Value::from(2i64));
    }

    #[test]
    fn s6_invalid_row_reverts_to_prior_hash_or_is_dropped() {
        let previous = vec![kv(5, "hz")];
        let mut invalid = FieldSet::new(vec![Field::new("id", Value::from(5i64))]);
        invalid.validation_messages.insert("email".to_string(), vec!["bad".to_string()]);
        let current = vec![invalid];
        let push = BatchResult {
            status: crate::adapters::BatchStatus::Success,
            successes: vec![],
            failures: vec![],
            message: None,
        };
        let outcome = repair(current, &previous, &push, &["id".to_string()]);
        assert_eq!(outcome.restored, 1);
        assert_eq!(outcome.current[0].hash.as_deref(), Some("hz"));
    }

    #[test]
    fn invalid_new_row_with_no_prior_baseline_is_dropped() {
        let previous: Vec<FieldSet> = vec![];
        let mut invalid = FieldSet::new(vec![Field::new("id", Value::from(9i64))]);
        invalid.validation_messages.insert("email".to_string(), vec!["bad".to_string()]);
        let current = vec![invalid];
        let push = BatchResult {
            status: crate::adapters::BatchStatus::Success,
            successes: vec![],
            failures: vec![],
            message: None,
        };
        let outcome = repair(current, &previous, &push, &["id".to_string()]);
        assert!(outcome.current.is_empty());
    }

    #[test]
    fn repair_is_idempotent_on_the_resulting_projection() {
        let previous = vec![kv(1, "ha")];
        let current = vec![kv(1, "ha-prime")];
        let push = BatchResult {
            status: crate::adapters::BatchStatus::Partial,
            successes: vec![],
            failures: vec![failure(1)],
            message: None,
        };
        let first = repair(current, &previous, &push, &["id".to_string()]);
        let second = repair(first.current.clone(), &previous, &push, &["id".to_string()]);
        assert_eq!(first.current, second.current);
    }
}
