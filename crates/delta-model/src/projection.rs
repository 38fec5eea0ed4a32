use crate::record::FieldSet;
use crate::value::Field;

/// Reduces a record onto its primary-key fields, preserving the order in
/// which they occur in `record` (not the order of `pk_fields`), and
/// carrying `hash` and `validation_messages` through unchanged
/// (spec §4.3). Used everywhere below the Delta Engine.
pub fn reduce(record: &FieldSet, pk_fields: &[String]) -> FieldSet {
    let fields: Vec<Field> = record
        .fields
        .iter()
        .filter(|f| pk_fields.iter().any(|pk| pk == &f.name))
        .cloned()
        .collect();

    FieldSet {
        fields,
        validation_messages: record.validation_messages.clone(),
        hash: record.hash.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn preserves_encounter_order_not_pk_order() {
        let record = FieldSet::new(vec![
            Field::new("b", Value::from(2i64)),
            Field::new("a", Value::from(1i64)),
            Field::new("extra", Value::from("drop me")),
        ]);
        let pk = vec!["a".to_string(), "b".to_string()];
        let reduced = reduce(&record, &pk);
        let names: Vec<&str> = reduced.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn carries_hash_and_messages_through() {
        let mut record = FieldSet::new(vec![Field::new("a", Value::from(1i64))]);
        record.hash = Some("deadbeef".to_string());
        let reduced = reduce(&record, &["a".to_string()]);
        assert_eq!(reduced.hash.as_deref(), Some("deadbeef"));
    }
}
