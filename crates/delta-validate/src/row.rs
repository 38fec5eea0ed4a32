use crate::field::validate_field;
use delta_model::{Field, FieldSet, Schema};

/// Runs the field validators over `schema`, writing a messages-by-field-name
/// map onto `record` (spec §4.2). Missing fields with a schema default have
/// that default applied before validation runs. Returns whether the row is
/// valid (its messages map is empty) for caller convenience.
pub fn validate_row(schema: &Schema, record: &mut FieldSet) -> bool {
    apply_defaults(schema, record);

    let snapshot = record.clone();
    let mut messages = std::collections::BTreeMap::new();

    for def in &schema.fields {
        let errors = validate_field(def, snapshot.get(&def.name), &snapshot);
        if !errors.is_empty() {
            messages.insert(def.name.clone(), errors);
        }
    }

    record.validation_messages = messages;
    record.is_valid()
}

fn apply_defaults(schema: &Schema, record: &mut FieldSet) {
    for def in &schema.fields {
        let present = record.fields.iter().any(|f| f.name == def.name);
        if !present {
            if let Some(default) = &def.default {
                record.fields.push(Field::new(def.name.clone(), default.clone()));
            }
        }
    }
}
