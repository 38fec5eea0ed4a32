use crate::value::{Field, Value};
use std::collections::BTreeMap;

/// An ordered sequence of fields plus the two optional attachments the
/// pipeline threads through a cycle: validation messages and a fingerprint.
///
/// Invariant (spec §3.2): a record with non-empty `validation_messages`
/// MUST NOT carry a `hash`. The type does not enforce this by construction
/// (the validator and fingerprint stages run at different times), but
/// `FieldSet::is_well_formed` checks it for tests and debug assertions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSet {
    pub fields: Vec<Field>,
    pub validation_messages: BTreeMap<String, Vec<String>>,
    pub hash: Option<String>,
}

impl FieldSet {
    pub fn new(fields: Vec<Field>) -> Self {
        FieldSet {
            fields,
            validation_messages: BTreeMap::new(),
            hash: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn is_valid(&self) -> bool {
        self.validation_messages.is_empty()
    }

    pub fn is_well_formed(&self) -> bool {
        self.validation_messages.is_empty() || self.hash.is_none()
    }

    /// The record's primary-key tuple, in `pk_fields` order, as raw display
    /// strings. Missing fields serialize as the empty string.
    pub fn pk_values(&self, pk_fields: &[String]) -> Vec<String> {
        pk_fields
            .iter()
            .map(|name| match self.get(name) {
                Some(v) => display_value(v),
                None => String::new(),
            })
            .collect()
    }

    /// The primary-key tuple joined by `|`, used as a map key throughout
    /// the delta engine and repair logic (spec §4.4, §4.8).
    pub fn pk_joined(&self, pk_fields: &[String]) -> String {
        self.pk_values(pk_fields).join("|")
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(&serde_json::Value::from(other.clone()))
            .unwrap_or_default(),
    }
}

/// Wire representation matching spec §6: `{"fieldValues":[{name:value},...],"hash":"..."}`,
/// with empty `validationMessages` omitted entirely.
impl serde::Serialize for FieldSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(
            "fieldValues",
            &self
                .fields
                .iter()
                .map(|f| SingletonField(f))
                .collect::<Vec<_>>(),
        )?;
        if let Some(hash) = &self.hash {
            map.serialize_entry("hash", hash)?;
        }
        if !self.validation_messages.is_empty() {
            map.serialize_entry("validationMessages", &self.validation_messages)?;
        }
        map.end()
    }
}

struct SingletonField<'a>(&'a Field);

impl<'a> serde::Serialize for SingletonField<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.0.name, &self.0.value)?;
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for FieldSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Wire {
            #[serde(rename = "fieldValues", default)]
            field_values: Vec<BTreeMap<String, Value>>,
            #[serde(default)]
            hash: Option<String>,
            #[serde(rename = "validationMessages", default)]
            validation_messages: BTreeMap<String, Vec<String>>,
        }

        let wire = Wire::deserialize(deserializer)?;
        let fields = wire
            .field_values
            .into_iter()
            .flat_map(|singleton| singleton.into_iter().map(|(name, value)| Field { name, value }))
            .collect();

        Ok(FieldSet {
            fields,
            validation_messages: wire.validation_messages,
            hash: wire.hash,
        })
    }
}
