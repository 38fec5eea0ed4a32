use crate::record::FieldSet;
use crate::value::Value;
use regex::Regex;
use std::sync::Arc;

/// Semantic type of a field, independent of its `Value` representation
/// (spec §3). `Object`/`Array` skip the primitive type check during
/// validation since their shape is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Email,
    Url,
    SingleChoice,
    MultiChoice,
    Object,
    Array,
}

/// A predicate restriction with access to the entire row, e.g. "field A
/// must be greater than field B". Boxed because schemas are typically
/// constructed once and shared across many records.
pub type CustomPredicate = Arc<dyn Fn(&Value, &FieldSet) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub enum Restriction {
    MinLength(usize),
    MaxLength(usize),
    MinValue(f64),
    MaxValue(f64),
    Pattern(Regex),
    /// Choice-option set membership. `case_sensitive = false` lowercases
    /// both the candidate value and the options before comparing.
    Choices {
        options: Vec<String>,
        case_sensitive: bool,
    },
    Custom(CustomPredicate),
}

impl std::fmt::Debug for Restriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Restriction::MinLength(n) => write!(f, "MinLength({n})"),
            Restriction::MaxLength(n) => write!(f, "MaxLength({n})"),
            Restriction::MinValue(n) => write!(f, "MinValue({n})"),
            Restriction::MaxValue(n) => write!(f, "MaxValue({n})"),
            Restriction::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Restriction::Choices {
                options,
                case_sensitive,
            } => write!(f, "Choices({options:?}, case_sensitive={case_sensitive})"),
            Restriction::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// One entry of a `Schema` (spec §3). Field order within the schema is the
/// order the Validator walks fields in; it has no bearing on fingerprinting.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    pub primary_key: bool,
    pub restrictions: Vec<Restriction>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDefinition {
            name: name.into(),
            field_type,
            required: false,
            default: None,
            primary_key: false,
            restrictions: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn restrict(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }
}

/// An ordered sequence of field definitions (spec §3). The primary key may
/// be empty or composite; §9 open question (a) has this implementation
/// reject an empty primary key at relational-store initialization time.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub fields: Vec<FieldDefinition>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        Schema { fields }
    }

    /// The ordered tuple of field names flagged `primary_key`.
    pub fn pk_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.primary_key)
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}
