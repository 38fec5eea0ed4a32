//! Canonical record, schema and fingerprint model (spec components C1, C3).
//!
//! This crate has no knowledge of validation, delta computation, or
//! persistence; it defines the shapes those components operate on.

mod fingerprint;
mod projection;
mod record;
mod schema;
mod value;

pub use fingerprint::{fingerprint, FingerprintError, FingerprintOptions, MAX_DEPTH};
pub use projection::reduce;
pub use record::FieldSet;
pub use schema::{CustomPredicate, FieldDefinition, FieldType, Restriction, Schema};
pub use value::{Field, Value};
