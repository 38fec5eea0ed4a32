//! Delta computation strategies (spec C4): SetDiff (in-memory) and
//! RelationalDiff (SQL, query text only — `delta-store` executes it).

pub mod relational;
mod result;
mod set_diff;

pub use result::DeltaResult;
pub use set_diff::compute as compute_set_diff;
