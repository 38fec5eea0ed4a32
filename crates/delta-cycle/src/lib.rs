//! Cycle orchestration and repair (spec C7, C8): composes pull, map,
//! validate+fingerprint, delta, push, repair, and commit into the single
//! `run_cycle` operation.

mod adapters;
mod error;
mod orchestrator;
mod repair;

pub use adapters::{
    BatchResult, BatchStatus, Crud, Mapper, PushStatus, SingleResult, SourceAdapter, TargetAdapter,
};
pub use error::CycleError;
pub use orchestrator::{run_cycle, CycleConfig, CycleReport};
pub use repair::{repair as repair_projection, RepairOutcome};
