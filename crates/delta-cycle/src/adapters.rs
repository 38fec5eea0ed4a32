use crate::error::CycleError;
use async_trait::async_trait;
use bytes::Bytes;
use delta_engine::DeltaResult;
use delta_model::{Field, FieldSet, Schema};

/// Produces the raw payload for one cycle. Opaque to the core — the
/// Mapper is the only component that understands its shape (spec §6).
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch_raw(&self) -> Result<Bytes, CycleError>;
}

/// Converts a raw payload into a schema and the records it governs. Field
/// order within each record is the order fingerprinting will respect.
#[async_trait]
pub trait Mapper: Send + Sync {
    async fn map(&self, raw: Bytes) -> Result<(Schema, Vec<FieldSet>), CycleError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crud {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    Success,
    Failure,
}

/// The outcome of pushing one record, whether it arrived via `push_one` or
/// as one entry of a `BatchResult` (spec §6).
#[derive(Debug, Clone)]
pub struct SingleResult {
    pub status: PushStatus,
    pub primary_key: Vec<Field>,
    pub crud: Crud,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Success,
    Partial,
    Failure,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub successes: Vec<SingleResult>,
    pub failures: Vec<SingleResult>,
    pub message: Option<String>,
}

/// Accepts per-record create/update/delete operations. Implementors need
/// only provide `push_one`; the default `push_all` iterates it in the
/// `added -> updated -> removed` order spec §5 requires, so a target that
/// has no native batch API still gets a fully conformant `BatchResult`.
#[async_trait]
pub trait TargetAdapter: Send + Sync {
    async fn push_one(&self, record: &FieldSet, crud: Crud) -> Result<SingleResult, CycleError>;

    async fn push_all(&self, delta: &DeltaResult) -> Result<BatchResult, CycleError> {
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        for (group, crud) in [
            (&delta.added, Crud::Create),
            (&delta.updated, Crud::Update),
            (&delta.removed, Crud::Delete),
        ] {
            for record in group {
                let result = self.push_one(record, crud).await?;
                match result.status {
                    PushStatus::Success => successes.push(result),
                    PushStatus::Failure => failures.push(result),
                }
            }
        }

        let status = if failures.is_empty() {
            BatchStatus::Success
        } else if successes.is_empty() {
            BatchStatus::Failure
        } else {
            BatchStatus::Partial
        };

        Ok(BatchResult {
            status,
            successes,
            failures,
            message: None,
        })
    }
}
