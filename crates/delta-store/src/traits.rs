use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use delta_engine::DeltaResult;
use delta_model::FieldSet;

/// One row of the engine-wide delta history (spec C9). Every successful
/// `fetchDelta` on a relational backend appends one of these.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub id: String,
    pub client_id: String,
    pub added_count: i64,
    pub updated_count: i64,
    pub removed_count: i64,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// The baseline persistence contract every backend implements (spec §4.5).
///
/// `fetchPrevious`/`updatePrevious` are the two operations common to all
/// three backend kinds; `limitTo`, when given, restricts the read to the
/// records whose primary-key fields match one of the supplied projections
/// (filesystem and object-bucket backends apply this filter in memory
/// after a full read, since they have no query layer to push it into).
#[async_trait]
pub trait BaselineStore: Send + Sync {
    /// Prepares the store for a given client and primary-key shape. Cheap
    /// and idempotent for filesystem/object-bucket backends; for the
    /// relational backend this creates the per-client tables and rejects
    /// an empty `pk_fields` (spec §9 open question (a)).
    async fn initialize(&self, client_id: &str, pk_fields: &[String]) -> Result<(), StoreError>;

    async fn fetch_previous(
        &self,
        client_id: &str,
        pk_fields: &[String],
        limit_to: Option<&[FieldSet]>,
    ) -> Result<Vec<FieldSet>, StoreError>;

    /// Replaces the persisted baseline with `data`. `failure_count` is the
    /// number of records this cycle failed to push or validate; a nonzero
    /// count means `data` already reflects the repaired (reverted)
    /// projection rather than the freshly fetched population.
    async fn update_previous(
        &self,
        client_id: &str,
        data: Vec<FieldSet>,
        pk_fields: &[String],
        failure_count: usize,
    ) -> Result<usize, StoreError>;
}

/// Extra capability only the relational backend has: a server-side
/// current/previous join, so the delta itself never needs the full
/// population held in memory (spec §4.5 RelationalDiff path).
#[async_trait]
pub trait RelationalBaselineStore: BaselineStore {
    async fn store_current(
        &self,
        client_id: &str,
        data: Vec<FieldSet>,
        pk_fields: &[String],
    ) -> Result<usize, StoreError>;

    async fn fetch_delta(
        &self,
        client_id: &str,
        pk_fields: &[String],
    ) -> Result<DeltaResult, StoreError>;

    async fn get_history(
        &self,
        client_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryRow>, StoreError>;
}
