//! Baseline persistence (spec C5, C9): three backends behind one
//! `BaselineStore` trait, plus the relational backend's extra
//! `RelationalBaselineStore` capability for server-side diffing and
//! delta history.

mod config;
mod error;
mod object_backend;
mod relational;
mod traits;

pub use config::{BaselineStoreConfig, RelationalConfig, RelationalKind};
pub use error::StoreError;
pub use object_backend::{bucket, filesystem, NdjsonStore};
pub use relational::{connect as connect_relational, RelationalStore};
pub use traits::{BaselineStore, HistoryRow, RelationalBaselineStore};

use std::sync::Arc;

/// Constructs the configured backend. The relational variant returns both
/// the `BaselineStore` and `RelationalBaselineStore` views of the same
/// store, since callers need the latter for `fetchDelta`/`getHistory` but
/// the former is what the cycle orchestrator is generic over.
pub enum AnyBaselineStore {
    Filesystem(Arc<NdjsonStore<object_store::local::LocalFileSystem>>),
    ObjectBucket(Arc<NdjsonStore<object_store::aws::AmazonS3>>),
    Relational(Arc<RelationalStore>),
}

impl AnyBaselineStore {
    pub async fn connect(config: &BaselineStoreConfig) -> Result<Self, StoreError> {
        match config {
            BaselineStoreConfig::Filesystem { root } => {
                Ok(AnyBaselineStore::Filesystem(Arc::new(filesystem(root)?)))
            }
            BaselineStoreConfig::ObjectBucket {
                bucket_name,
                key_prefix,
                region,
            } => Ok(AnyBaselineStore::ObjectBucket(Arc::new(bucket::object_bucket(
                bucket_name,
                key_prefix.clone(),
                region.as_deref(),
            )?))),
            BaselineStoreConfig::Relational(relational_config) => {
                let pool = connect_relational(relational_config).await?;
                Ok(AnyBaselineStore::Relational(Arc::new(RelationalStore::new(pool))))
            }
        }
    }

    pub fn as_baseline_store(&self) -> Arc<dyn BaselineStore> {
        match self {
            AnyBaselineStore::Filesystem(s) => s.clone(),
            AnyBaselineStore::ObjectBucket(s) => s.clone(),
            AnyBaselineStore::Relational(s) => s.clone(),
        }
    }

    pub fn as_relational(&self) -> Option<Arc<RelationalStore>> {
        match self {
            AnyBaselineStore::Relational(s) => Some(s.clone()),
            _ => None,
        }
    }
}
