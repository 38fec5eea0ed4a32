/// Errors surfaced by a cycle (spec §7). Fatal phases (pull, map, delta
/// computation, pre-push store I/O) propagate their cause as-is; push
/// failures are modeled as data (`BatchResult.failures`), never as this
/// error type.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("source adapter failed to produce a payload")]
    Source(#[source] anyhow::Error),

    #[error("mapper failed to produce records")]
    Mapper(#[source] anyhow::Error),

    #[error("target adapter failed")]
    Target(#[source] anyhow::Error),

    #[error(transparent)]
    Store(#[from] delta_store::StoreError),

    #[error(transparent)]
    Fingerprint(#[from] delta_model::FingerprintError),

    #[error("cycle configuration error: {0}")]
    Config(String),

    #[error("cycle cancelled")]
    Cancelled,
}
