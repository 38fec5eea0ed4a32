/// Errors surfaced by every `BaselineStore` backend (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store was asked to read or write a client baseline before
    /// `initialize` established it (relational backends only; filesystem
    /// and object-bucket backends initialize lazily and rarely hit this).
    #[error("baseline store not initialized for client {client_id:?}")]
    NotInitialized { client_id: String },

    /// A configuration the backend cannot act on, e.g. an empty `pkFields`
    /// passed to a relational backend's `initialize`.
    #[error("invalid baseline store configuration: {0}")]
    Config(String),

    #[error("I/O error in baseline store")]
    Io(#[from] std::io::Error),

    #[error("object store error")]
    ObjectStore(#[from] object_store::Error),

    #[error("baseline record codec error")]
    Codec(#[from] delta_codec::CodecError),

    #[error("record fingerprint error")]
    Fingerprint(#[from] delta_model::FingerprintError),

    #[error("baseline database error")]
    Database(#[from] sqlx::Error),

    #[error("baseline history metadata serialization error")]
    Serde(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,
}
