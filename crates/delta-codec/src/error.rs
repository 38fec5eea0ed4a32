#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error reading or writing the record stream")]
    Io(#[from] std::io::Error),

    /// Spec §4.6: a malformed line fails the whole read; the message names
    /// the offending line's prefix rather than dumping the whole line.
    #[error("malformed record at line starting with {prefix:?}")]
    Parse {
        prefix: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("writer was closed before all records were flushed")]
    Closed,

    #[error("failed to serialize record")]
    Serialize(#[from] serde_json::Error),
}
