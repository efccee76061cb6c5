use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite open/read/write failure — the storage-unavailable class.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    #[error("store mutex poisoned")]
    Poisoned,

    /// A stored JSON blob failed to (de)serialize.
    #[error("malformed state under '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
