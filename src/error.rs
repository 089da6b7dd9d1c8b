// src/error.rs
//
// Error types for the storage boundary and the store.
//
// Reads never surface these (they degrade to empty collections); writes
// propagate them so the caller can report the failure and keep its
// previously rendered state.

use thiserror::Error;

/// Failure at the raw key/value boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The persisted collection under `key` exists but does not parse.
    #[error("persisted collection '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize collection '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid contact: {0}")]
    InvalidContact(String),
    #[error("invalid group: {0}")]
    InvalidGroup(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
