use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("renter record not found: {0}")]
    NotFound(PathBuf),

    #[error("malformed renter record {path}: {source}")]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize renter record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// True when the record could not be read back into a usable state.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MalformedRecord { .. })
    }
}
