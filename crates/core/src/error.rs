//! Unified error types for stash.
//!
//! A missing entry is never an error at the store level; `CacheMiss` only
//! exists for callers that require an entry to be present.

use std::path::PathBuf;

/// Unified error types for the stash cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Identifier, namespace or key string is not usable as a cache key.
    #[error("INVALID_KEY: {0}")]
    InvalidKey(String),

    /// The backing directory could not be read or written.
    #[error("STORAGE_ERROR: {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored entry exists but cannot be decoded.
    #[error("CORRUPT_ENTRY: {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The computed value could not be serialized.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No cache entry found for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Storage { path: path.into(), source }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Corrupt { path: path.into(), reason: reason.into() }
    }

    /// Whether this error came from the backing store rather than from the
    /// caller's input.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Error::Storage { .. } | Error::Corrupt { .. })
    }
}
