use std::fmt;

use thiserror::Error;

use crate::backend::BackendError;
use crate::crypto::CryptoError;

/// Why a chunk could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkFetchReason {
    /// The sub-key holds no value.
    Missing,
    /// The backend read failed.
    Backend(BackendError),
}

impl fmt::Display for ChunkFetchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkFetchReason::Missing => write!(f, "chunk missing"),
            ChunkFetchReason::Backend(e) => write!(f, "{}", e),
        }
    }
}

/// Unified error covering the registry, strategies, entities and the backend.
/// - `From<T>` impls enable `?` across layers.
/// - Every variant reaches the entity's caller unmodified; nothing is retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored strategy identifier has no registered strategy.
    #[error("unknown strategy: {id}")]
    UnknownStrategy { id: String },

    /// A chunk write failed during encode; earlier chunks may remain.
    #[error("chunk {index} write failed at {sub_key}: {source}")]
    ChunkWriteFailed {
        index: u32,
        sub_key: String,
        #[source]
        source: BackendError,
    },

    /// A chunk could not be read during decode.
    #[error("chunk {index} fetch failed at {sub_key}: {reason}")]
    ChunkFetchFailed {
        index: u32,
        sub_key: String,
        reason: ChunkFetchReason,
    },

    /// Reassembled payload does not hash to the stored value.
    #[error("integrity mismatch: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    /// Backend failure not covered by a more specific variant.
    #[error("backend failure: {0}")]
    Backend(BackendError),

    /// A backend call was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// A strategy could not decode its input.
    #[error("{strategy} codec error: {msg}")]
    Codec { strategy: &'static str, msg: String },

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("malformed stored record: {0}")]
    MalformedRecord(String),

    #[error("malformed chunk metadata: {0}")]
    MalformedMetadata(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid strategy parameters: {0}")]
    InvalidParams(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Map a backend error, keeping cancellation distinct.
    pub fn from_backend(e: BackendError) -> Self {
        match e {
            BackendError::Cancelled => StoreError::Cancelled,
            other => StoreError::Backend(other),
        }
    }

    pub fn codec(strategy: &'static str, msg: impl fmt::Display) -> Self {
        StoreError::Codec { strategy, msg: msg.to_string() }
    }
}

impl From<BackendError> for StoreError {
    fn from(e: BackendError) -> Self {
        StoreError::from_backend(e)
    }
}
