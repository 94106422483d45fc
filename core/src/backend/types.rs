use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a backend capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Value exceeds the backend's per-entry size limit.
    #[error("value too large: {len} > {max} bytes")]
    ValueTooLarge { len: usize, max: usize },

    /// The call was cancelled by the caller's cancellation mechanism.
    #[error("backend call cancelled")]
    Cancelled,

    /// Any other transport or service failure.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store addressed by `(key, sub_key)`.
///
/// `key` is the owning entity (e.g. an issue key), `sub_key` the property name.
/// Implementations enforce their own maximum value size.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Read a value, `Ok(None)` when absent.
    async fn get(&self, key: &str, sub_key: &str) -> Result<Option<String>, BackendError>;

    /// Write (create or overwrite) a value.
    async fn set(&self, key: &str, sub_key: &str, value: String) -> Result<(), BackendError>;

    /// Remove a value. Removing an absent value succeeds.
    async fn delete(&self, key: &str, sub_key: &str) -> Result<(), BackendError>;
}
