//! In-memory backend.
//!
//! Ordered map keyed by `(key, sub_key)` with an optional per-entry size cap,
//! so size-limit behavior can be exercised without a live property store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::types::{Backend, BackendError};

type EntryKey = (String, String);

#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<EntryKey, String>>,
    max_value_len: Option<usize>,
}

impl MemoryBackend {
    /// Unbounded backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend rejecting values longer than `max_value_len` bytes.
    pub fn with_max_value_len(max_value_len: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            max_value_len: Some(max_value_len),
        }
    }

    pub fn max_value_len(&self) -> Option<usize> {
        self.max_value_len
    }

    /// Total number of stored entries across all keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Sub-keys stored under `key`, in sorted order.
    pub fn sub_keys(&self, key: &str) -> Vec<String> {
        self.entries
            .lock()
            .keys()
            .filter(|(k, _)| k == key)
            .map(|(_, sub)| sub.clone())
            .collect()
    }

    /// Synchronous read, bypassing the async capability.
    pub fn raw_get(&self, key: &str, sub_key: &str) -> Option<String> {
        self.entries
            .lock()
            .get(&(key.to_owned(), sub_key.to_owned()))
            .cloned()
    }

    /// Synchronous write, bypassing the size cap.
    pub fn raw_set(&self, key: &str, sub_key: &str, value: impl Into<String>) {
        self.entries
            .lock()
            .insert((key.to_owned(), sub_key.to_owned()), value.into());
    }

    /// Synchronous removal; returns the removed value.
    pub fn raw_remove(&self, key: &str, sub_key: &str) -> Option<String> {
        self.entries
            .lock()
            .remove(&(key.to_owned(), sub_key.to_owned()))
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, key: &str, sub_key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.raw_get(key, sub_key))
    }

    async fn set(&self, key: &str, sub_key: &str, value: String) -> Result<(), BackendError> {
        if let Some(max) = self.max_value_len {
            if value.len() > max {
                return Err(BackendError::ValueTooLarge { len: value.len(), max });
            }
        }
        self.raw_set(key, sub_key, value);
        Ok(())
    }

    async fn delete(&self, key: &str, sub_key: &str) -> Result<(), BackendError> {
        self.raw_remove(key, sub_key);
        Ok(())
    }
}
