// Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;

use property_codec::backend::{Backend, BackendError, MemoryBackend};
use property_codec::crypto::{AeadCipher, CipherAlgorithm};

pub const KEY: &str = "ISSUE-123";

/// Memory backend with injectable failures and optional reversed read completion.
#[derive(Default)]
pub struct FaultyBackend {
    pub inner: MemoryBackend,
    set_faults: Mutex<Vec<(String, BackendError)>>,
    get_faults: Mutex<Vec<(String, BackendError)>>,
    reverse_reads: bool,
    completed_reads: Mutex<Vec<String>>,
}

impl FaultyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads of `*.{index}` sub-keys finish in descending index order.
    pub fn with_reversed_reads() -> Self {
        Self {
            reverse_reads: true,
            ..Self::default()
        }
    }

    pub fn fail_set(&self, sub_key: &str, err: BackendError) {
        self.set_faults.lock().push((sub_key.to_owned(), err));
    }

    pub fn fail_get(&self, sub_key: &str, err: BackendError) {
        self.get_faults.lock().push((sub_key.to_owned(), err));
    }

    pub fn completed_reads(&self) -> Vec<String> {
        self.completed_reads.lock().clone()
    }

    fn fault(faults: &Mutex<Vec<(String, BackendError)>>, sub_key: &str) -> Option<BackendError> {
        faults
            .lock()
            .iter()
            .find(|(target, _)| target == sub_key)
            .map(|(_, err)| err.clone())
    }
}

#[async_trait]
impl Backend for FaultyBackend {
    async fn get(&self, key: &str, sub_key: &str) -> Result<Option<String>, BackendError> {
        if self.reverse_reads {
            if let Some(index) = sub_key.rsplit('.').next().and_then(|s| s.parse::<usize>().ok()) {
                for _ in 0..(64usize.saturating_sub(index)) {
                    YieldNow::default().await;
                }
            }
        }
        if let Some(err) = Self::fault(&self.get_faults, sub_key) {
            return Err(err);
        }
        let value = self.inner.get(key, sub_key).await;
        self.completed_reads.lock().push(sub_key.to_owned());
        value
    }

    async fn set(&self, key: &str, sub_key: &str, value: String) -> Result<(), BackendError> {
        if let Some(err) = Self::fault(&self.set_faults, sub_key) {
            return Err(err);
        }
        self.inner.set(key, sub_key, value).await
    }

    async fn delete(&self, key: &str, sub_key: &str) -> Result<(), BackendError> {
        self.inner.delete(key, sub_key).await
    }
}

/// Returns `Pending` once, waking itself.
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub fn test_cipher(fill: u8) -> Arc<AeadCipher> {
    test_cipher_with_nonce(fill, 0x42)
}

pub fn test_cipher_with_nonce(fill: u8, nonce_fill: u8) -> Arc<AeadCipher> {
    Arc::new(AeadCipher::new(CipherAlgorithm::Aes256Gcm, &[fill; 32], &[nonce_fill; 12]).unwrap())
}
