use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CHUNK_BASE_NAME, DEFAULT_CHUNK_SIZE, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL,
};
use crate::crypto::{AeadCipher, CipherAlgorithm};
use crate::types::StoreError;

/// Key material for the encryption stage.
#[derive(Clone, Serialize, Deserialize)]
pub struct CipherConfig {
    pub algorithm: CipherAlgorithm,
    /// 32-byte key, hex.
    pub key_hex: String,
    /// 12-byte nonce, hex.
    pub nonce_hex: String,
}

impl std::fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherConfig")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl CipherConfig {
    pub fn build(&self) -> Result<AeadCipher, StoreError> {
        Ok(AeadCipher::from_hex(self.algorithm, &self.key_hex, &self.nonce_hex)?)
    }
}

/// Catalog settings.
///
/// - `chunk_size`: chars per chunk entry; keep its UTF-8 size under the backend cap.
/// - `cipher`: `None` leaves the encryption stage out of the form-data pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub chunk_size: usize,
    pub chunk_base_name: String,
    pub compression_level: u32,
    pub cipher: Option<CipherConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_base_name: DEFAULT_CHUNK_BASE_NAME.to_owned(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            cipher: None,
        }
    }
}

impl CatalogConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_cipher(mut self, cipher: CipherConfig) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.chunk_size == 0 {
            return Err(StoreError::Config("chunk_size must be positive".into()));
        }
        if self.chunk_base_name.is_empty() {
            return Err(StoreError::Config("chunk_base_name must not be empty".into()));
        }
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(StoreError::Config(format!(
                "compression_level {} outside 0..={}",
                self.compression_level, MAX_COMPRESSION_LEVEL
            )));
        }
        if let Some(cipher) = &self.cipher {
            cipher
                .build()
                .map_err(|e| StoreError::Config(format!("cipher: {}", e)))?;
        }
        Ok(())
    }
}
