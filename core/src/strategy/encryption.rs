//! Encryption through the opaque `Cipher` capability, hex on the way out.

use std::sync::Arc;

use crate::constants::strategy_names;
use crate::crypto::{Cipher, CipherAlgorithm};
use crate::strategy::types::StrategyParams;
use crate::types::StoreError;

/// Identity of the cipher behind an encryption stage; never the key itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionParams {
    pub cipher: CipherAlgorithm,
    /// Non-secret fingerprint of the key material.
    pub key_id: String,
    /// Fingerprint of the fixed nonce; same key with another nonce is another strategy.
    pub nonce_id: String,
}

#[derive(Debug, Clone)]
pub struct EncryptionStrategy {
    cipher: Arc<dyn Cipher>,
}

impl EncryptionStrategy {
    pub const NAME: &'static str = strategy_names::ENCRYPTION;

    pub fn new(cipher: Arc<dyn Cipher>) -> Self {
        Self { cipher }
    }

    pub fn encryption_params(&self) -> EncryptionParams {
        EncryptionParams {
            cipher: self.cipher.algorithm(),
            key_id: self.cipher.key_fingerprint(),
            nonce_id: self.cipher.nonce_fingerprint(),
        }
    }

    pub fn params(&self) -> StrategyParams {
        let params = self.encryption_params();
        StrategyParams::new()
            .with("cipher", params.cipher.name())
            .with("keyId", params.key_id)
            .with("nonceId", params.nonce_id)
    }

    pub fn encode(&self, payload: &str) -> Result<String, StoreError> {
        let ciphertext = self.cipher.encrypt(payload.as_bytes())?;
        Ok(hex::encode(ciphertext))
    }

    pub fn decode(&self, encoded: &str) -> Result<String, StoreError> {
        let ciphertext = hex::decode(encoded).map_err(|e| StoreError::codec(Self::NAME, e))?;
        let plaintext = self.cipher.decrypt(&ciphertext)?;
        String::from_utf8(plaintext).map_err(|e| StoreError::codec(Self::NAME, e))
    }
}
