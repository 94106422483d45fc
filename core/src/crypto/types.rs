use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::cipher_names;

/// Stable key length for both supported ciphers.
pub const KEY_LEN_32: usize = 32;

/// Standard 12-byte nonce length for AES-GCM and ChaCha20-Poly1305.
pub const NONCE_LEN_12: usize = 12;

/// Fixed AEAD tag length (bytes).
pub const TAG_LEN: usize = 16;

/// Supported AEAD algorithms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherAlgorithm {
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl CipherAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            CipherAlgorithm::Aes256Gcm => cipher_names::AES256_GCM,
            CipherAlgorithm::ChaCha20Poly1305 => cipher_names::CHACHA20_POLY1305,
        }
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            cipher_names::AES256_GCM => Ok(CipherAlgorithm::Aes256Gcm),
            cipher_names::CHACHA20_POLY1305 => Ok(CipherAlgorithm::ChaCha20Poly1305),
            other => Err(CryptoError::UnsupportedCipher { name: other.to_owned() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Cipher name not recognized.
    UnsupportedCipher { name: String },

    /// Invalid key length provided to cipher.
    InvalidKeyLen { expected: usize, actual: usize },

    /// Nonce length mismatch (must be 12 bytes for supported ciphers).
    InvalidNonceLen { expected: usize, actual: usize },

    /// AEAD tag mismatch (authentication failure).
    TagMismatch,

    /// General runtime error with context.
    Failure(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CryptoError::*;
        match self {
            UnsupportedCipher { name } =>
                write!(f, "unsupported cipher: {}", name),
            InvalidKeyLen { expected, actual } =>
                write!(f, "invalid key length: expected={}, actual={}", expected, actual),
            InvalidNonceLen { expected, actual } =>
                write!(f, "invalid nonce length: expected={}, actual={}", expected, actual),
            TagMismatch =>
                write!(f, "AEAD tag mismatch"),
            Failure(msg) =>
                write!(f, "crypto failure: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Opaque symmetric-cipher capability consumed by the encryption strategy.
///
/// Key and nonce are fixed for the lifetime of one instance, so `encrypt` is
/// deterministic.
pub trait Cipher: Send + Sync + fmt::Debug {
    fn algorithm(&self) -> CipherAlgorithm;

    /// Short, non-secret identifier of the key material.
    fn key_fingerprint(&self) -> String;

    /// Short, non-secret identifier of the fixed nonce.
    fn nonce_fingerprint(&self) -> String;

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;
}
