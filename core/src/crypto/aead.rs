//! AEAD-backed `Cipher` for AES-256-GCM and ChaCha20-Poly1305.
//!
//! Design notes:
//! - Both ciphers use 32-byte keys and 12-byte nonces.
//! - Key and nonce are bound at construction and never change.
//! - Tag verification must fail closed (no partial plaintext).

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce as AesNonce};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as ChaNonce};

use crate::crypto::types::{Cipher, CipherAlgorithm, CryptoError, KEY_LEN_32, NONCE_LEN_12, TAG_LEN};
use crate::utils::{key_fingerprint, nonce_fingerprint};

#[derive(Clone)]
enum AeadImpl {
    AesGcm(Aes256Gcm),
    ChaCha(ChaCha20Poly1305),
}

#[derive(Clone)]
pub struct AeadCipher {
    algorithm: CipherAlgorithm,
    inner: AeadImpl,
    nonce: [u8; NONCE_LEN_12],
    fingerprint: String,
    nonce_id: String,
}

impl AeadCipher {
    pub fn new(algorithm: CipherAlgorithm, key: &[u8], nonce: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_LEN_32 {
            return Err(CryptoError::InvalidKeyLen {
                expected: KEY_LEN_32,
                actual: key.len(),
            });
        }
        let nonce: [u8; NONCE_LEN_12] = nonce.try_into().map_err(|_| CryptoError::InvalidNonceLen {
            expected: NONCE_LEN_12,
            actual: nonce.len(),
        })?;

        let inner = match algorithm {
            CipherAlgorithm::Aes256Gcm => AeadImpl::AesGcm(Aes256Gcm::new_from_slice(key).map_err(|_| {
                CryptoError::InvalidKeyLen { expected: KEY_LEN_32, actual: key.len() }
            })?),
            CipherAlgorithm::ChaCha20Poly1305 => {
                AeadImpl::ChaCha(ChaCha20Poly1305::new_from_slice(key).map_err(|_| {
                    CryptoError::InvalidKeyLen { expected: KEY_LEN_32, actual: key.len() }
                })?)
            }
        };

        Ok(Self {
            algorithm,
            inner,
            fingerprint: key_fingerprint(key),
            nonce_id: nonce_fingerprint(&nonce),
            nonce,
        })
    }

    /// Build from hex-encoded key and nonce, as found in configuration.
    pub fn from_hex(algorithm: CipherAlgorithm, key_hex: &str, nonce_hex: &str) -> Result<Self, CryptoError> {
        let key = hex::decode(key_hex)
            .map_err(|e| CryptoError::Failure(format!("key is not valid hex: {}", e)))?;
        let nonce = hex::decode(nonce_hex)
            .map_err(|e| CryptoError::Failure(format!("nonce is not valid hex: {}", e)))?;
        Self::new(algorithm, &key, &nonce)
    }
}

impl fmt::Debug for AeadCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("AeadCipher")
            .field("algorithm", &self.algorithm)
            .field("fingerprint", &self.fingerprint)
            .field("nonce_id", &self.nonce_id)
            .finish()
    }
}

impl Cipher for AeadCipher {
    fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    fn key_fingerprint(&self) -> String {
        self.fingerprint.clone()
    }

    fn nonce_fingerprint(&self) -> String {
        self.nonce_id.clone()
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.inner {
            AeadImpl::AesGcm(cipher) => cipher
                .encrypt(AesNonce::from_slice(&self.nonce), plaintext)
                .map_err(|_| CryptoError::Failure("AES-GCM seal failed".into())),
            AeadImpl::ChaCha(cipher) => cipher
                .encrypt(ChaNonce::from_slice(&self.nonce), plaintext)
                .map_err(|_| CryptoError::Failure("ChaCha20-Poly1305 seal failed".into())),
        }
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() < TAG_LEN {
            return Err(CryptoError::Failure("ciphertext too short".into()));
        }

        match &self.inner {
            AeadImpl::AesGcm(cipher) => cipher
                .decrypt(AesNonce::from_slice(&self.nonce), ciphertext)
                .map_err(|_| CryptoError::TagMismatch),
            AeadImpl::ChaCha(cipher) => cipher
                .decrypt(ChaNonce::from_slice(&self.nonce), ciphertext)
                .map_err(|_| CryptoError::TagMismatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Vec<u8> {
        vec![0x11u8; KEY_LEN_32]
    }

    fn nonce() -> Vec<u8> {
        vec![0x22u8; NONCE_LEN_12]
    }

    #[test]
    fn encryption_is_deterministic_for_fixed_nonce() {
        let cipher = AeadCipher::new(CipherAlgorithm::Aes256Gcm, &key(), &nonce()).unwrap();
        let a = cipher.encrypt(b"payload").unwrap();
        let b = cipher.encrypt(b"payload").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), b"payload".len() + TAG_LEN);
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let cipher = AeadCipher::new(CipherAlgorithm::ChaCha20Poly1305, &key(), &nonce()).unwrap();
        let ct = cipher.encrypt(b"").unwrap();
        assert_eq!(cipher.decrypt(&ct).unwrap(), b"");
    }

    #[test]
    fn rejects_bad_key_and_nonce_lengths() {
        let err = AeadCipher::new(CipherAlgorithm::Aes256Gcm, &[0u8; 15], &nonce()).unwrap_err();
        assert_eq!(err, CryptoError::InvalidKeyLen { expected: 32, actual: 15 });

        let err = AeadCipher::new(CipherAlgorithm::Aes256Gcm, &key(), &[0u8; 8]).unwrap_err();
        assert_eq!(err, CryptoError::InvalidNonceLen { expected: 12, actual: 8 });
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let cipher = AeadCipher::new(CipherAlgorithm::Aes256Gcm, &key(), &nonce()).unwrap();
        let mut ct = cipher.encrypt(b"secret").unwrap();
        ct[0] ^= 0xFF;
        assert_eq!(cipher.decrypt(&ct).unwrap_err(), CryptoError::TagMismatch);
    }

    #[test]
    fn debug_output_hides_key() {
        let cipher = AeadCipher::new(CipherAlgorithm::Aes256Gcm, &key(), &nonce()).unwrap();
        let dbg = format!("{:?}", cipher);
        assert!(dbg.contains("fingerprint"));
        assert!(!dbg.contains("1111111111"));
    }
}
