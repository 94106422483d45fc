//! Cipher capability for the encryption strategy.

pub mod types;
pub mod aead;

pub use types::*;
pub use aead::AeadCipher;
