/// Default chunk size in payload units (chars).
///
/// Integrators pick a value whose UTF-8 size stays under the backend's entry cap.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Default sub-key segment for chunk entries.
pub const DEFAULT_CHUNK_BASE_NAME: &str = "chunk";

/// Default zlib level (balanced).
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Highest zlib level accepted.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Number of digest bytes kept in a strategy identifier (rendered as hex).
pub const STRATEGY_ID_DIGEST_LEN: usize = 16;

/// Number of digest bytes kept in a cipher key or nonce fingerprint (rendered as hex).
pub const KEY_FINGERPRINT_LEN: usize = 8;

/// Stable strategy names. These feed the strategy identifier, never change them.
pub mod strategy_names {
    pub const ENCODING: &str = "encoding";
    pub const COMPRESSION: &str = "compression";
    pub const ENCRYPTION: &str = "encryption";
    pub const CHUNKING: &str = "chunking";
}

/// Stable cipher names (mirrored in `CipherConfig` and strategy parameters).
pub mod cipher_names {
    pub const AES256_GCM: &str = "aes-256-gcm";
    pub const CHACHA20_POLY1305: &str = "chacha20-poly1305";
}

/// Property names used by the catalog's entities.
pub mod property_names {
    pub const FORM_DATA: &str = "formData";
    pub const IS_AUTO_ADD_TRIGGERED: &str = "isAutoAddTriggered";
}
