use crate::constants::{KEY_FINGERPRINT_LEN, STRATEGY_ID_DIGEST_LEN};

/// Content hash anchoring chunk reassembly: lowercase hex BLAKE3 of the UTF-8 bytes.
pub fn content_hash(payload: &str) -> String {
    blake3::hash(payload.as_bytes()).to_hex().to_string()
}

/// Hex digest of `name` and the canonical parameter bytes, truncated for identifiers.
pub fn strategy_digest(name: &str, canonical_params: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(name.as_bytes());
    // Separator keeps ("ab", "c") and ("a", "bc") apart.
    hasher.update(&[0u8]);
    hasher.update(canonical_params.as_bytes());
    hex::encode(&hasher.finalize().as_bytes()[..STRATEGY_ID_DIGEST_LEN])
}

/// Short non-secret fingerprint of cipher key material.
pub fn key_fingerprint(key: &[u8]) -> String {
    fingerprint(b"key-fingerprint", key)
}

/// Short fingerprint of a cipher nonce, kept apart from key fingerprints.
pub fn nonce_fingerprint(nonce: &[u8]) -> String {
    fingerprint(b"nonce-fingerprint", nonce)
}

fn fingerprint(label: &[u8], material: &[u8]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(label);
    hasher.update(material);
    hex::encode(&hasher.finalize().as_bytes()[..KEY_FINGERPRINT_LEN])
}

/// Split `payload` into slices of at most `chunk_size` chars, preserving order.
///
/// Never splits a code point; an empty payload yields no slices.
pub fn split_chars(payload: &str, chunk_size: usize) -> Vec<&str> {
    debug_assert!(chunk_size > 0);
    let mut slices = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in payload.char_indices() {
        if count == chunk_size {
            slices.push(&payload[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if count > 0 {
        slices.push(&payload[start..]);
    }
    slices
}
