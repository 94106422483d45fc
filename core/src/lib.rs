//! property-codec
//!
//! Stores structured values in size-limited key-value property stores through
//! self-describing strategy pipelines (encoding, compression, encryption,
//! chunking), so pipelines can change without breaking stored values.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Collaborator capabilities
pub mod backend;
pub mod crypto;

// Codec layers
pub mod strategy;
pub mod entity;
pub mod catalog;

// -----------------------------------------------------------------------------
// Prelude
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::backend::{Backend, BackendError, MemoryBackend};
    pub use crate::catalog::{CatalogConfig, CipherConfig, EntityCatalog};
    pub use crate::crypto::{AeadCipher, Cipher, CipherAlgorithm, CryptoError};
    pub use crate::entity::{FixedName, FormDataNaming, FormRef, PropertyEntity, PropertyNaming, StoredRecord};
    pub use crate::strategy::{
        ChunkMetadata, ChunkingParams, ChunkingStrategy, CompressionParams, CompressionStrategy,
        EncodingParams, EncodingStrategy, EncryptionParams, EncryptionStrategy, PipelineContext, Strategy, StrategyId,
        StrategyRegistry,
    };
    pub use crate::types::{ChunkFetchReason, StoreError};
}
