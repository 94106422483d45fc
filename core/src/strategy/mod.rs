//! Reversible payload strategies and their registry.
//!
//! Responsibilities:
//! - Define the closed set of strategies (encoding, compression, encryption, chunking)
//! - Derive deterministic identifiers from name + canonical parameters
//! - Resolve identifiers back to live instances
//!
//! Non-responsibilities:
//! - Choosing pipelines (entities do that)
//! - Record layout

pub mod types;
pub mod registry;
pub mod encoding;
pub mod compression;
pub mod encryption;
pub mod chunking;

pub use types::{ParamValue, PipelineContext, Strategy, StrategyId, StrategyParams};
pub use registry::StrategyRegistry;
pub use encoding::{EncodingParams, EncodingStrategy};
pub use compression::{CompressionParams, CompressionStrategy};
pub use encryption::{EncryptionParams, EncryptionStrategy};
pub use chunking::{ChunkMetadata, ChunkingParams, ChunkingStrategy};
