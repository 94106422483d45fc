//! Chunked storage for payloads larger than one backend entry.
//!
//! Responsibilities:
//! - Split a payload into `chunk_size`-char slices stored at derived sub-keys
//! - Emit `{totalChunks, hash}` metadata in place of the payload
//! - Reassemble strictly by index and verify the content hash
//!
//! Non-responsibilities:
//! - Rollback of partial writes
//! - Retries
//!
//! Chunk sub-key layout: `{property_name}.{base_property_name}.{index}`, stored
//! under the same primary key as the record that owns the metadata.

use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::backend::{Backend, BackendError};
use crate::constants::{strategy_names, DEFAULT_CHUNK_BASE_NAME, DEFAULT_CHUNK_SIZE};
use crate::strategy::types::{PipelineContext, StrategyParams};
use crate::types::{ChunkFetchReason, StoreError};
use crate::utils::{content_hash, split_chars};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingParams {
    /// Maximum chars per backend entry.
    pub chunk_size: usize,
    /// Sub-key segment between the property name and the chunk index.
    pub base_property_name: String,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            base_property_name: DEFAULT_CHUNK_BASE_NAME.to_owned(),
        }
    }
}

/// What chunking hands to the next stage instead of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub total_chunks: u32,
    /// Hex BLAKE3 of the whole pre-chunk payload.
    pub hash: String,
}

impl ChunkMetadata {
    pub fn parse(encoded: &str) -> Result<Self, StoreError> {
        serde_json::from_str(encoded).map_err(|e| StoreError::MalformedMetadata(e.to_string()))
    }
}

#[derive(Clone)]
pub struct ChunkingStrategy {
    params: ChunkingParams,
    backend: Arc<dyn Backend>,
}

impl fmt::Debug for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkingStrategy")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl ChunkingStrategy {
    pub const NAME: &'static str = strategy_names::CHUNKING;

    pub fn new(backend: Arc<dyn Backend>, params: ChunkingParams) -> Result<Self, StoreError> {
        if params.chunk_size == 0 {
            return Err(StoreError::InvalidParams("chunk size must be positive".into()));
        }
        if params.base_property_name.is_empty() {
            return Err(StoreError::InvalidParams("base property name must not be empty".into()));
        }
        Ok(Self { params, backend })
    }

    pub fn chunk_size(&self) -> usize {
        self.params.chunk_size
    }

    pub fn params(&self) -> StrategyParams {
        StrategyParams::new()
            .with("chunkSize", self.params.chunk_size as i64)
            .with("basePropertyName", self.params.base_property_name.as_str())
    }

    /// Sub-key of chunk `index` for the record stored at `property_name`.
    pub fn chunk_sub_key(&self, property_name: &str, index: u32) -> String {
        format!("{}.{}.{}", property_name, self.params.base_property_name, index)
    }

    pub async fn encode(&self, ctx: &mut PipelineContext, payload: &str) -> Result<String, StoreError> {
        let slices = split_chars(payload, self.params.chunk_size);
        let total_chunks = u32::try_from(slices.len())
            .map_err(|_| StoreError::InvalidParams("payload needs more than u32::MAX chunks".into()))?;
        let hash = content_hash(payload);

        let sub_keys: Vec<String> = (0..total_chunks)
            .map(|index| self.chunk_sub_key(ctx.property_name(), index))
            .collect();

        {
            let key = ctx.key();
            // No ordering between chunk writes; all must land before returning.
            let writes = slices.iter().zip(&sub_keys).zip(0u32..).map(|((slice, sub_key), index)| {
                let backend = Arc::clone(&self.backend);
                async move {
                    trace!(key, sub_key = %sub_key, index, len = slice.len(), "writing chunk");
                    backend
                        .set(key, sub_key, (*slice).to_owned())
                        .await
                        .map_err(|e| match e {
                            BackendError::Cancelled => StoreError::Cancelled,
                            source => StoreError::ChunkWriteFailed {
                                index,
                                sub_key: sub_key.clone(),
                                source,
                            },
                        })
                }
            });
            try_join_all(writes).await?;
        }

        for sub_key in sub_keys {
            ctx.record_written(sub_key);
        }

        debug!(
            key = ctx.key(),
            property = ctx.property_name(),
            total_chunks,
            payload_len = payload.len(),
            "chunked payload"
        );

        let metadata = ChunkMetadata { total_chunks, hash };
        Ok(serde_json::to_string(&metadata)?)
    }

    pub async fn decode(&self, ctx: &PipelineContext, encoded: &str) -> Result<String, StoreError> {
        let metadata = ChunkMetadata::parse(encoded)?;
        let key = ctx.key();

        let fetches = (0..metadata.total_chunks).map(|index| {
            let sub_key = self.chunk_sub_key(ctx.property_name(), index);
            let backend = Arc::clone(&self.backend);
            async move {
                trace!(key, sub_key = %sub_key, index, "fetching chunk");
                match backend.get(key, &sub_key).await {
                    Ok(Some(chunk)) => Ok(chunk),
                    Ok(None) => Err(StoreError::ChunkFetchFailed {
                        index,
                        sub_key,
                        reason: ChunkFetchReason::Missing,
                    }),
                    Err(BackendError::Cancelled) => Err(StoreError::Cancelled),
                    Err(e) => Err(StoreError::ChunkFetchFailed {
                        index,
                        sub_key,
                        reason: ChunkFetchReason::Backend(e),
                    }),
                }
            }
        });

        // try_join_all yields results in input (index) order, whatever the completion order.
        let chunks: Vec<String> = try_join_all(fetches).await?;
        let payload = chunks.concat();

        let actual = content_hash(&payload);
        if actual != metadata.hash {
            return Err(StoreError::IntegrityMismatch {
                expected: metadata.hash,
                actual,
            });
        }

        debug!(
            key,
            property = ctx.property_name(),
            total_chunks = metadata.total_chunks,
            "reassembled payload"
        );
        Ok(payload)
    }

    /// Sub-keys of every chunk `encoded` refers to, in index order.
    pub fn side_keys(&self, ctx: &PipelineContext, encoded: &str) -> Result<Vec<String>, StoreError> {
        let metadata = ChunkMetadata::parse(encoded)?;
        Ok((0..metadata.total_chunks)
            .map(|index| self.chunk_sub_key(ctx.property_name(), index))
            .collect())
    }
}
