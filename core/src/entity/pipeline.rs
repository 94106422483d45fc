//! Runs strategy pipelines forward and backward, and finds their side entries.
//!
//! Every identifier is resolved before the first stage runs, so an unknown
//! strategy fails without touching the backend.

use std::collections::BTreeSet;

use futures::future::try_join_all;
use tracing::trace;

use crate::backend::Backend;
use crate::strategy::{PipelineContext, StrategyId, StrategyRegistry};
use crate::types::StoreError;

/// Encode `input` through `ids` in order.
pub async fn encode_pipeline(
    registry: &StrategyRegistry,
    ids: &[StrategyId],
    ctx: &mut PipelineContext,
    input: String,
) -> Result<String, StoreError> {
    let strategies = registry.resolve(ids)?;
    let mut payload = input;
    for (id, strategy) in ids.iter().zip(&strategies) {
        payload = strategy.encode(ctx, &payload).await?;
        trace!(id = %id, len = payload.len(), "encoded stage");
    }
    Ok(payload)
}

/// Decode `payload` through `ids` in reverse order.
pub async fn decode_pipeline(
    registry: &StrategyRegistry,
    ids: &[StrategyId],
    ctx: &PipelineContext,
    payload: String,
) -> Result<String, StoreError> {
    let strategies = registry.resolve(ids)?;
    let mut payload = payload;
    for (id, strategy) in ids.iter().zip(&strategies).rev() {
        payload = strategy.decode(ctx, &payload).await?;
        trace!(id = %id, len = payload.len(), "decoded stage");
    }
    Ok(payload)
}

/// Sub-keys outside the record that a payload encoded through `ids` refers to.
///
/// Walks the pipeline backwards and decodes only as deep as the innermost stage
/// with side storage. Call this before anything overwrites those entries.
pub async fn collect_side_keys(
    registry: &StrategyRegistry,
    ids: &[StrategyId],
    ctx: &PipelineContext,
    payload: String,
) -> Result<BTreeSet<String>, StoreError> {
    let strategies = registry.resolve(ids)?;
    let mut keys = BTreeSet::new();
    let Some(innermost) = strategies.iter().position(|s| s.has_side_storage()) else {
        return Ok(keys);
    };

    let mut payload = payload;
    for (index, strategy) in strategies.iter().enumerate().rev() {
        keys.extend(strategy.side_keys(ctx, &payload)?);
        if index == innermost {
            break;
        }
        payload = strategy.decode(ctx, &payload).await?;
    }
    Ok(keys)
}

/// Delete `sub_keys` under `key`. Returns how many were deleted.
pub async fn release_side_keys<'a>(
    backend: &dyn Backend,
    key: &str,
    sub_keys: impl IntoIterator<Item = &'a String>,
) -> Result<usize, StoreError> {
    let deletes: Vec<_> = sub_keys
        .into_iter()
        .map(|sub_key| async move {
            trace!(key, sub_key = %sub_key, "deleting side entry");
            backend.delete(key, sub_key).await.map_err(StoreError::from_backend)
        })
        .collect();
    let released = deletes.len();
    try_join_all(deletes).await?;
    Ok(released)
}
