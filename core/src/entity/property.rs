//! One logical property stored through a strategy pipeline.
//!
//! Lifecycle per `(key, property name)`:
//! - absent -> present on the first `set_data`
//! - present -> present on later `set_data` (full overwrite)
//! - present -> absent on `delete_data`
//!
//! Chunk cleanup: the previous record's side entries are collected before an
//! overwrite and those the new write did not reuse are deleted once the new
//! record is stored. A delete removes all of them before the record. Cleanup
//! failures are logged and do not fail the operation.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::entity::naming::PropertyNaming;
use crate::entity::pipeline::{collect_side_keys, decode_pipeline, encode_pipeline, release_side_keys};
use crate::entity::record::StoredRecord;
use crate::strategy::{PipelineContext, Strategy, StrategyId, StrategyRegistry};
use crate::types::StoreError;

pub struct PropertyEntity<N: PropertyNaming> {
    naming: N,
    backend: Arc<dyn Backend>,
    registry: Arc<StrategyRegistry>,
    active: RwLock<Vec<StrategyId>>,
}

impl<N: PropertyNaming> PropertyEntity<N> {
    /// Entity with an empty pipeline: values are stored as plain JSON.
    pub fn new(naming: N, backend: Arc<dyn Backend>, registry: Arc<StrategyRegistry>) -> Self {
        Self {
            naming,
            backend,
            registry,
            active: RwLock::new(Vec::new()),
        }
    }

    pub fn with_strategies(
        naming: N,
        backend: Arc<dyn Backend>,
        registry: Arc<StrategyRegistry>,
        strategies: Vec<Strategy>,
    ) -> Self {
        let entity = Self::new(naming, backend, registry);
        entity.update_strategies(strategies);
        entity
    }

    pub fn property_name(&self, args: &N::Args) -> String {
        self.naming.property_name(args)
    }

    pub fn naming(&self) -> &N {
        &self.naming
    }

    /// Pipeline used by the next `set_data`, in encode order.
    pub fn active_strategy_ids(&self) -> Vec<StrategyId> {
        self.active.read().clone()
    }

    /// Register `strategies` and make them the pipeline for future writes.
    ///
    /// Stored records keep decoding through their own identifiers.
    pub fn update_strategies(&self, strategies: Vec<Strategy>) -> Vec<StrategyId> {
        let ids = self.registry.register_all(strategies);
        debug!(ids = ?ids, "updated active strategies");
        *self.active.write() = ids.clone();
        ids
    }

    /// Switch to already registered strategies by identifier.
    pub fn update_strategy_ids(&self, ids: Vec<StrategyId>) -> Result<(), StoreError> {
        if let Some(unknown) = ids.iter().find(|id| !self.registry.contains(id)) {
            return Err(StoreError::UnknownStrategy { id: unknown.to_string() });
        }
        debug!(ids = ?ids, "updated active strategy ids");
        *self.active.write() = ids;
        Ok(())
    }

    /// Read and decode the value, `Ok(None)` when nothing is stored.
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        key: &str,
        args: &N::Args,
    ) -> Result<Option<T>, StoreError> {
        let property = self.property_name(args);
        let Some(record) = self.read_record(key, &property).await? else {
            debug!(key, property = %property, "no stored value");
            return Ok(None);
        };

        let ctx = PipelineContext::new(key, property.as_str());
        let plain = decode_pipeline(&self.registry, &record.strategy_ids, &ctx, record.payload).await?;
        let value = serde_json::from_str(&plain)?;
        debug!(key, property = %property, ids = ?record.strategy_ids, "read value");
        Ok(Some(value))
    }

    /// Encode and store `value`, replacing any previous value.
    pub async fn set_data<T: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &T,
        args: &N::Args,
    ) -> Result<(), StoreError> {
        let property = self.property_name(args);
        let mut ctx = PipelineContext::new(key, property.as_str());
        let previous = match self.read_record(key, &property).await {
            Ok(Some(record)) => self.side_keys_of(&ctx, record).await,
            Ok(None) => BTreeSet::new(),
            Err(StoreError::MalformedRecord(msg)) => {
                warn!(key, property = %property, error = %msg, "overwriting unreadable record");
                BTreeSet::new()
            }
            Err(e) => return Err(e),
        };

        let ids = self.active_strategy_ids();
        let serialized = serde_json::to_string(value)?;
        let payload = encode_pipeline(&self.registry, &ids, &mut ctx, serialized).await?;

        let record = StoredRecord::new(payload, ids);
        self.backend
            .set(key, &property, record.to_json()?)
            .await
            .map_err(StoreError::from_backend)?;
        debug!(key, property = %property, ids = ?record.strategy_ids, "stored value");

        let stale: Vec<&String> = previous.difference(ctx.written_sub_keys()).collect();
        self.release(&ctx, stale).await;
        Ok(())
    }

    /// Remove the value and the chunks it refers to. Absent values are a no-op.
    pub async fn delete_data(&self, key: &str, args: &N::Args) -> Result<(), StoreError> {
        let property = self.property_name(args);
        let ctx = PipelineContext::new(key, property.as_str());

        match self.read_record(key, &property).await {
            Ok(Some(record)) => {
                let side_keys = self.side_keys_of(&ctx, record).await;
                self.release(&ctx, &side_keys).await;
            }
            Ok(None) => {}
            Err(StoreError::MalformedRecord(msg)) => {
                warn!(key, property = %property, error = %msg, "deleting unreadable record");
            }
            Err(e) => return Err(e),
        }

        self.backend
            .delete(key, &property)
            .await
            .map_err(StoreError::from_backend)?;
        debug!(key, property = %property, "deleted value");
        Ok(())
    }

    async fn read_record(&self, key: &str, property: &str) -> Result<Option<StoredRecord>, StoreError> {
        let raw = self
            .backend
            .get(key, property)
            .await
            .map_err(StoreError::from_backend)?;
        raw.as_deref().map(StoredRecord::from_json).transpose()
    }

    async fn side_keys_of(&self, ctx: &PipelineContext, record: StoredRecord) -> BTreeSet<String> {
        collect_side_keys(&self.registry, &record.strategy_ids, ctx, record.payload)
            .await
            .unwrap_or_else(|e| {
                warn!(
                    key = ctx.key(),
                    property = ctx.property_name(),
                    error = %e,
                    "cannot list chunks of previous record"
                );
                BTreeSet::new()
            })
    }

    async fn release<'a>(&self, ctx: &PipelineContext, sub_keys: impl IntoIterator<Item = &'a String>) {
        match release_side_keys(self.backend.as_ref(), ctx.key(), sub_keys).await {
            Ok(released) => debug!(key = ctx.key(), property = ctx.property_name(), released, "released chunks"),
            Err(e) => warn!(
                key = ctx.key(),
                property = ctx.property_name(),
                error = %e,
                "failed to release chunks"
            ),
        }
    }
}
