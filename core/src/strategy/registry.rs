//! Strategy registry.
//!
//! Resolves deterministic strategy identifiers to live instances. One registry
//! is owned by one catalog; nothing here is process-global.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::strategy::types::{Strategy, StrategyId};
use crate::types::StoreError;

#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: RwLock<HashMap<StrategyId, Arc<Strategy>>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `strategy` under its derived identifier.
    ///
    /// An existing entry with the same identifier is replaced (last write wins).
    pub fn register(&self, strategy: impl Into<Strategy>) -> StrategyId {
        let strategy = strategy.into();
        let id = strategy.id();
        let replaced = self
            .strategies
            .write()
            .insert(id.clone(), Arc::new(strategy))
            .is_some();
        debug!(id = %id, replaced, "registered strategy");
        id
    }

    /// Register every strategy, returning identifiers in input order.
    pub fn register_all<I, S>(&self, strategies: I) -> Vec<StrategyId>
    where
        I: IntoIterator<Item = S>,
        S: Into<Strategy>,
    {
        strategies.into_iter().map(|s| self.register(s)).collect()
    }

    pub fn get(&self, id: &StrategyId) -> Option<Arc<Strategy>> {
        self.strategies.read().get(id).cloned()
    }

    /// Like `get`, but a missing identifier is an `UnknownStrategy` error.
    pub fn lookup(&self, id: &StrategyId) -> Result<Arc<Strategy>, StoreError> {
        self.get(id).ok_or_else(|| StoreError::UnknownStrategy { id: id.to_string() })
    }

    /// Resolve a whole pipeline up front, failing on the first unknown identifier.
    pub fn resolve(&self, ids: &[StrategyId]) -> Result<Vec<Arc<Strategy>>, StoreError> {
        let strategies = self.strategies.read();
        ids.iter()
            .map(|id| {
                strategies
                    .get(id)
                    .cloned()
                    .ok_or_else(|| StoreError::UnknownStrategy { id: id.to_string() })
            })
            .collect()
    }

    pub fn contains(&self, id: &StrategyId) -> bool {
        self.strategies.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.strategies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.read().is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<StrategyId> {
        let mut ids: Vec<StrategyId> = self.strategies.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
