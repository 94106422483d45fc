//! Composition root: the fixed set of property entities.
//!
//! One backend and one registry are shared by every entity in a catalog.
//! Separate catalogs never share registries.

pub mod config;

pub use config::{CatalogConfig, CipherConfig};

use std::sync::Arc;

use tracing::info;

use crate::backend::Backend;
use crate::constants::property_names;
use crate::entity::{FixedName, FormDataNaming, PropertyEntity};
use crate::strategy::{
    ChunkingParams, ChunkingStrategy, CompressionParams, CompressionStrategy, EncryptionStrategy,
    Strategy, StrategyRegistry,
};
use crate::types::StoreError;

pub struct EntityCatalog {
    backend: Arc<dyn Backend>,
    registry: Arc<StrategyRegistry>,
    /// Form payloads: compressed, optionally encrypted, then chunked.
    pub form_data: PropertyEntity<FormDataNaming>,
    /// Single flag stored as plain JSON.
    pub is_auto_add_triggered: PropertyEntity<FixedName>,
}

impl EntityCatalog {
    pub fn new(backend: Arc<dyn Backend>, config: CatalogConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let registry = Arc::new(StrategyRegistry::new());

        let form_data = PropertyEntity::with_strategies(
            FormDataNaming,
            Arc::clone(&backend),
            Arc::clone(&registry),
            form_data_pipeline(&backend, &config)?,
        );
        let is_auto_add_triggered = PropertyEntity::new(
            FixedName::new(property_names::IS_AUTO_ADD_TRIGGERED),
            Arc::clone(&backend),
            Arc::clone(&registry),
        );

        info!(
            strategies = registry.len(),
            chunk_size = config.chunk_size,
            encrypted = config.cipher.is_some(),
            "entity catalog ready"
        );

        Ok(Self {
            backend,
            registry,
            form_data,
            is_auto_add_triggered,
        })
    }

    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }
}

/// `[Compression, Encryption?, Chunking]`
fn form_data_pipeline(backend: &Arc<dyn Backend>, config: &CatalogConfig) -> Result<Vec<Strategy>, StoreError> {
    let mut strategies: Vec<Strategy> = vec![CompressionStrategy::new(CompressionParams {
        level: config.compression_level,
    })?
    .into()];

    if let Some(cipher) = &config.cipher {
        strategies.push(EncryptionStrategy::new(Arc::new(cipher.build()?)).into());
    }

    strategies.push(
        ChunkingStrategy::new(
            Arc::clone(backend),
            ChunkingParams {
                chunk_size: config.chunk_size,
                base_property_name: config.chunk_base_name.clone(),
            },
        )?
        .into(),
    );
    Ok(strategies)
}
