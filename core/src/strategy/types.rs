use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::strategy::{ChunkingStrategy, CompressionStrategy, EncodingStrategy, EncryptionStrategy};
use crate::types::StoreError;
use crate::utils::strategy_digest;

/// Primitive parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<&ParamValue> for serde_json::Value {
    fn from(v: &ParamValue) -> Self {
        match v {
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Int(i) => serde_json::Value::from(*i),
            ParamValue::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Ordered parameter map; key order is the canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParams(BTreeMap<String, ParamValue>);

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.to_owned(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical JSON: object with keys sorted, no whitespace.
    pub fn canonical(&self) -> String {
        // Built from the sorted map, so the order holds even with `preserve_order`.
        let map: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
            .collect();
        serde_json::Value::Object(map).to_string()
    }
}

/// Deterministic strategy identifier: `"{name}#{digest}"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyId(String);

impl StrategyId {
    pub fn derive(name: &str, params: &StrategyParams) -> Self {
        StrategyId(format!("{}#{}", name, strategy_digest(name, &params.canonical())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strategy name part of the identifier.
    pub fn name(&self) -> &str {
        self.0.split('#').next().unwrap_or_default()
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StrategyId {
    fn from(s: String) -> Self {
        StrategyId(s)
    }
}

impl From<&str> for StrategyId {
    fn from(s: &str) -> Self {
        StrategyId(s.to_owned())
    }
}

/// Where a pipeline run is addressing, plus side writes made on the way.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    key: String,
    property_name: String,
    written: BTreeSet<String>,
}

impl PipelineContext {
    pub fn new(key: impl Into<String>, property_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            property_name: property_name.into(),
            written: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Record a sub-key written by a strategy during encode.
    pub fn record_written(&mut self, sub_key: String) {
        self.written.insert(sub_key);
    }

    pub fn written_sub_keys(&self) -> &BTreeSet<String> {
        &self.written
    }
}

/// Closed set of reversible transformations over a string payload.
#[derive(Debug, Clone)]
pub enum Strategy {
    Encoding(EncodingStrategy),
    Compression(CompressionStrategy),
    Encryption(EncryptionStrategy),
    Chunking(ChunkingStrategy),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Encoding(_) => EncodingStrategy::NAME,
            Strategy::Compression(_) => CompressionStrategy::NAME,
            Strategy::Encryption(_) => EncryptionStrategy::NAME,
            Strategy::Chunking(_) => ChunkingStrategy::NAME,
        }
    }

    pub fn params(&self) -> StrategyParams {
        match self {
            Strategy::Encoding(s) => s.params(),
            Strategy::Compression(s) => s.params(),
            Strategy::Encryption(s) => s.params(),
            Strategy::Chunking(s) => s.params(),
        }
    }

    pub fn id(&self) -> StrategyId {
        StrategyId::derive(self.name(), &self.params())
    }

    /// Whether encoded output refers to entries stored outside the record.
    pub fn has_side_storage(&self) -> bool {
        matches!(self, Strategy::Chunking(_))
    }

    pub async fn encode(&self, ctx: &mut PipelineContext, payload: &str) -> Result<String, StoreError> {
        match self {
            Strategy::Encoding(s) => Ok(s.encode(payload)),
            Strategy::Compression(s) => s.encode(payload),
            Strategy::Encryption(s) => s.encode(payload),
            Strategy::Chunking(s) => s.encode(ctx, payload).await,
        }
    }

    pub async fn decode(&self, ctx: &PipelineContext, encoded: &str) -> Result<String, StoreError> {
        match self {
            Strategy::Encoding(s) => s.decode(encoded),
            Strategy::Compression(s) => s.decode(encoded),
            Strategy::Encryption(s) => s.decode(encoded),
            Strategy::Chunking(s) => s.decode(ctx, encoded).await,
        }
    }

    /// Sub-keys stored outside the record that `encoded` refers to.
    pub fn side_keys(&self, ctx: &PipelineContext, encoded: &str) -> Result<Vec<String>, StoreError> {
        match self {
            Strategy::Chunking(s) => s.side_keys(ctx, encoded),
            _ => Ok(Vec::new()),
        }
    }
}

impl From<EncodingStrategy> for Strategy {
    fn from(s: EncodingStrategy) -> Self {
        Strategy::Encoding(s)
    }
}

impl From<CompressionStrategy> for Strategy {
    fn from(s: CompressionStrategy) -> Self {
        Strategy::Compression(s)
    }
}

impl From<EncryptionStrategy> for Strategy {
    fn from(s: EncryptionStrategy) -> Self {
        Strategy::Encryption(s)
    }
}

impl From<ChunkingStrategy> for Strategy {
    fn from(s: ChunkingStrategy) -> Self {
        Strategy::Chunking(s)
    }
}
