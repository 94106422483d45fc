use serde::{Deserialize, Serialize};

use crate::strategy::StrategyId;
use crate::types::StoreError;

/// What lands under a property name.
///
/// `strategy_ids` lists the pipeline in encode order and is the only input to
/// decoding; the entity's current pipeline plays no part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub payload: String,
    pub strategy_ids: Vec<StrategyId>,
}

impl StoredRecord {
    pub fn new(payload: String, strategy_ids: Vec<StrategyId>) -> Self {
        Self { payload, strategy_ids }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::MalformedRecord(e.to_string()))
    }
}
