//! Base64 text encoding of the payload's UTF-8 bytes.

use base64::engine::general_purpose::{GeneralPurpose, STANDARD, URL_SAFE};
use base64::Engine;

use crate::constants::strategy_names;
use crate::strategy::types::StrategyParams;
use crate::types::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodingParams {
    /// Use the URL-safe alphabet instead of the standard one.
    pub url_safe: bool,
}

#[derive(Debug, Clone)]
pub struct EncodingStrategy {
    params: EncodingParams,
}

impl EncodingStrategy {
    pub const NAME: &'static str = strategy_names::ENCODING;

    pub fn new(params: EncodingParams) -> Self {
        Self { params }
    }

    /// Standard alphabet, padded.
    pub fn standard() -> Self {
        Self::new(EncodingParams::default())
    }

    pub fn params(&self) -> StrategyParams {
        StrategyParams::new().with("urlSafe", self.params.url_safe)
    }

    fn engine(&self) -> GeneralPurpose {
        if self.params.url_safe { URL_SAFE } else { STANDARD }
    }

    pub fn encode(&self, payload: &str) -> String {
        self.engine().encode(payload.as_bytes())
    }

    pub fn decode(&self, encoded: &str) -> Result<String, StoreError> {
        let bytes = self
            .engine()
            .decode(encoded)
            .map_err(|e| StoreError::codec(Self::NAME, e))?;
        String::from_utf8(bytes).map_err(|e| StoreError::codec(Self::NAME, e))
    }
}
