//! Deflate (zlib wrapper) via flate2, base64 on the way out.
//!
//! Each payload is compressed as its own zlib stream; no state spans calls.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::constants::{strategy_names, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};
use crate::strategy::types::StrategyParams;
use crate::types::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionParams {
    pub level: u32,
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self { level: DEFAULT_COMPRESSION_LEVEL }
    }
}

#[derive(Debug, Clone)]
pub struct CompressionStrategy {
    params: CompressionParams,
}

impl CompressionStrategy {
    pub const NAME: &'static str = strategy_names::COMPRESSION;

    pub fn new(params: CompressionParams) -> Result<Self, StoreError> {
        if params.level > MAX_COMPRESSION_LEVEL {
            return Err(StoreError::InvalidParams(format!(
                "compression level {} outside 0..={}",
                params.level, MAX_COMPRESSION_LEVEL
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> StrategyParams {
        StrategyParams::new().with("level", i64::from(self.params.level))
    }

    pub fn encode(&self, payload: &str) -> Result<String, StoreError> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::new(self.params.level));
        enc.write_all(payload.as_bytes())
            .map_err(|e| StoreError::codec(Self::NAME, e))?;
        let compressed = enc.finish().map_err(|e| StoreError::codec(Self::NAME, e))?;
        Ok(STANDARD.encode(compressed))
    }

    pub fn decode(&self, encoded: &str) -> Result<String, StoreError> {
        let compressed = STANDARD
            .decode(encoded)
            .map_err(|e| StoreError::codec(Self::NAME, e))?;

        let mut dec = ZlibDecoder::new(compressed.as_slice());
        let mut out = String::new();
        dec.read_to_string(&mut out)
            .map_err(|e| StoreError::codec(Self::NAME, e))?;
        Ok(out)
    }
}
