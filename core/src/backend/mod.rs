//! Backend capability consumed by the codec.
//!
//! Responsibilities:
//! - Define the async get/set/delete contract over `(key, sub_key)`
//! - Provide an in-memory implementation with a per-entry size cap
//!
//! Non-responsibilities:
//! - Retries
//! - Cross-key transactions

pub mod types;
pub mod memory;

pub use types::{Backend, BackendError};
pub use memory::MemoryBackend;
