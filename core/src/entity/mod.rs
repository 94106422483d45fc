//! Property entities: values stored through strategy pipelines.
//!
//! Responsibilities:
//! - Name backend entries from typed entity arguments
//! - Encode values through the active pipeline and record the identifiers used
//! - Decode records through their stored identifiers
//! - Release chunk entries on overwrite and delete
//!
//! Non-responsibilities:
//! - Schema validation of business payloads
//! - Locking across concurrent writers

pub mod naming;
pub mod record;
pub mod pipeline;
pub mod property;

pub use naming::{FixedName, FormDataNaming, FormRef, PropertyNaming};
pub use record::StoredRecord;
pub use pipeline::{collect_side_keys, decode_pipeline, encode_pipeline, release_side_keys};
pub use property::PropertyEntity;
