//! Staging serialization and key layout.
//!
//! Raw snapshots stage as JSON under time-derived keys; transformed tables
//! stage as parquet under the equivalent keys with a `.parquet` suffix.

mod json;
mod parquet;
mod path;

pub use json::{decode_staged, frame_from_json, frame_to_json};
pub use parquet::{frame_from_parquet, frame_to_parquet};
pub use path::{
    by_table_key, by_time_key, run_time_from_key, table_name_from_key, transformed_key,
};
