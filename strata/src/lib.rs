//! Incremental extract/transform/load core for a dimensionally-modeled
//! warehouse.
//!
//! The pipeline moves changed rows from an operational Postgres database
//! into a star-schema warehouse through an object-storage staging area:
//! watermark-based change capture, dimensional reshaping, and a
//! self-extending calendar dimension.

pub mod dates;
pub mod error;
pub mod extract;
pub mod load;
pub mod macros;
pub mod pipeline;
pub mod schema;
pub mod secrets;
pub mod source;
pub mod staging;
pub mod store;
pub mod transform;
pub mod types;
