//! Shared configuration types for strata pipelines.

mod connection;
mod dates;
mod pipeline;
mod staging;

pub use connection::{IntoConnectOptions, PgConnectionConfig, TlsConfig, ValidationError};
pub use dates::DateDimensionConfig;
pub use pipeline::{PipelineConfig, default_source_tables};
pub use staging::StagingConfig;
