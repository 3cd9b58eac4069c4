//! Configuration loading and shared configuration types for the strata
//! pipeline.
//!
//! Configuration is assembled from `configuration/base.(yaml|yml|json)`, an
//! environment-specific overlay, and `APP_`-prefixed environment variables.

mod environment;
mod load;

pub mod shared;

pub use environment::Environment;
pub use load::{Config, LoadConfigError, load_config};
