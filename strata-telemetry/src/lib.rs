//! Tracing initialization for strata binaries and tests.

pub mod tracing;
