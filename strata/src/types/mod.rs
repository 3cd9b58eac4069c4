//! Common types used throughout the pipeline.
//!
//! Re-exports the scalar cell type and the frame (column-ordered table)
//! representation used by staging, transformation and loading.

mod cell;
mod frame;

pub use cell::*;
pub use frame::*;
