//! Object-storage abstraction used by every pipeline stage.

pub mod base;
pub mod fs;
pub mod memory;

pub use base::ObjectStore;
pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
