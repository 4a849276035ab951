//! Cache store implementations.
//!
//! Available backends:
//! - `MemoryCacheStore` - in-memory, for tests and one-shot runs
//! - `FileCacheStore` - JSON files under an injected directory

pub mod file;
pub mod memory;

pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;
