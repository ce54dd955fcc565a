//! Key-value persistence adapters for the scan ledger.
//!
//! - [`InMemoryKeyValueStore`]: process-local map, for tests and embedding.
//! - [`FileKeyValueStore`]: one file per key under a directory, written
//!   atomically through the `blob-store` crate.

mod file_store;
mod memory_store;

pub use file_store::FileKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
