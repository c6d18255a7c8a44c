//! Key-value store contract
//!
//! The caching database only needs point reads, an existence check and the
//! write path trie commits go through. Durability is the store's business.

pub mod memory;

pub use memory::MemoryStore;

use crate::core::error::Result;

/// Read side of a content-addressed store
pub trait KeyValueReader {
    /// Fetch the value under `key`, failing with `NotFound` when absent
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;

    /// Check whether `key` is present
    fn has(&self, key: &[u8]) -> Result<bool>;
}

/// Write side used by trie commits
pub trait KeyValueWriter {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
}

/// Store shared by every handle opened through one caching database
pub trait KeyValueStore: KeyValueReader + KeyValueWriter + Send + Sync {
    fn as_reader(&self) -> &dyn KeyValueReader;

    fn as_writer(&self) -> &dyn KeyValueWriter;
}

impl<T: KeyValueReader + KeyValueWriter + Send + Sync> KeyValueStore for T {
    fn as_reader(&self) -> &dyn KeyValueReader {
        self
    }

    fn as_writer(&self) -> &dyn KeyValueWriter {
        self
    }
}
