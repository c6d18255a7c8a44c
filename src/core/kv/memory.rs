//! In-memory key-value store

use super::{KeyValueReader, KeyValueWriter};
use crate::core::error::{Result, StateDbError};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Hash map backed store, safe for concurrent readers and writers
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `key`, returning the previous value if any
    pub fn delete(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueReader for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StateDbError::not_found(key))
    }

    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.entries.read().contains_key(key))
    }
}

impl KeyValueWriter for MemoryStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
