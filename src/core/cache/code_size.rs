//! LRU memo of contract code sizes
//!
//! Lets repeated code size queries skip reading the whole bytecode blob.

use crate::core::hash::Hash;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Code hash to byte length, least-recently-used eviction
pub struct CodeSizeCache {
    cache: LruCache<Hash, usize>,
    hits: u64,
    misses: u64,
}

impl CodeSizeCache {
    /// Create a new code size cache with given capacity
    pub fn new(capacity: NonZeroUsize) -> Self {
        CodeSizeCache {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Get cached size
    pub fn get(&mut self, code_hash: &Hash) -> Option<usize> {
        let size = self.cache.get(code_hash).copied();
        if size.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        size
    }

    /// Record the size of a code blob
    pub fn put(&mut self, code_hash: Hash, size: usize) {
        self.cache.put(code_hash, size);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// (hits, misses) of `get`
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
