//! Shared cache bookkeeping for the caching database
//!
//! The snapshot ring and the code size memo live together behind a single
//! mutex. Only bookkeeping happens under it: trie loads, trie copies and
//! store reads all run with the lock released.

pub mod code_size;
pub mod past_tries;

pub use code_size::CodeSizeCache;
pub use past_tries::PastTries;

use crate::core::trie::SecureTrie;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Committed snapshots are shared read-only between the ring and lookups
pub(crate) type Snapshot = Arc<SecureTrie>;

/// Everything guarded by the caching database's lock
pub(crate) struct CacheState {
    pub past_tries: PastTries<Snapshot>,
    pub code_sizes: CodeSizeCache,
}

pub(crate) type SharedCache = Arc<Mutex<CacheState>>;

impl CacheState {
    pub fn new(max_past_tries: usize, code_size_capacity: NonZeroUsize) -> Self {
        CacheState {
            past_tries: PastTries::new(max_past_tries),
            code_sizes: CodeSizeCache::new(code_size_capacity),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let (trie_hits, trie_misses) = self.past_tries.stats();
        let (code_size_hits, code_size_misses) = self.code_sizes.stats();
        CacheStats {
            past_tries: self.past_tries.len(),
            past_tries_capacity: self.past_tries.capacity(),
            trie_hits,
            trie_misses,
            code_sizes: self.code_sizes.len(),
            code_sizes_capacity: self.code_sizes.capacity(),
            code_size_hits,
            code_size_misses,
        }
    }
}

/// Caching database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Snapshots currently held in the ring
    pub past_tries: usize,
    pub past_tries_capacity: usize,
    /// Account-trie opens served from the ring
    pub trie_hits: u64,
    /// Account-trie opens that went to the store
    pub trie_misses: u64,
    /// Entries in the code size memo
    pub code_sizes: usize,
    pub code_sizes_capacity: usize,
    pub code_size_hits: u64,
    pub code_size_misses: u64,
}

impl CacheStats {
    /// Ring hit rate as a percentage
    pub fn trie_hit_rate(&self) -> f64 {
        hit_rate(self.trie_hits, self.trie_misses)
    }

    /// Code size memo hit rate as a percentage
    pub fn code_size_hit_rate(&self) -> f64 {
        hit_rate(self.code_size_hits, self.code_size_misses)
    }
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        (hits as f64 / total as f64) * 100.0
    }
}
