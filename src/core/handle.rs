//! Trie handles returned by the caching database
//!
//! A handle is either wired to the snapshot ring ([`CachedTrie`]) or a plain
//! secure trie. The set is closed, so copying a handle is an exhaustive
//! match rather than a runtime type check.

use crate::core::cache::SharedCache;
use crate::core::error::Result;
use crate::core::hash::Hash;
use crate::core::kv::KeyValueWriter;
use crate::core::trie::{NodeIterator, SecureTrie, Trie};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Secure trie that inserts itself into the snapshot ring on commit
pub struct CachedTrie {
    trie: SecureTrie,
    cache: SharedCache,
}

impl CachedTrie {
    pub(crate) fn new(trie: SecureTrie, cache: SharedCache) -> Self {
        CachedTrie { trie, cache }
    }

    /// The wrapped trie
    pub fn inner(&self) -> &SecureTrie {
        &self.trie
    }

    /// Independent copy that still commits into the same ring
    pub fn copy(&self) -> Self {
        CachedTrie {
            trie: self.trie.copy(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl fmt::Debug for CachedTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedTrie")
            .field("trie", &self.trie)
            .finish_non_exhaustive()
    }
}

impl Trie for CachedTrie {
    fn try_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.trie.try_get(key)
    }

    fn try_update(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.trie.try_update(key, value)
    }

    fn try_delete(&mut self, key: &[u8]) -> Result<()> {
        self.trie.try_delete(key)
    }

    fn commit_to(&mut self, writer: &dyn KeyValueWriter) -> Result<Hash> {
        let root = self.trie.commit_to(writer)?;

        // Snapshot before taking the lock; the handle stays mutable
        let snapshot = Arc::new(self.trie.copy());
        let evicted = self.cache.lock().past_tries.push(root, snapshot);

        match evicted {
            Some(old) => debug!("Cached committed trie {} (evicted {})", root, old),
            None => debug!("Cached committed trie {}", root),
        }
        Ok(root)
    }

    fn hash(&self) -> Hash {
        self.trie.hash()
    }

    fn node_iterator(&self, start: &[u8]) -> NodeIterator<'_> {
        self.trie.node_iterator(start)
    }

    fn get_key(&self, hashed_key: &[u8]) -> Option<Vec<u8>> {
        self.trie.get_key(hashed_key)
    }
}

/// Handle onto an account or storage trie
#[derive(Debug)]
pub enum TrieHandle {
    /// Account trie; commits feed the snapshot ring
    Cached(CachedTrie),
    /// Storage trie; bypasses the ring
    Raw(SecureTrie),
}

impl TrieHandle {
    /// Independent copy of the same variant
    pub fn copy(&self) -> Self {
        match self {
            TrieHandle::Cached(t) => TrieHandle::Cached(t.copy()),
            TrieHandle::Raw(t) => TrieHandle::Raw(t.copy()),
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, TrieHandle::Cached(_))
    }

    /// The underlying secure trie of either variant
    pub fn secure_trie(&self) -> &SecureTrie {
        match self {
            TrieHandle::Cached(t) => t.inner(),
            TrieHandle::Raw(t) => t,
        }
    }

    fn as_trie(&self) -> &dyn Trie {
        match self {
            TrieHandle::Cached(t) => t,
            TrieHandle::Raw(t) => t,
        }
    }

    fn as_trie_mut(&mut self) -> &mut dyn Trie {
        match self {
            TrieHandle::Cached(t) => t,
            TrieHandle::Raw(t) => t,
        }
    }
}

impl Trie for TrieHandle {
    fn try_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.as_trie().try_get(key)
    }

    fn try_update(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.as_trie_mut().try_update(key, value)
    }

    fn try_delete(&mut self, key: &[u8]) -> Result<()> {
        self.as_trie_mut().try_delete(key)
    }

    fn commit_to(&mut self, writer: &dyn KeyValueWriter) -> Result<Hash> {
        self.as_trie_mut().commit_to(writer)
    }

    fn hash(&self) -> Hash {
        self.as_trie().hash()
    }

    fn node_iterator(&self, start: &[u8]) -> NodeIterator<'_> {
        self.as_trie().node_iterator(start)
    }

    fn get_key(&self, hashed_key: &[u8]) -> Option<Vec<u8>> {
        self.as_trie().get_key(hashed_key)
    }
}
