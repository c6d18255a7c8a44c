//! Merkle trie contract and the in-memory secure trie engine
//!
//! The caching database treats the trie as a collaborator: it opens one at a
//! root, hands it to the caller, and watches the commit. Everything the
//! caller does in between goes through [`Trie`].

pub mod node;
pub mod secure;

pub use secure::SecureTrie;

use crate::core::error::Result;
use crate::core::hash::Hash;
use crate::core::kv::KeyValueWriter;
use std::collections::btree_map;

/// Root hash of a trie with no entries
pub const EMPTY_ROOT: Hash = Hash::ZERO;

/// Operations available on an open trie handle
pub trait Trie {
    /// Value stored under `key`, `None` if absent
    fn try_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Associate `value` with `key`. An empty value deletes the key.
    fn try_update(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    fn try_delete(&mut self, key: &[u8]) -> Result<()>;

    /// Write the trie's nodes through `writer` and return the new root
    fn commit_to(&mut self, writer: &dyn KeyValueWriter) -> Result<Hash>;

    /// Current root hash, including uncommitted changes
    fn hash(&self) -> Hash;

    /// Ordered iteration over `(hashed_key, value)` pairs starting at the
    /// first hashed key greater than or equal to `start`
    fn node_iterator(&self, start: &[u8]) -> NodeIterator<'_>;

    /// Preimage of a hashed key, if still held in memory
    fn get_key(&self, hashed_key: &[u8]) -> Option<Vec<u8>>;
}

/// Ordered walk over a trie's leaves
pub struct NodeIterator<'a> {
    range: btree_map::Range<'a, Hash, Vec<u8>>,
    start: Vec<u8>,
}

impl<'a> NodeIterator<'a> {
    pub(crate) fn new(range: btree_map::Range<'a, Hash, Vec<u8>>, start: &[u8]) -> Self {
        NodeIterator {
            range,
            start: start.to_vec(),
        }
    }
}

impl<'a> Iterator for NodeIterator<'a> {
    type Item = (Hash, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        for (key, value) in self.range.by_ref() {
            // Range was seeded from a 32-byte lower bound; longer start keys
            // still need the slice comparison
            if key.as_bytes() >= self.start.as_slice() {
                return Some((*key, value.as_slice()));
            }
        }
        None
    }
}
