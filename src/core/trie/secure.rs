//! Secure (key-hashing) trie
//!
//! Keys are hashed with SHA-256 before insertion so the trie's shape does
//! not depend on caller-chosen key order. Preimages are kept in memory for
//! [`Trie::get_key`], written to the store on commit and carried in the
//! committed node while resident, so a trie loaded from the store answers
//! `get_key` like the handle that committed it.

use super::node::{merkle_root, preimage_key, TrieNode};
use super::{NodeIterator, Trie, EMPTY_ROOT};
use crate::core::error::Result;
use crate::core::hash::Hash;
use crate::core::kv::{KeyValueReader, KeyValueWriter};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct Preimage {
    key: Vec<u8>,
    /// Commit generation in which the key was last written
    generation: u64,
    /// Not yet written to the store
    dirty: bool,
}

impl Preimage {
    /// Whether the preimage stays in memory once the commit generation
    /// reaches `generation`
    fn resident_at(&self, generation: u64, cache_limit: u16) -> bool {
        cache_limit == 0 || generation - self.generation < u64::from(cache_limit)
    }
}

/// In-memory secure Merkle trie
///
/// `Clone` produces a fully independent copy.
#[derive(Debug, Clone)]
pub struct SecureTrie {
    leaves: BTreeMap<Hash, Vec<u8>>,
    preimages: HashMap<Hash, Preimage>,
    /// Number of successful commits on this handle
    generation: u64,
    /// Commits a clean preimage may stay resident without being rewritten.
    /// Zero keeps everything.
    cache_limit: u16,
}

impl SecureTrie {
    /// Open the trie rooted at `root`
    ///
    /// The empty root needs no store access. Any other root is read from
    /// `reader`; a missing node surfaces as `NotFound` and a malformed one
    /// as `Decode`.
    pub fn new(root: Hash, reader: &dyn KeyValueReader, cache_limit: u16) -> Result<Self> {
        let mut trie = SecureTrie::empty(cache_limit);
        if root == EMPTY_ROOT {
            return Ok(trie);
        }

        let bytes = reader.get(root.as_bytes())?;
        let node = TrieNode::decode(&root, &bytes)?;
        trie.leaves = node.leaves;
        trie.preimages = node
            .preimages
            .into_iter()
            .map(|(hashed, key)| {
                let preimage = Preimage {
                    key,
                    generation: 0,
                    dirty: false,
                };
                (hashed, preimage)
            })
            .collect();
        debug!(
            "Loaded trie {} with {} leaves, {} preimages",
            root,
            trie.leaves.len(),
            trie.preimages.len()
        );
        Ok(trie)
    }

    /// A new empty trie
    pub fn empty(cache_limit: u16) -> Self {
        SecureTrie {
            leaves: BTreeMap::new(),
            preimages: HashMap::new(),
            generation: 0,
            cache_limit,
        }
    }

    /// Independent copy of this trie
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn cache_limit(&self) -> u16 {
        self.cache_limit
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Number of key preimages currently held in memory
    pub fn resident_preimages(&self) -> usize {
        self.preimages.len()
    }

    fn hash_key(key: &[u8]) -> Hash {
        Hash::digest(key)
    }

    fn release_preimages(&mut self) {
        let (generation, cache_limit) = (self.generation, self.cache_limit);
        let before = self.preimages.len();
        self.preimages
            .retain(|_, p| p.resident_at(generation, cache_limit));
        let released = before - self.preimages.len();
        if released > 0 {
            trace!(
                "Released {} preimages at generation {}",
                released,
                generation
            );
        }
    }
}

impl Trie for SecureTrie {
    fn try_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.leaves.get(&Self::hash_key(key)).cloned())
    }

    fn try_update(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if value.is_empty() {
            return self.try_delete(key);
        }
        let hashed = Self::hash_key(key);
        self.leaves.insert(hashed, value.to_vec());
        self.preimages.insert(
            hashed,
            Preimage {
                key: key.to_vec(),
                generation: self.generation,
                dirty: true,
            },
        );
        Ok(())
    }

    fn try_delete(&mut self, key: &[u8]) -> Result<()> {
        let hashed = Self::hash_key(key);
        self.leaves.remove(&hashed);
        self.preimages.remove(&hashed);
        Ok(())
    }

    fn commit_to(&mut self, writer: &dyn KeyValueWriter) -> Result<Hash> {
        let root = self.hash();
        let next = self.generation + 1;

        for (hashed, preimage) in self.preimages.iter().filter(|(_, p)| p.dirty) {
            writer.put(&preimage_key(hashed), &preimage.key)?;
        }
        if root != EMPTY_ROOT {
            // Only what stays resident after this commit goes into the node
            let resident = self
                .preimages
                .iter()
                .filter(|(_, p)| p.resident_at(next, self.cache_limit))
                .map(|(hashed, p)| (*hashed, p.key.as_slice()));
            let node = TrieNode::new(&self.leaves, resident).encode()?;
            writer.put(root.as_bytes(), &node)?;
        }

        for preimage in self.preimages.values_mut() {
            preimage.dirty = false;
        }
        self.generation = next;
        self.release_preimages();

        debug!("Committed trie {} ({} leaves)", root, self.leaves.len());
        Ok(root)
    }

    fn hash(&self) -> Hash {
        merkle_root(&self.leaves)
    }

    fn node_iterator(&self, start: &[u8]) -> NodeIterator<'_> {
        let mut lower = [0u8; 32];
        let n = start.len().min(32);
        lower[..n].copy_from_slice(&start[..n]);
        NodeIterator::new(self.leaves.range(Hash(lower)..), start)
    }

    fn get_key(&self, hashed_key: &[u8]) -> Option<Vec<u8>> {
        let hashed = Hash::from_slice(hashed_key)?;
        self.preimages.get(&hashed).map(|p| p.key.clone())
    }
}
