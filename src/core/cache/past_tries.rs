//! Fixed-capacity FIFO of recently committed tries
//!
//! Keeps the last N committed account-trie snapshots keyed by root so that a
//! shallow reorg can reopen a just-committed state without touching the
//! store. Eviction is strictly oldest-first, lookups do not refresh an entry.

use crate::core::hash::Hash;
use std::collections::VecDeque;

#[derive(Debug)]
struct PastTrie<T> {
    root: Hash,
    snapshot: T,
}

/// Bounded snapshot ring, oldest entry at the front
#[derive(Debug)]
pub struct PastTries<T> {
    entries: VecDeque<PastTrie<T>>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<T: Clone> PastTries<T> {
    /// Create an empty ring holding at most `capacity` snapshots
    ///
    /// # Panics
    /// Panics if capacity is 0
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");

        PastTries {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Append a snapshot, evicting the oldest when full
    ///
    /// # Returns
    /// Root of the evicted snapshot, if any
    pub fn push(&mut self, root: Hash, snapshot: T) -> Option<Hash> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front().map(|e| e.root)
        } else {
            None
        };
        self.entries.push_back(PastTrie { root, snapshot });
        evicted
    }

    /// Most recently pushed snapshot with the given root
    pub fn find(&mut self, root: &Hash) -> Option<T> {
        let found = self
            .entries
            .iter()
            .rev()
            .find(|e| e.root == *root)
            .map(|e| e.snapshot.clone());

        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// True if a snapshot with this root is held. Does not count as a lookup.
    pub fn contains(&self, root: &Hash) -> bool {
        self.entries.iter().any(|e| e.root == *root)
    }

    /// Roots currently held, oldest first
    pub fn roots(&self) -> Vec<Hash> {
        self.entries.iter().map(|e| e.root).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// (hits, misses) of `find`
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
