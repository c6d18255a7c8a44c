//! Trie node encoding and Merkle root computation
//!
//! A committed trie is a single node holding its sorted leaves and the key
//! preimages still resident at commit time, stored under its root hash.
//! Every preimage is also written on its own, see [`preimage_key`].

use crate::core::error::{Result, StateDbError};
use crate::core::hash::Hash;
use crate::core::trie::EMPTY_ROOT;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Store key prefix for secure-trie key preimages
pub const PREIMAGE_PREFIX: &[u8] = b"secure-key-";

const LEAF_TAG: u8 = 0x00;
const BRANCH_TAG: u8 = 0x01;

/// Store key under which the preimage of `hashed_key` is written
pub fn preimage_key(hashed_key: &Hash) -> Vec<u8> {
    let mut key = Vec::with_capacity(PREIMAGE_PREFIX.len() + hashed_key.0.len());
    key.extend_from_slice(PREIMAGE_PREFIX);
    key.extend_from_slice(hashed_key.as_bytes());
    key
}

/// Serialized form of a committed trie
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TrieNode {
    pub leaves: Vec<(Hash, Vec<u8>)>,
    /// Hashed key to original key, sorted by hashed key
    pub preimages: Vec<(Hash, Vec<u8>)>,
}

/// Contents of a node whose root and preimages have been checked
#[derive(Debug, PartialEq)]
pub(crate) struct DecodedNode {
    pub leaves: BTreeMap<Hash, Vec<u8>>,
    pub preimages: HashMap<Hash, Vec<u8>>,
}

impl TrieNode {
    pub fn new<'a, I>(leaves: &BTreeMap<Hash, Vec<u8>>, preimages: I) -> Self
    where
        I: IntoIterator<Item = (Hash, &'a [u8])>,
    {
        let mut preimages: Vec<(Hash, Vec<u8>)> = preimages
            .into_iter()
            .map(|(hashed, key)| (hashed, key.to_vec()))
            .collect();
        preimages.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        TrieNode {
            leaves: leaves.iter().map(|(k, v)| (*k, v.clone())).collect(),
            preimages,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| StateDbError::Decode(e.to_string()))
    }

    /// Decode a node and check it hashes to `root`
    ///
    /// Preimages are not covered by the root, so each one must hash to its
    /// key and belong to a leaf of the node.
    pub fn decode(root: &Hash, bytes: &[u8]) -> Result<DecodedNode> {
        let node: TrieNode = bincode::deserialize(bytes)?;

        let mut leaves = BTreeMap::new();
        for (key, value) in node.leaves {
            if value.is_empty() {
                return Err(StateDbError::Decode(format!(
                    "empty leaf value for {} in node {}",
                    key, root
                )));
            }
            if leaves.insert(key, value).is_some() {
                return Err(StateDbError::Decode(format!(
                    "duplicate leaf {} in node {}",
                    key, root
                )));
            }
        }

        let computed = merkle_root(&leaves);
        if computed != *root {
            return Err(StateDbError::Decode(format!(
                "node hashes to {} but was stored under {}",
                computed, root
            )));
        }

        let mut preimages = HashMap::with_capacity(node.preimages.len());
        for (hashed, key) in node.preimages {
            if Hash::digest(&key) != hashed || !leaves.contains_key(&hashed) {
                return Err(StateDbError::Decode(format!(
                    "preimage for {} does not match a leaf of node {}",
                    hashed, root
                )));
            }
            preimages.insert(hashed, key);
        }

        Ok(DecodedNode { leaves, preimages })
    }
}

/// Binary Merkle root over sorted leaves. An odd node at the end of a level
/// is promoted unchanged.
pub fn merkle_root(leaves: &BTreeMap<Hash, Vec<u8>>) -> Hash {
    if leaves.is_empty() {
        return EMPTY_ROOT;
    }

    let mut level: Vec<Hash> = leaves
        .iter()
        .map(|(key, value)| {
            Hash::digest_parts(&[&[LEAF_TAG][..], key.as_bytes(), value.as_slice()])
        })
        .collect();

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => {
                    Hash::digest_parts(&[&[BRANCH_TAG][..], left.as_bytes(), right.as_bytes()])
                }
                [single] => *single,
                _ => unreachable!("chunks(2) yields one or two elements"),
            })
            .collect();
    }
    level[0]
}
