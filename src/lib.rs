//! # statedb - Caching State Database
//!
//! `statedb` sits between a chain's state-execution logic and its
//! content-addressed key-value store. It hands out:
//!
//! - **Account trie handles** that remember themselves on commit, so the
//!   last few committed states reopen without a store round trip
//! - **Storage trie handles**, one per account, always loaded fresh
//! - **Contract artifacts**: bytecode, bytecode size (memoized), interface
//!   metadata and asset blobs
//!
//! ## Quick Start
//!
//! ```rust
//! use statedb::{
//!     CachingDb, Database, Hash, KeyValueStore, KeyValueWriter, MemoryStore, Trie, EMPTY_ROOT,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> statedb::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let db = CachingDb::new(store.clone());
//!
//! // Build and commit a state
//! let mut state = db.open_trie(EMPTY_ROOT)?;
//! state.try_update(b"account-1", b"balance=10")?;
//! let root = state.commit_to(store.as_writer())?;
//!
//! // A reorg back to `root` is served from memory
//! let reopened = db.open_trie(root)?;
//! assert_eq!(reopened.hash(), root);
//!
//! // Contract code size is read once, then memoized
//! let code_hash = Hash::digest(b"bytecode");
//! store.put(code_hash.as_bytes(), b"bytecode")?;
//! assert_eq!(db.contract_code_size(Hash::ZERO, code_hash)?, 8);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 CachingDb                    │
//! │  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │ PastTries (FIFO) │  │ CodeSizeCache    │  │
//! │  │ last 12 commits  │  │ LRU, 100k sizes  │  │
//! │  └──────────────────┘  └──────────────────┘  │
//! │          one mutex, bookkeeping only         │
//! ├──────────────────────────────────────────────┤
//! │  TrieHandle::Cached ── commit ──► PastTries  │
//! │  TrieHandle::Raw    (storage tries)          │
//! ├──────────────────────────────────────────────┤
//! │  SecureTrie  ◄──►  KeyValueStore             │
//! └──────────────────────────────────────────────┘
//! ```

pub mod core;

pub use crate::core::{
    cache::{CacheStats, CodeSizeCache, PastTries},
    config::{DatabaseConfig, CODE_SIZE_CACHE_SIZE, MAX_PAST_TRIES, MAX_TRIE_CACHE_GEN},
    database::{abi_key, CachingDb, Database, ABI_KEY_SUFFIX},
    error::{Result, StateDbError},
    handle::{CachedTrie, TrieHandle},
    hash::{Hash, HASH_LENGTH},
    kv::{KeyValueReader, KeyValueStore, KeyValueWriter, MemoryStore},
    trie::{
        node::{preimage_key, PREIMAGE_PREFIX},
        NodeIterator, SecureTrie, Trie, EMPTY_ROOT,
    },
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
