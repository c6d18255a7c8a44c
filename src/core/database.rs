//! Caching state database
//!
//! Gives the execution layer trie handles and contract artifacts on top of a
//! content-addressed store, remembering recently committed account tries so
//! a shallow reorg can reopen them without a store round trip.

use crate::core::cache::{CacheState, CacheStats, SharedCache};
use crate::core::config::{DatabaseConfig, CODE_SIZE_CACHE_SIZE};
use crate::core::error::{Result, StateDbError};
use crate::core::handle::{CachedTrie, TrieHandle};
use crate::core::hash::Hash;
use crate::core::kv::KeyValueStore;
use crate::core::trie::SecureTrie;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, trace};

/// Suffix appended to a code hash to form its interface metadata key
pub const ABI_KEY_SUFFIX: &[u8] = b"_abi";

/// Store key for the interface metadata (ABI) of `code_hash`
///
/// Anything writing ABI blobs must derive keys with this function.
pub fn abi_key(code_hash: &Hash) -> Vec<u8> {
    let mut key = Vec::with_capacity(code_hash.0.len() + ABI_KEY_SUFFIX.len());
    key.extend_from_slice(code_hash.as_bytes());
    key.extend_from_slice(ABI_KEY_SUFFIX);
    key
}

/// Access to tries and contract artifacts
pub trait Database: Send + Sync {
    /// Open the main account trie
    fn open_trie(&self, root: Hash) -> Result<TrieHandle>;

    /// Open the storage trie of an account
    fn open_storage_trie(&self, addr_hash: Hash, root: Hash) -> Result<TrieHandle>;

    /// Independent copy of the given trie
    fn copy_trie(&self, trie: &TrieHandle) -> TrieHandle;

    fn contract_code(&self, addr_hash: Hash, code_hash: Hash) -> Result<Vec<u8>>;

    fn contract_code_size(&self, addr_hash: Hash, code_hash: Hash) -> Result<usize>;

    /// Interface metadata of a contract
    ///
    /// `Ok(None)` when nothing is stored under the ABI key, `Ok(Some(""))`
    /// when an empty blob is stored.
    fn contract_abi(&self, addr_hash: Hash, code_hash: Hash) -> Result<Option<String>>;

    fn asset_data(&self, addr_hash: Hash, asset_hash: Hash) -> Result<Vec<u8>>;
}

/// [`Database`] backed by a key-value store, with a ring of recently
/// committed account tries and an LRU of code sizes
///
/// Safe for concurrent use. Build one per store at startup and share it by
/// reference or `Arc`.
///
/// # Examples
///
/// ```
/// use statedb::{CachingDb, Database, KeyValueStore, MemoryStore, Trie, EMPTY_ROOT};
/// use std::sync::Arc;
///
/// # fn main() -> statedb::Result<()> {
/// let store = Arc::new(MemoryStore::new());
/// let db = CachingDb::new(store.clone());
///
/// let mut trie = db.open_trie(EMPTY_ROOT)?;
/// trie.try_update(b"alice", b"100")?;
/// let root = trie.commit_to(store.as_writer())?;
///
/// // Served from the snapshot ring
/// let reopened = db.open_trie(root)?;
/// assert_eq!(reopened.try_get(b"alice")?, Some(b"100".to_vec()));
/// # Ok(())
/// # }
/// ```
pub struct CachingDb {
    db: Arc<dyn KeyValueStore>,
    cache: SharedCache,
    config: DatabaseConfig,
}

/// Code size memo capacity of the default configuration
const DEFAULT_CODE_SIZE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(CODE_SIZE_CACHE_SIZE) {
    Some(capacity) => capacity,
    None => panic!("CODE_SIZE_CACHE_SIZE must be greater than 0"),
};

impl CachingDb {
    /// Create a caching database with the default configuration
    pub fn new(db: Arc<dyn KeyValueStore>) -> Self {
        Self::build(db, DatabaseConfig::default(), DEFAULT_CODE_SIZE_CAPACITY)
    }

    /// Create a caching database with a validated configuration
    pub fn with_config(db: Arc<dyn KeyValueStore>, config: DatabaseConfig) -> Result<Self> {
        config.validate()?;
        let code_size_capacity = NonZeroUsize::new(config.code_size_cache_size).ok_or_else(
            || StateDbError::Config("code_size_cache_size must be greater than 0".to_string()),
        )?;
        Ok(Self::build(db, config, code_size_capacity))
    }

    fn build(
        db: Arc<dyn KeyValueStore>,
        config: DatabaseConfig,
        code_size_capacity: NonZeroUsize,
    ) -> Self {
        debug!(
            "Caching database: {} past tries, {} code sizes, trie cache gen {}",
            config.max_past_tries, code_size_capacity, config.trie_cache_gen
        );

        CachingDb {
            db,
            cache: Arc::new(Mutex::new(CacheState::new(
                config.max_past_tries,
                code_size_capacity,
            ))),
            config,
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Roots held in the snapshot ring, oldest first
    pub fn past_roots(&self) -> Vec<Hash> {
        self.cache.lock().past_tries.roots()
    }

    fn wrap(&self, trie: SecureTrie) -> TrieHandle {
        TrieHandle::Cached(CachedTrie::new(trie, Arc::clone(&self.cache)))
    }
}

impl Database for CachingDb {
    fn open_trie(&self, root: Hash) -> Result<TrieHandle> {
        let cached = self.cache.lock().past_tries.find(&root);
        if let Some(snapshot) = cached {
            debug!("Opened trie {} from past tries", root);
            return Ok(self.wrap(snapshot.copy()));
        }

        debug!("Loading trie {} from store", root);
        let trie = SecureTrie::new(root, self.db.as_reader(), self.config.trie_cache_gen)?;
        Ok(self.wrap(trie))
    }

    fn open_storage_trie(&self, addr_hash: Hash, root: Hash) -> Result<TrieHandle> {
        trace!("Opening storage trie {} of account {}", root, addr_hash);
        let trie = SecureTrie::new(root, self.db.as_reader(), 0)?;
        Ok(TrieHandle::Raw(trie))
    }

    fn copy_trie(&self, trie: &TrieHandle) -> TrieHandle {
        trie.copy()
    }

    fn contract_code(&self, _addr_hash: Hash, code_hash: Hash) -> Result<Vec<u8>> {
        let code = self.db.get(code_hash.as_bytes())?;
        self.cache.lock().code_sizes.put(code_hash, code.len());
        Ok(code)
    }

    fn contract_code_size(&self, addr_hash: Hash, code_hash: Hash) -> Result<usize> {
        let cached = self.cache.lock().code_sizes.get(&code_hash);
        if let Some(size) = cached {
            trace!("Code size of {} served from cache", code_hash);
            return Ok(size);
        }
        let code = self.contract_code(addr_hash, code_hash)?;
        Ok(code.len())
    }

    fn contract_abi(&self, _addr_hash: Hash, code_hash: Hash) -> Result<Option<String>> {
        let key = abi_key(&code_hash);
        if !self.db.has(&key)? {
            return Ok(None);
        }

        match self.db.get(&key) {
            Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                StateDbError::Decode(format!("ABI of {} is not valid UTF-8: {}", code_hash, e))
            }),
            // Removed between the existence check and the read
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn asset_data(&self, _addr_hash: Hash, asset_hash: Hash) -> Result<Vec<u8>> {
        self.db.get(asset_hash.as_bytes())
    }
}
