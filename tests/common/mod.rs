//! Shared test stores

#![allow(dead_code)]

use statedb::{
    CachingDb, Database, Hash, KeyValueReader, KeyValueWriter, MemoryStore, Result,
    StateDbError, Trie, EMPTY_ROOT,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

/// Memory store that counts reads and can be told to reject writes
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    has_calls: AtomicUsize,
    puts: AtomicUsize,
    fail_writes: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total store reads (`get` and `has`)
    pub fn reads(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.has_calls.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.gets.store(0, Ordering::SeqCst);
        self.has_calls.store(0, Ordering::SeqCst);
        self.puts.store(0, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a value without touching the counters
    pub fn seed(&self, key: &[u8], value: &[u8]) {
        self.inner.put(key, value).unwrap();
    }
}

impl KeyValueReader for CountingStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn has(&self, key: &[u8]) -> Result<bool> {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.has(key)
    }
}

impl KeyValueWriter for CountingStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StateDbError::Storage("simulated write failure".to_string()));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }
}

/// Writer that rejects every put
pub struct FailingWriter;

impl KeyValueWriter for FailingWriter {
    fn put(&self, _key: &[u8], _value: &[u8]) -> Result<()> {
        Err(StateDbError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk unavailable",
        )))
    }
}

/// Memory store whose `get` of one key parks the reading thread until the
/// test releases it
pub struct GatedStore {
    inner: MemoryStore,
    gated_key: Vec<u8>,
    entered: Barrier,
    released: Barrier,
}

impl GatedStore {
    pub fn new(gated_key: &[u8]) -> Self {
        GatedStore {
            inner: MemoryStore::new(),
            gated_key: gated_key.to_vec(),
            entered: Barrier::new(2),
            released: Barrier::new(2),
        }
    }

    /// Block until a reader is parked on the gated key
    pub fn wait_for_reader(&self) {
        self.entered.wait();
    }

    /// Let the parked reader finish its `get`
    pub fn release_reader(&self) {
        self.released.wait();
    }
}

impl KeyValueReader for GatedStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        if key == self.gated_key.as_slice() {
            self.entered.wait();
            self.released.wait();
        }
        self.inner.get(key)
    }

    fn has(&self, key: &[u8]) -> Result<bool> {
        self.inner.has(key)
    }
}

impl KeyValueWriter for GatedStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.put(key, value)
    }
}

/// Store that reports every key as present but whose reads fail, as when a
/// value is deleted or the backend errors between `has` and `get`
pub struct VanishingStore {
    backend_error: bool,
}

impl VanishingStore {
    /// `get` reports `NotFound`
    pub fn deleted() -> Self {
        VanishingStore {
            backend_error: false,
        }
    }

    /// `get` reports a backend `Storage` error
    pub fn failing() -> Self {
        VanishingStore {
            backend_error: true,
        }
    }
}

impl KeyValueReader for VanishingStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        if self.backend_error {
            Err(StateDbError::Storage("read timed out".to_string()))
        } else {
            Err(StateDbError::not_found(key))
        }
    }

    fn has(&self, _key: &[u8]) -> Result<bool> {
        Ok(true)
    }
}

impl KeyValueWriter for VanishingStore {
    fn put(&self, _key: &[u8], _value: &[u8]) -> Result<()> {
        Ok(())
    }
}

pub fn setup() -> (Arc<CountingStore>, CachingDb) {
    let store = Arc::new(CountingStore::new());
    let db = CachingDb::new(store.clone());
    (store, db)
}

/// Commit a fresh account trie holding a single `tag` entry and return its root
pub fn commit_tagged(db: &CachingDb, store: &CountingStore, tag: u32) -> Hash {
    let mut trie = db.open_trie(EMPTY_ROOT).unwrap();
    trie.try_update(b"tag", &tag.to_be_bytes()).unwrap();
    trie.commit_to(store).unwrap()
}
