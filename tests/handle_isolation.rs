//! Copies and ring snapshots are isolated from each other

mod common;

use common::{commit_tagged, setup};
use proptest::prelude::*;
use statedb::{Database, Hash, Trie, TrieHandle, EMPTY_ROOT};
use std::collections::BTreeMap;

fn contents(trie: &TrieHandle) -> Vec<(Hash, Vec<u8>)> {
    trie.node_iterator(&[]).map(|(k, v)| (k, v.to_vec())).collect()
}

#[test]
fn test_copy_mutation_does_not_leak_into_original() {
    let (_store, db) = setup();
    let mut original = db.open_trie(EMPTY_ROOT).unwrap();
    original.try_update(b"k", b"v1").unwrap();

    let mut copy = db.copy_trie(&original);
    copy.try_update(b"k", b"v2").unwrap();
    copy.try_delete(b"k").unwrap();
    copy.try_update(b"other", b"x").unwrap();

    assert_eq!(original.try_get(b"k").unwrap(), Some(b"v1".to_vec()));
    assert_eq!(original.try_get(b"other").unwrap(), None);
}

#[test]
fn test_original_mutation_does_not_leak_into_copy() {
    let (_store, db) = setup();
    let mut original = db.open_trie(EMPTY_ROOT).unwrap();
    original.try_update(b"k", b"v1").unwrap();

    let copy = db.copy_trie(&original);
    original.try_update(b"k", b"v2").unwrap();

    assert_eq!(copy.try_get(b"k").unwrap(), Some(b"v1".to_vec()));
}

#[test]
fn test_copy_keeps_variant() {
    let (_store, db) = setup();
    let account = db.open_trie(EMPTY_ROOT).unwrap();
    let storage = db.open_storage_trie(Hash([1; 32]), EMPTY_ROOT).unwrap();

    assert!(db.copy_trie(&account).is_cached());
    assert!(!db.copy_trie(&storage).is_cached());
}

#[test]
fn test_copied_storage_trie_commit_bypasses_ring() {
    let (store, db) = setup();
    let storage = db.open_storage_trie(Hash([1; 32]), EMPTY_ROOT).unwrap();

    let mut copy = db.copy_trie(&storage);
    copy.try_update(b"slot", b"1").unwrap();
    copy.commit_to(&*store).unwrap();

    assert!(db.past_roots().is_empty());
}

#[test]
fn test_two_opens_of_same_root_are_independent() {
    let (store, db) = setup();
    let root = commit_tagged(&db, &store, 5);

    let mut first = db.open_trie(root).unwrap();
    let second = db.open_trie(root).unwrap();
    first.try_update(b"tag", b"changed").unwrap();

    assert_eq!(second.try_get(b"tag").unwrap(), Some(5u32.to_be_bytes().to_vec()));
    assert_eq!(second.hash(), root);
}

#[test]
fn test_mutating_reopened_trie_does_not_corrupt_ring() {
    let (store, db) = setup();
    let root = commit_tagged(&db, &store, 5);

    let mut reopened = db.open_trie(root).unwrap();
    reopened.try_delete(b"tag").unwrap();
    drop(reopened);

    store.reset_counters();
    let again = db.open_trie(root).unwrap();
    assert_eq!(store.gets(), 0);
    assert_eq!(again.hash(), root);
    assert_eq!(again.try_get(b"tag").unwrap(), Some(5u32.to_be_bytes().to_vec()));
}

#[derive(Debug, Clone)]
enum Op {
    Update(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let key = prop::collection::vec(any::<u8>(), 1..4);
    let value = prop::collection::vec(any::<u8>(), 1..8);
    prop_oneof![
        (key.clone(), value).prop_map(|(k, v)| Op::Update(k, v)),
        key.prop_map(Op::Delete),
    ]
}

fn apply(trie: &mut TrieHandle, model: &mut BTreeMap<Vec<u8>, Vec<u8>>, op: &Op) {
    match op {
        Op::Update(k, v) => {
            trie.try_update(k, v).unwrap();
            model.insert(k.clone(), v.clone());
        }
        Op::Delete(k) => {
            trie.try_delete(k).unwrap();
            model.remove(k);
        }
    }
}

fn matches_model(trie: &TrieHandle, model: &BTreeMap<Vec<u8>, Vec<u8>>) -> bool {
    model
        .iter()
        .all(|(k, v)| trie.try_get(k).unwrap().as_ref() == Some(v))
        && contents(trie).len() == model.len()
}

proptest! {
    #[test]
    fn prop_copies_are_isolated(
        base in prop::collection::vec(op_strategy(), 0..20),
        on_original in prop::collection::vec(op_strategy(), 0..20),
        on_copy in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let (_store, db) = setup();
        let mut original = db.open_trie(EMPTY_ROOT).unwrap();
        let mut original_model = BTreeMap::new();
        for op in &base {
            apply(&mut original, &mut original_model, op);
        }

        let mut copy = db.copy_trie(&original);
        let mut copy_model = original_model.clone();

        for op in &on_copy {
            apply(&mut copy, &mut copy_model, op);
        }
        for op in &on_original {
            apply(&mut original, &mut original_model, op);
        }

        prop_assert!(matches_model(&original, &original_model));
        prop_assert!(matches_model(&copy, &copy_model));
    }

    #[test]
    fn prop_ring_never_exceeds_capacity(commits in 0u32..40) {
        let (store, db) = setup();
        for i in 0..commits {
            commit_tagged(&db, &store, i);
            prop_assert!(db.past_roots().len() <= 12);
        }
        prop_assert_eq!(db.past_roots().len(), commits.min(12) as usize);
    }
}
