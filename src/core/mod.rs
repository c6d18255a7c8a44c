pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod handle;
pub mod hash;
pub mod kv;
pub mod trie;
