use thiserror::Error;

use crate::core::hash::to_hex;

#[derive(Error, Debug)]
pub enum StateDbError {
    #[error("Key not found in store: {key}")]
    NotFound { key: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Storage(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StateDbError {
    /// Build a `NotFound` for a raw store key
    pub fn not_found(key: &[u8]) -> Self {
        StateDbError::NotFound { key: to_hex(key) }
    }

    /// True if the store reported the key as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, StateDbError::NotFound { .. })
    }
}

impl From<bincode::Error> for StateDbError {
    fn from(e: bincode::Error) -> Self {
        StateDbError::Decode(e.to_string())
    }
}

impl From<toml::de::Error> for StateDbError {
    fn from(e: toml::de::Error) -> Self {
        StateDbError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StateDbError>;
