//! Caching database configuration
//!
//! Tuning knobs for the snapshot ring, the code size memo and the
//! node-retention horizon handed to freshly loaded account tries.
//! All fields have defaults, so an empty TOML document is a valid config.

use crate::core::error::{Result, StateDbError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of past tries to keep. Chosen so that reasonable chain reorg
/// depths will hit an existing trie.
pub const MAX_PAST_TRIES: usize = 12;

/// Number of code hash to size associations to keep.
pub const CODE_SIZE_CACHE_SIZE: usize = 100_000;

/// Trie cache generation limit after which trie nodes are evicted from memory.
pub const MAX_TRIE_CACHE_GEN: u16 = 120;

/// Caching database configuration
///
/// # Examples
///
/// ```
/// use statedb::DatabaseConfig;
///
/// let config = DatabaseConfig::from_toml_str("max_past_tries = 32").unwrap();
/// assert_eq!(config.max_past_tries, 32);
/// assert_eq!(config.code_size_cache_size, 100_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Capacity of the committed account-trie ring
    pub max_past_tries: usize,

    /// Capacity of the code size memo
    pub code_size_cache_size: usize,

    /// Node-retention horizon for account tries opened from the store
    pub trie_cache_gen: u16,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            max_past_tries: MAX_PAST_TRIES,
            code_size_cache_size: CODE_SIZE_CACHE_SIZE,
            trie_cache_gen: MAX_TRIE_CACHE_GEN,
        }
    }
}

impl DatabaseConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: DatabaseConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StateDbError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| StateDbError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_past_tries == 0 {
            return Err(StateDbError::Config(
                "max_past_tries must be greater than 0".to_string(),
            ));
        }
        if self.code_size_cache_size == 0 {
            return Err(StateDbError::Config(
                "code_size_cache_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
