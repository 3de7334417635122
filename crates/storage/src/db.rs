//! sled database wrapper with serialization helpers.
//!
//! Values are stored as JSON. Transaction payloads are arbitrary JSON values
//! and timestamps must re-render byte-for-byte after a reload, so the
//! encoding mirrors the one the hashes were computed over.

use sled::Db;
use std::path::Path;
use thiserror::Error;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error("Invalid append: {0}")]
    InvalidAppend(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Wrapper around sled database with serialization helpers.
pub struct Storage {
    db: Db,
}

impl Storage {
    /// Open a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Open an in-memory database (for testing).
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Encode a value the way it will be stored.
    pub fn encode<V: serde::Serialize>(value: &V) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Store a serializable value.
    pub fn put<K, V>(&self, key: K, value: &V) -> Result<()>
    where
        K: AsRef<[u8]>,
        V: serde::Serialize,
    {
        self.db.insert(key, Self::encode(value)?)?;
        Ok(())
    }

    /// Retrieve and deserialize a value.
    pub fn get<K, V>(&self, key: K) -> Result<Option<V>>
    where
        K: AsRef<[u8]>,
        V: serde::de::DeserializeOwned,
    {
        match self.db.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Retrieve a value, returning error if not found.
    pub fn get_or_err<K, V>(&self, key: K) -> Result<V>
    where
        K: AsRef<[u8]> + std::fmt::Debug + Clone,
        V: serde::de::DeserializeOwned,
    {
        self.get(key.clone())?
            .ok_or_else(|| StorageError::NotFound(format!("{:?}", key)))
    }

    /// Check if a key exists.
    pub fn contains<K: AsRef<[u8]>>(&self, key: K) -> Result<bool> {
        Ok(self.db.contains_key(key)?)
    }

    /// Apply multiple writes atomically.
    pub fn batch(&self, operations: Vec<BatchOp>) -> Result<()> {
        let mut batch = sled::Batch::default();
        for BatchOp::Insert { key, value } in operations {
            batch.insert(key, value);
        }
        self.db.apply_batch(batch)?;
        Ok(())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    // =========================================================================
    // Key Construction Helpers
    // =========================================================================

    /// Create a prefixed key for blocks by index.
    /// Format: "block:index:{index}", zero-padded so keys sort by index
    pub fn block_index_key(index: u64) -> Vec<u8> {
        format!("block:index:{:020}", index).into_bytes()
    }

    /// Create a prefixed key mapping a block hash to its index.
    /// Format: "block:hash:{hash}"
    pub fn block_hash_key(hash: &str) -> Vec<u8> {
        format!("block:hash:{}", hash).into_bytes()
    }
}

/// Batch operation for atomic updates.
pub enum BatchOp {
    Insert { key: Vec<u8>, value: Vec<u8> },
}
