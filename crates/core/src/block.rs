//! Block structure and hashing.

use crate::hash::{sha256_hex, GENESIS_PREVIOUS_HASH};
use crate::merkle::merkle_root;
use crate::transaction::{Transaction, TransactionError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A sequence position holding one or more transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Zero-based position in the chain.
    pub index: u64,
    /// Set when the block is constructed, before mining.
    pub timestamp: DateTime<Utc>,
    /// Transactions in this block.
    pub transactions: Vec<Transaction>,
    /// Hash of the block at `index - 1`, or the sentinel for genesis.
    pub previous_hash: String,
    /// Mined hash. Empty until a nonce satisfying the difficulty is found.
    #[serde(default)]
    pub hash: String,
    /// Mutated only by mining.
    pub nonce: u64,
    /// Root over the transaction hashes.
    pub merkle_root: String,
}

impl Block {
    /// Create a new unmined block. Transactions are expected to be sealed.
    pub fn new(index: u64, previous_hash: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        let mut block = Self {
            index,
            timestamp: Utc::now(),
            transactions,
            previous_hash: previous_hash.into(),
            hash: String::new(),
            nonce: 0,
            merkle_root: String::new(),
        };
        block.merkle_root = block.compute_merkle_root();
        block
    }

    /// Create the unmined genesis block around the synthetic genesis transaction.
    pub fn genesis() -> Result<Self, TransactionError> {
        let tx = Transaction::genesis().sealed()?;
        Ok(Self::new(0, GENESIS_PREVIOUS_HASH, vec![tx]))
    }

    /// The timestamp as it enters the block hash: RFC 3339, whole seconds, UTC.
    pub fn rendered_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// The string the block hash is computed over.
    ///
    /// Transactions enter only through `merkle_root`.
    pub fn hash_preimage(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.index,
            self.rendered_timestamp(),
            self.previous_hash,
            self.merkle_root,
            self.nonce
        )
    }

    /// Recompute the block hash from the current fields.
    pub fn compute_hash(&self) -> String {
        sha256_hex(self.hash_preimage().as_bytes())
    }

    /// Recompute the root over the stored transaction hashes.
    pub fn compute_merkle_root(&self) -> String {
        let hashes: Vec<&str> = self.transactions.iter().map(|tx| tx.hash.as_str()).collect();
        merkle_root(&hashes)
    }

    /// Verify the merkle root matches the transactions.
    pub fn verify_merkle_root(&self) -> bool {
        self.compute_merkle_root() == self.merkle_root
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}
