//! Read-only lookups over the ledger's blocks.
//!
//! All scans walk blocks in order, then transactions in order within a block,
//! so results come back in append order.

use crate::ledger::{Ledger, LedgerError, Result};
use auditchain_core::{Block, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary snapshot of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Number of blocks, including genesis.
    pub blocks: usize,
    /// Number of transactions across all blocks.
    pub total_transactions: usize,
    /// Leading zero hex characters required in block hashes.
    pub difficulty: u32,
    /// Hash of the latest block.
    pub latest_block_hash: String,
    /// Result of full chain validation.
    pub is_valid: bool,
}

impl Ledger {
    /// Iterate over every transaction in append order.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.blocks().iter().flat_map(|block| block.transactions.iter())
    }

    /// Get a block by its index.
    pub fn get_block_by_index(&self, index: u64) -> Result<&Block> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.blocks().get(i))
            .ok_or(LedgerError::BlockNotFound(index))
    }

    /// Find a transaction by id. The first match wins.
    pub fn get_transaction_by_id(&self, id: &str) -> Result<&Transaction> {
        self.transactions()
            .find(|tx| tx.id == id)
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))
    }

    /// All transactions recorded against a subject.
    pub fn transaction_history(&self, subject_id: u64) -> Vec<&Transaction> {
        self.transactions()
            .filter(|tx| tx.subject_id == Some(subject_id))
            .collect()
    }

    /// All transactions performed by an actor.
    pub fn transactions_by_actor(&self, actor_id: u64) -> Vec<&Transaction> {
        self.transactions()
            .filter(|tx| tx.actor_id == Some(actor_id))
            .collect()
    }

    /// All transactions with the given action tag.
    pub fn transactions_by_action(&self, action: &str) -> Vec<&Transaction> {
        self.transactions().filter(|tx| tx.action == action).collect()
    }

    /// All transactions stamped within `[from, to]`.
    pub fn transactions_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Transaction> {
        self.transactions()
            .filter(|tx| tx.timestamp >= from && tx.timestamp <= to)
            .collect()
    }

    /// The last `count` blocks, most recent first.
    pub fn recent_blocks(&self, count: usize) -> Vec<&Block> {
        self.blocks().iter().rev().take(count).collect()
    }

    /// Summarize the ledger, including a full validation pass.
    pub fn chain_info(&self) -> ChainInfo {
        ChainInfo {
            blocks: self.len(),
            total_transactions: self.blocks().iter().map(Block::tx_count).sum(),
            difficulty: self.difficulty(),
            latest_block_hash: self.latest_block().hash.clone(),
            is_valid: self.validate_chain(),
        }
    }
}
