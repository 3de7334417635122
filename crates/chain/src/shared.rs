//! Thread-safe ledger handle.
//!
//! Appends hold the write lock across the whole read-tail, build, mine, append
//! sequence, so concurrent submitters are serialized and readers only ever see
//! a complete tail. Reads return owned copies.

use crate::ledger::{Ledger, Result};
use crate::query::ChainInfo;
use auditchain_consensus::{CancelToken, ValidationError};
use auditchain_core::{Block, Payload, Transaction};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable handle to a ledger shared between threads.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
    /// Held outside the lock so a search can be cancelled while it runs.
    cancel: CancelToken,
}

impl SharedLedger {
    /// Take ownership of a ledger.
    pub fn new(ledger: Ledger) -> Self {
        let cancel = ledger.cancel_token();
        Self {
            inner: Arc::new(RwLock::new(ledger)),
            cancel,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.read().expect("ledger lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.inner.write().expect("ledger lock poisoned")
    }

    /// Run a closure against the ledger under the read lock.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.read())
    }

    /// Record a transaction in a new mined block, returning a copy of it.
    pub fn add_transaction(&self, tx: Transaction) -> Result<Block> {
        let mut ledger = self.write();
        ledger.add_transaction(tx).cloned()
    }

    /// Build a transaction stamped with the current time and record it.
    pub fn append(
        &self,
        id: impl Into<String>,
        subject_id: u64,
        actor_id: u64,
        action: impl Into<String>,
        payload: Payload,
    ) -> Result<Block> {
        let mut ledger = self.write();
        ledger
            .append(id, subject_id, actor_id, action, payload)
            .cloned()
    }

    /// Abort the mining search in progress. Does nothing if none is running.
    pub fn cancel_mining(&self) {
        self.cancel.cancel();
    }

    pub fn validate_chain(&self) -> bool {
        self.read().validate_chain()
    }

    pub fn verify_chain(&self) -> std::result::Result<(), ValidationError> {
        self.read().verify_chain()
    }

    pub fn latest_block(&self) -> Block {
        self.read().latest_block().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get_block_by_index(&self, index: u64) -> Result<Block> {
        self.read().get_block_by_index(index).cloned()
    }

    pub fn get_transaction_by_id(&self, id: &str) -> Result<Transaction> {
        self.read().get_transaction_by_id(id).cloned()
    }

    pub fn transaction_history(&self, subject_id: u64) -> Vec<Transaction> {
        self.read()
            .transaction_history(subject_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn transactions_by_actor(&self, actor_id: u64) -> Vec<Transaction> {
        self.read()
            .transactions_by_actor(actor_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn chain_info(&self) -> ChainInfo {
        self.read().chain_info()
    }

    /// Copy of every block, genesis first.
    pub fn snapshot(&self) -> Vec<Block> {
        self.read().blocks().to_vec()
    }
}
