//! Ledger orchestration.
//!
//! The ledger owns the block sequence. It builds and mines the genesis block,
//! turns each submitted transaction into a new mined block, and re-validates
//! the whole chain on request.

use auditchain_consensus::{
    CancelToken, ChainValidator, Miner, MiningError, MiningLimits, ValidationError,
};
use auditchain_core::{Block, Payload, Transaction, TransactionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("mining error: {0}")]
    Mining(#[from] MiningError),

    #[error("block not found at index {0}")]
    BlockNotFound(u64),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("a ledger needs at least a genesis block")]
    EmptyChain,

    #[error("no block index follows {0}")]
    IndexOverflow(u64),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Difficulty used when none is configured.
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Leading zero hex characters required in every block hash.
    pub difficulty: u32,
    /// Re-validate the genesis block during chain validation.
    #[serde(default)]
    pub validate_genesis: bool,
    /// Bounds on each mining search.
    #[serde(default)]
    pub mining: MiningLimits,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            validate_genesis: false,
            mining: MiningLimits::unbounded(),
        }
    }
}

impl LedgerConfig {
    /// Create a configuration with the given difficulty and default limits.
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}

/// Append-only sequence of mined blocks.
#[derive(Debug)]
pub struct Ledger {
    /// Block 0 is genesis. Never empty.
    blocks: Vec<Block>,
    /// Configuration.
    config: LedgerConfig,
    /// Miner for new blocks.
    miner: Miner,
}

impl Ledger {
    /// Create a ledger and mine its genesis block.
    pub fn new(difficulty: u32) -> Result<Self> {
        Self::with_config(LedgerConfig::new(difficulty))
    }

    /// Create a ledger from a configuration and mine its genesis block.
    pub fn with_config(config: LedgerConfig) -> Result<Self> {
        let miner = Self::build_miner(&config);

        let mut genesis = Block::genesis()?;
        genesis.hash = miner.mine(&mut genesis)?;

        info!(
            difficulty = config.difficulty,
            hash = %genesis.hash,
            "genesis block mined"
        );

        Ok(Self {
            blocks: vec![genesis],
            config,
            miner,
        })
    }

    /// Rebuild a ledger from previously persisted blocks.
    ///
    /// The blocks are not validated here, so a tampered chain can still be
    /// loaded and inspected. Use [`Ledger::verify_chain`] to check it.
    pub fn from_blocks(blocks: Vec<Block>, config: LedgerConfig) -> Result<Self> {
        if blocks.is_empty() {
            return Err(LedgerError::EmptyChain);
        }

        debug!(blocks = blocks.len(), "ledger loaded from blocks");

        Ok(Self {
            miner: Self::build_miner(&config),
            blocks,
            config,
        })
    }

    fn build_miner(config: &LedgerConfig) -> Miner {
        Miner::new(config.difficulty).with_limits(config.mining)
    }

    /// Record a transaction in a new mined block.
    ///
    /// The transaction is hashed, placed alone in a block linked to the
    /// current tail, mined, and appended. If hashing or mining fails the
    /// ledger is left unchanged.
    pub fn add_transaction(&mut self, mut tx: Transaction) -> Result<&Block> {
        tx.seal()?;

        let latest = self.latest_block();
        let index = latest
            .index
            .checked_add(1)
            .ok_or(LedgerError::IndexOverflow(latest.index))?;
        let mut block = Block::new(index, latest.hash.clone(), vec![tx]);
        block.hash = self.miner.mine(&mut block)?;

        info!(
            index = block.index,
            tx_id = %block.transactions[0].id,
            nonce = block.nonce,
            hash = %block.hash,
            "block appended"
        );

        self.blocks.push(block);
        Ok(self.latest_block())
    }

    /// Build a transaction stamped with the current time and record it.
    pub fn append(
        &mut self,
        id: impl Into<String>,
        subject_id: u64,
        actor_id: u64,
        action: impl Into<String>,
        payload: Payload,
    ) -> Result<&Block> {
        let tx = Transaction::document(id, subject_id, actor_id, action, payload);
        self.add_transaction(tx)
    }

    /// The validator matching this ledger's configuration.
    pub fn validator(&self) -> ChainValidator {
        ChainValidator::new(self.config.difficulty)
            .with_genesis_validation(self.config.validate_genesis)
    }

    /// Validate the chain, reporting the first violation.
    pub fn verify_chain(&self) -> std::result::Result<(), ValidationError> {
        self.validator().validate_chain(&self.blocks)
    }

    /// Validate the chain. Any single violation makes the whole chain invalid.
    pub fn validate_chain(&self) -> bool {
        match self.verify_chain() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "chain validation failed");
                false
            }
        }
    }

    /// Get the latest block.
    pub fn latest_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("ledger always holds a genesis block")
    }

    /// All blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Consume the ledger, returning its blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Number of blocks, including genesis.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false for a constructed ledger.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Leading zero hex characters required in block hashes.
    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Handle for cancelling an in-progress mining search.
    pub fn cancel_token(&self) -> CancelToken {
        self.miner.cancel_token()
    }
}
