//! Block and chain validation rules.
//!
//! Validation re-derives every hash from stored data and compares it against
//! what the block claims. The first violation found is reported.

use auditchain_core::{meets_difficulty, Block, GENESIS_PREVIOUS_HASH};
use thiserror::Error;

/// Errors that can occur during validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("block {index}: stored hash does not match recomputed hash")]
    HashMismatch { index: u64 },

    #[error("block {index}: previous_hash does not match the preceding block's hash")]
    BrokenLink { index: u64 },

    #[error("block {index}: hash does not meet difficulty {difficulty}")]
    InsufficientWork { index: u64, difficulty: u32 },

    #[error("block {index}: merkle root verification failed")]
    MerkleRootMismatch { index: u64 },

    #[error("block {index}: transaction {tx_id} hash mismatch")]
    TransactionHashMismatch { index: u64, tx_id: String },

    #[error("block {index}: transaction {tx_id} could not be encoded: {reason}")]
    TransactionEncoding {
        index: u64,
        tx_id: String,
        reason: String,
    },

    #[error("genesis block does not carry the sentinel previous hash")]
    InvalidGenesisLink,
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Chain validator for a fixed difficulty.
#[derive(Debug, Clone, Copy)]
pub struct ChainValidator {
    difficulty: u32,
    validate_genesis: bool,
}

impl ChainValidator {
    /// Create a validator that trusts the genesis block as given.
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            validate_genesis: false,
        }
    }

    /// Also re-derive the genesis block's hashes.
    pub fn with_genesis_validation(mut self, enabled: bool) -> Self {
        self.validate_genesis = enabled;
        self
    }

    /// Validate a block against its predecessor.
    ///
    /// Checks, in order: block hash, link to the previous block, proof of
    /// work, merkle root, then every transaction hash.
    pub fn validate_block(&self, block: &Block, previous: &Block) -> Result<()> {
        self.validate_block_hash(block)?;

        if block.previous_hash != previous.hash {
            return Err(ValidationError::BrokenLink { index: block.index });
        }

        self.validate_contents(block)
    }

    /// Validate the genesis block on its own.
    pub fn validate_genesis_block(&self, genesis: &Block) -> Result<()> {
        self.validate_block_hash(genesis)?;

        if genesis.previous_hash != GENESIS_PREVIOUS_HASH {
            return Err(ValidationError::InvalidGenesisLink);
        }

        self.validate_contents(genesis)
    }

    /// Validate an entire chain, genesis first.
    ///
    /// The genesis block is only re-validated when enabled; otherwise the walk
    /// starts at index 1.
    pub fn validate_chain(&self, blocks: &[Block]) -> Result<()> {
        let genesis = blocks.first().ok_or(ValidationError::EmptyChain)?;

        if self.validate_genesis {
            self.validate_genesis_block(genesis)?;
        }

        for pair in blocks.windows(2) {
            self.validate_block(&pair[1], &pair[0])?;
        }

        Ok(())
    }

    fn validate_block_hash(&self, block: &Block) -> Result<()> {
        if block.compute_hash() != block.hash {
            return Err(ValidationError::HashMismatch { index: block.index });
        }
        Ok(())
    }

    fn validate_contents(&self, block: &Block) -> Result<()> {
        if !meets_difficulty(&block.hash, self.difficulty) {
            return Err(ValidationError::InsufficientWork {
                index: block.index,
                difficulty: self.difficulty,
            });
        }

        if !block.verify_merkle_root() {
            return Err(ValidationError::MerkleRootMismatch { index: block.index });
        }

        for tx in &block.transactions {
            let matches = tx
                .verify_hash()
                .map_err(|e| ValidationError::TransactionEncoding {
                    index: block.index,
                    tx_id: tx.id.clone(),
                    reason: e.to_string(),
                })?;

            if !matches {
                return Err(ValidationError::TransactionHashMismatch {
                    index: block.index,
                    tx_id: tx.id.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::Miner;
    use auditchain_core::{Payload, Transaction};

    const DIFFICULTY: u32 = 1;

    fn mined(mut block: Block) -> Block {
        block.hash = Miner::new(DIFFICULTY).mine(&mut block).unwrap();
        block
    }

    fn chain_of(len: u64) -> Vec<Block> {
        let mut blocks = vec![mined(Block::genesis().unwrap())];
        for i in 1..len {
            let tx = Transaction::document(format!("tx{}", i), i, 7, "create", Payload::new())
                .sealed()
                .unwrap();
            let previous = blocks.last().unwrap().hash.clone();
            blocks.push(mined(Block::new(i, previous, vec![tx])));
        }
        blocks
    }

    #[test]
    fn test_valid_chain() {
        let blocks = chain_of(4);
        let validator = ChainValidator::new(DIFFICULTY);

        assert!(validator.validate_chain(&blocks).is_ok());
        assert!(validator
            .with_genesis_validation(true)
            .validate_chain(&blocks)
            .is_ok());
    }

    #[test]
    fn test_empty_chain_rejected() {
        assert_eq!(
            ChainValidator::new(DIFFICULTY).validate_chain(&[]),
            Err(ValidationError::EmptyChain)
        );
    }

    #[test]
    fn test_tampered_block_hash() {
        let mut blocks = chain_of(3);
        blocks[2].hash = format!("0{}", "a".repeat(63));

        assert_eq!(
            ChainValidator::new(DIFFICULTY).validate_chain(&blocks),
            Err(ValidationError::HashMismatch { index: 2 })
        );
    }

    #[test]
    fn test_broken_link() {
        let blocks = chain_of(2);
        let other = chain_of(2);

        assert_eq!(
            ChainValidator::new(DIFFICULTY).validate_block(&blocks[1], &other[0]),
            Err(ValidationError::BrokenLink { index: 1 })
        );
    }

    #[test]
    fn test_insufficient_work() {
        let blocks = chain_of(2);

        // Mined at difficulty 1, so difficulty 64 cannot be met.
        assert_eq!(
            ChainValidator::new(64).validate_block(&blocks[1], &blocks[0]),
            Err(ValidationError::InsufficientWork {
                index: 1,
                difficulty: 64
            })
        );
    }

    #[test]
    fn test_tampered_merkle_root() {
        let mut blocks = chain_of(3);
        blocks[1].merkle_root = "tampered".into();

        // The block hash covers the merkle root, so re-mine to isolate the check.
        blocks[1] = mined(blocks[1].clone());
        blocks[2].previous_hash = blocks[1].hash.clone();
        blocks[2] = mined(blocks[2].clone());

        assert_eq!(
            ChainValidator::new(DIFFICULTY).validate_chain(&blocks),
            Err(ValidationError::MerkleRootMismatch { index: 1 })
        );
    }

    #[test]
    fn test_tampered_transaction() {
        let mut blocks = chain_of(2);
        blocks[1].transactions[0].action = "delete".into();

        assert_eq!(
            ChainValidator::new(DIFFICULTY).validate_chain(&blocks),
            Err(ValidationError::TransactionHashMismatch {
                index: 1,
                tx_id: "tx1".into()
            })
        );
    }

    #[test]
    fn test_genesis_skipped_by_default() {
        let mut blocks = chain_of(1);
        blocks[0].transactions[0].action = "tampered".into();

        assert!(ChainValidator::new(DIFFICULTY).validate_chain(&blocks).is_ok());
        assert!(matches!(
            ChainValidator::new(DIFFICULTY)
                .with_genesis_validation(true)
                .validate_chain(&blocks),
            Err(ValidationError::TransactionHashMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_genesis_sentinel_required() {
        let mut blocks = chain_of(1);
        blocks[0].previous_hash = "1".into();
        blocks[0] = mined(blocks[0].clone());

        assert_eq!(
            ChainValidator::new(DIFFICULTY).validate_genesis_block(&blocks[0]),
            Err(ValidationError::InvalidGenesisLink)
        );
    }
}
