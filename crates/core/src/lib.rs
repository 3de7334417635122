//! Core ledger primitives for auditchain.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - SHA-256 hashing and difficulty targets
//! - Transactions recording one action each
//! - Blocks linking to their predecessor by hash
//! - Transaction root aggregation

pub mod block;
pub mod hash;
pub mod merkle;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::Block;
pub use hash::{
    difficulty_target, meets_difficulty, sha256_concat_hex, sha256_hex, GENESIS_PREVIOUS_HASH,
};
pub use merkle::merkle_root;
pub use transaction::{generate_transaction_id, Payload, Transaction, TransactionError};
