//! Proof of Work consensus for auditchain.
//!
//! This crate provides:
//! - Nonce search against a leading-zero difficulty target
//! - Attempt, time, and cancellation bounds on that search
//! - Block and chain validation (hashes, links, work, merkle roots)
//!
//! # Example
//!
//! ```rust,no_run
//! use auditchain_consensus::{ChainValidator, Miner};
//! use auditchain_core::Block;
//!
//! // Mine the genesis block
//! let mut genesis = Block::genesis().unwrap();
//! genesis.hash = Miner::new(2).mine(&mut genesis).unwrap();
//!
//! // Validate the chain
//! ChainValidator::new(2)
//!     .with_genesis_validation(true)
//!     .validate_chain(&[genesis])
//!     .unwrap();
//! ```

pub mod pow;
pub mod validator;

// Re-export commonly used types
pub use pow::{verify_pow, CancelToken, Miner, MiningError, MiningLimits};
pub use validator::{ChainValidator, ValidationError};
