//! Proof of Work (PoW) mining.
//!
//! A block is mined by incrementing its nonce until the block hash starts with
//! `difficulty` zero hex characters. The search is synchronous and CPU-bound.
//! It is unbounded by default, but can be limited by an attempt budget or a
//! timeout, and aborted through a [`CancelToken`]. Whatever the limits, a hash
//! returned by [`Miner::mine`] always satisfies the difficulty target.

use auditchain_core::{difficulty_target, meets_difficulty, Block};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Errors that can end a mining search without a result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MiningError {
    #[error("mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("mining timed out after {attempts} attempts")]
    TimedOut { attempts: u64 },

    #[error("mining gave up after {attempts} attempts")]
    AttemptsExhausted { attempts: u64 },

    #[error("nonce space exhausted")]
    NonceOverflow,
}

pub type Result<T> = std::result::Result<T, MiningError>;

/// Bounds on a single mining search. The default is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningLimits {
    /// Maximum number of hashes to try.
    #[serde(default)]
    pub max_attempts: Option<u64>,
    /// Wall-clock budget in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl MiningLimits {
    /// No limits: search until a valid hash is found.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// The timeout as a duration, if one is set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Shared flag used to abort an in-progress search from another thread.
///
/// Each search clears the flag when it starts, so a cancellation only stops
/// a search that is already running. A cancel issued while idle is dropped.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear any pending cancellation.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Nonce search against a fixed difficulty.
#[derive(Debug, Clone)]
pub struct Miner {
    difficulty: u32,
    limits: MiningLimits,
    cancel: CancelToken,
}

impl Miner {
    /// Create an unbounded miner for the given difficulty.
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            limits: MiningLimits::unbounded(),
            cancel: CancelToken::new(),
        }
    }

    /// Apply attempt and time limits.
    pub fn with_limits(mut self, limits: MiningLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Use an externally held cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Number of leading zero hex characters required.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// The prefix a valid hash must start with.
    pub fn target(&self) -> String {
        difficulty_target(self.difficulty)
    }

    /// Get a handle that can cancel this miner's searches.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Search for a nonce whose block hash meets the difficulty.
    ///
    /// The block's nonce is left at the value that produced the returned hash,
    /// or at the last value tried if the search ends early. The caller stores
    /// the returned hash in the block.
    pub fn mine(&self, block: &mut Block) -> Result<String> {
        self.cancel.reset();
        let started = Instant::now();
        let deadline = self.limits.timeout().map(|timeout| started + timeout);
        let mut attempts: u64 = 0;

        loop {
            let hash = block.compute_hash();
            attempts += 1;

            if meets_difficulty(&hash, self.difficulty) {
                debug!(
                    index = block.index,
                    nonce = block.nonce,
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "block mined"
                );
                return Ok(hash);
            }

            if self.cancel.is_cancelled() {
                debug!(index = block.index, attempts, "mining cancelled");
                return Err(MiningError::Cancelled { attempts });
            }

            if self.limits.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(MiningError::AttemptsExhausted { attempts });
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(MiningError::TimedOut { attempts });
            }

            block.nonce = block.nonce.checked_add(1).ok_or(MiningError::NonceOverflow)?;
        }
    }
}

/// Check a block's stored hash against the difficulty target.
pub fn verify_pow(block: &Block, difficulty: u32) -> bool {
    meets_difficulty(&block.hash, difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditchain_core::{Payload, Transaction};
    use std::thread;

    /// No SHA-256 hex digest has 64 leading zeros in practice.
    const IMPOSSIBLE: u32 = 64;

    fn unmined_block() -> Block {
        let tx = Transaction::document("tx1", 1, 7, "create", Payload::new())
            .sealed()
            .unwrap();
        Block::new(1, "prev", vec![tx])
    }

    #[test]
    fn test_mined_hash_meets_target() {
        let mut block = unmined_block();
        let miner = Miner::new(2);

        let hash = miner.mine(&mut block).unwrap();

        assert!(hash.starts_with("00"));
        assert_eq!(hash, block.compute_hash());
    }

    #[test]
    fn test_zero_difficulty_accepts_first_hash() {
        let mut block = unmined_block();
        let hash = Miner::new(0).mine(&mut block).unwrap();

        assert_eq!(block.nonce, 0);
        assert_eq!(hash, block.compute_hash());
    }

    #[test]
    fn test_verify_pow() {
        let mut block = unmined_block();
        block.hash = Miner::new(1).mine(&mut block).unwrap();

        assert!(verify_pow(&block, 1));
        block.hash = "f".repeat(64);
        assert!(!verify_pow(&block, 1));
    }

    #[test]
    fn test_attempt_budget() {
        let mut block = unmined_block();
        let miner = Miner::new(IMPOSSIBLE).with_limits(MiningLimits {
            max_attempts: Some(5),
            timeout_ms: None,
        });

        assert_eq!(
            miner.mine(&mut block),
            Err(MiningError::AttemptsExhausted { attempts: 5 })
        );
        assert_eq!(block.nonce, 4);
    }

    #[test]
    fn test_timeout() {
        let mut block = unmined_block();
        let miner = Miner::new(IMPOSSIBLE).with_limits(MiningLimits {
            max_attempts: None,
            timeout_ms: Some(0),
        });

        assert!(matches!(
            miner.mine(&mut block),
            Err(MiningError::TimedOut { .. })
        ));
    }

    #[test]
    fn test_cancel_while_idle_is_ignored() {
        let mut block = unmined_block();
        let miner = Miner::new(1);
        let token = miner.cancel_token();

        token.cancel();
        let hash = miner.mine(&mut block).unwrap();

        assert!(meets_difficulty(&hash, 1));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancelToken::new();
        let miner = Miner::new(IMPOSSIBLE).with_cancel_token(token.clone());

        let handle = thread::spawn(move || {
            let mut block = unmined_block();
            miner.mine(&mut block)
        });

        // Keep cancelling until the search has started and stopped.
        while !handle.is_finished() {
            token.cancel();
            thread::sleep(Duration::from_millis(5));
        }

        let result = handle.join().unwrap();
        assert!(matches!(result, Err(MiningError::Cancelled { .. })));
    }

    #[test]
    fn test_limits_serde_defaults() {
        let limits: MiningLimits = serde_json::from_str("{}").unwrap();
        assert_eq!(limits, MiningLimits::unbounded());
        assert!(limits.timeout().is_none());
    }
}
