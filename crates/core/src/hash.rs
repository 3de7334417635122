//! SHA-256 hashing utilities for the ledger.
//!
//! All hashes in the ledger are carried as lowercase hexadecimal strings so
//! that they serialize verbatim and can be compared against tampered values.

use sha2::{Digest, Sha256};

/// The `previous_hash` carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Hash arbitrary data using SHA-256, returning lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hash multiple pieces of data by concatenating them.
pub fn sha256_concat_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// The prefix a block hash must start with at the given difficulty.
pub fn difficulty_target(difficulty: u32) -> String {
    "0".repeat(difficulty as usize)
}

/// Check whether a hex hash has at least `difficulty` leading zero characters.
///
/// A hash shorter than the target never satisfies it.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}
