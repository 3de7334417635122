//! Transaction root aggregation.
//!
//! The root is not a balanced tree: all transaction hashes are concatenated in
//! order and hashed once. Every persisted block hash depends on this exact
//! scheme.

use crate::hash::sha256_concat_hex;

/// Compute the root over a block's transaction hashes.
///
/// - no hashes: the empty string
/// - one hash: that hash, unchanged
/// - more: SHA-256 over the in-order concatenation
pub fn merkle_root<S: AsRef<str>>(hashes: &[S]) -> String {
    match hashes {
        [] => String::new(),
        [single] => single.as_ref().to_string(),
        _ => {
            let parts: Vec<&[u8]> = hashes.iter().map(|h| h.as_ref().as_bytes()).collect();
            sha256_concat_hex(&parts)
        }
    }
}
