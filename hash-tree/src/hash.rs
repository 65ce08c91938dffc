//! SHA-256 digest helpers and the level-count rule shared by every tree
//! computation in the crate.

use grovedb_costs::OperationCost;
use sha2::{Digest, Sha256};

/// Size in bytes of every node hash.
pub const HASH_SIZE: usize = 32;

/// A single node digest.
pub type NodeHash = [u8; HASH_SIZE];

/// Digest of a serialised leaf: `sha256(bytes)`.
pub fn leaf_hash(bytes: &[u8]) -> NodeHash {
    Sha256::digest(bytes).into()
}

/// Digest of an interior node: `sha256(left || right)`.
///
/// A missing right child contributes the empty byte string, so an odd node
/// at the end of a level still hashes (it is not promoted unchanged).
pub fn node_hash(left: &[u8], right: Option<&[u8]>) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right.unwrap_or_default());
    hasher.finalize().into()
}

/// Number of levels (leaves included) of the tree over `entry_count`
/// entries.
///
/// A single entry still produces two levels, matching the legacy peer
/// implementation: the root is `sha256(leaf || "")`. Zero entries produce
/// no tree at all.
pub fn level_count(entry_count: u64) -> u32 {
    match entry_count {
        0 => 0,
        1 => 2,
        n => u64::BITS + 1 - (n - 1).leading_zeros(),
    }
}

/// Number of nodes on the level above one holding `count` nodes.
pub(crate) fn parent_count(count: u64) -> u64 {
    count.div_ceil(2)
}

/// Count one node digest against `cost`.
pub(crate) fn add_hash_call(cost: &mut OperationCost) {
    cost.hash_node_calls = cost.hash_node_calls.saturating_add(1);
}
