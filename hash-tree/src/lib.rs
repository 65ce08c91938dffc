//! Deterministic binary Merkle hash tree over an ordered entry collection.
//!
//! Leaves are `sha256(serialise(entry))`; each interior node is
//! `sha256(left || right)` where a missing right child contributes the
//! empty byte string. A single entry still yields a two-level tree, as the
//! legacy peer implementation does.
//!
//! # Core types
//!
//! - [`FullTreeCalculator`]: builds every level from scratch.
//! - [`IncrementalTreeCalculator`]: rehashes only the paths above changed
//!   leaves of an existing [`HashTree`].
//! - [`MemoryHashTree`] / [`OverlayHashTree`]: node storage.
//! - [`MerkleList`]: keyed entries that keep their own tree up to date.
//! - [`ContentStore`]: hash-keyed node storage fed through
//!   [`ContentStoreWriter`].
//!
//! Operations that hash report the number of digests computed as
//! `hash_node_calls` in their returned cost.

#![warn(missing_docs)]

/// Return early with the cost gathered so far when a plain `Result` fails.
macro_rules! cost_return_on_error_no_add {
    ($cost:ident, $expr:expr) => {
        match $expr {
            Ok(x) => x,
            Err(e) => return Err(e).wrap_with_cost($cost),
        }
    };
}

mod entry;
mod error;
mod full;
/// Digest primitives and the level-count rule.
pub mod hash;
mod incremental;
mod merkle_list;
mod serialise;
mod store;
mod tree;


pub use entry::EntrySource;
pub use error::HashTreeError;
pub use full::{FullTree, FullTreeCalculator};
pub use grovedb_costs::{CostResult, CostsExt, OperationCost};
pub use hash::{HASH_SIZE, NodeHash, leaf_hash, level_count, node_hash};
pub use incremental::{ChangeObserver, IncrementalTreeCalculator, NodeChange};
pub use merkle_list::{MerkleEntry, MerkleList};
pub use serialise::{HashSerialiser, HashableValue, MsgPackHashSerialiser};
pub use store::{ContentStore, ContentStoreWriter, MemContentStore, StoredNode};
pub use tree::{HashTree, MemoryHashTree, OverlayHashTree};
