use chain_hash_tree::{HashableValue, MemoryHashTree, NodeHash};

use crate::ValidationError;

/// One persisted Merkle collection of a state.
#[derive(Debug, Clone)]
pub struct StoredMerkle {
    /// Name used in logs, e.g. the entry type held by the collection.
    pub name: String,
    /// How the collection is laid out in storage.
    pub layout: MerkleLayout,
}

/// The two storage layouts a state's collections come in.
#[derive(Debug, Clone)]
pub enum MerkleLayout {
    /// Entries stored as a plain array, possibly with the tree persisted
    /// alongside.
    Direct {
        /// Hashable encodings of the entries, in index order.
        entries: Vec<Vec<HashableValue>>,
        /// The persisted node hashes, when the store keeps them.
        stored_tree: Option<MemoryHashTree>,
        /// The root hash the state declares for this collection.
        declared_root: Option<NodeHash>,
    },
    /// Nodes stored in a content-addressed store, reachable from the root.
    ContentAddressed {
        /// Number of leaves the collection declares.
        entry_count: u64,
        /// The root hash the state declares for this collection.
        declared_root: Option<NodeHash>,
    },
}

/// Loads the persisted collections of the state at a given height.
pub trait StateSource {
    /// All Merkle collections of the state at `height`, in validation
    /// order.
    fn merkles_at(&self, height: u64) -> Result<Vec<StoredMerkle>, ValidationError>;
}
