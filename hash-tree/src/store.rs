//! Content-addressed node storage.
//!
//! Every stored value is keyed by its own hash: interior nodes by the
//! digest of their children's hashes, leaves by the digest of their
//! serialised encoding. Nothing here enforces that invariant on write; it
//! is checked from the root down by the tree validator.

use std::collections::HashMap;

use grovedb_costs::{CostResult, CostsExt, OperationCost};
use parking_lot::RwLock;
use tracing::warn;

use crate::{HashTreeError, HashableValue, NodeChange, NodeHash};

/// A value held in a content-addressed store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredNode {
    /// An interior node: one or two child hashes.
    Internal {
        left: NodeHash,
        right: Option<NodeHash>,
    },
    /// A leaf: the entry's hashable encoding.
    Leaf(Vec<HashableValue>),
}

/// Storage keyed by the hash of the stored value.
///
/// Uses `&self` so a store can be shared between the component writing new
/// state and readers such as the validator.
pub trait ContentStore {
    /// Fetch the node stored under `hash`.
    fn get(&self, hash: &NodeHash) -> CostResult<Option<StoredNode>, HashTreeError>;

    /// Store `node` under `hash`, replacing any previous value.
    fn put(&self, hash: NodeHash, node: StoredNode) -> CostResult<(), HashTreeError>;
}

impl<C: ContentStore + ?Sized> ContentStore for std::sync::Arc<C> {
    fn get(&self, hash: &NodeHash) -> CostResult<Option<StoredNode>, HashTreeError> {
        (**self).get(hash)
    }

    fn put(&self, hash: NodeHash, node: StoredNode) -> CostResult<(), HashTreeError> {
        (**self).put(hash, node)
    }
}

/// In-memory content store.
#[derive(Debug, Default)]
pub struct MemContentStore {
    nodes: RwLock<HashMap<NodeHash, StoredNode>>,
}

impl MemContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Whether the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}

impl ContentStore for MemContentStore {
    fn get(&self, hash: &NodeHash) -> CostResult<Option<StoredNode>, HashTreeError> {
        let node = self.nodes.read().get(hash).cloned();
        Ok(node).wrap_with_cost(OperationCost::with_seek_count(1))
    }

    fn put(&self, hash: NodeHash, node: StoredNode) -> CostResult<(), HashTreeError> {
        self.nodes.write().insert(hash, node);
        Ok(()).wrap_with_cost(OperationCost::default())
    }
}

/// Mirrors the nodes written by an incremental update into a
/// [`ContentStore`].
///
/// Feed it every [`NodeChange`] through [`ContentStoreWriter::observe`] and
/// call [`ContentStoreWriter::finish`] to learn whether every write
/// succeeded. The first failure is kept and later writes are skipped.
pub struct ContentStoreWriter<'s, C: ?Sized> {
    store: &'s C,
    written: usize,
    error: Option<HashTreeError>,
}

impl<'s, C: ContentStore + ?Sized> ContentStoreWriter<'s, C> {
    /// Create a writer targeting `store`.
    pub fn new(store: &'s C) -> Self {
        Self {
            store,
            written: 0,
            error: None,
        }
    }

    /// Store the node described by `change`.
    pub fn observe(&mut self, change: NodeChange<'_>) {
        if self.error.is_some() {
            return;
        }
        let (hash, node) = match change {
            NodeChange::Leaf { hash, entry, .. } => (hash, StoredNode::Leaf(entry.to_vec())),
            NodeChange::Internal {
                hash,
                left: Some(left),
                right,
                ..
            } => (hash, StoredNode::Internal { left, right }),
            NodeChange::Internal {
                level,
                index,
                left: None,
                ..
            } => {
                warn!(level, index, "interior node has no left child, not stored");
                return;
            }
        };
        match self.store.put(hash, node).unwrap() {
            Ok(()) => self.written += 1,
            Err(e) => self.error = Some(e),
        }
    }

    /// Number of nodes written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Finish writing, returning the first store failure if any.
    pub fn finish(self) -> Result<usize, HashTreeError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.written),
        }
    }
}
