//! Incremental recomputation of an existing tree from a set of changed
//! leaf indices.
//!
//! Only the paths from each changed leaf up to the root are rehashed. The
//! result is identical to a full recomputation over the current entries
//! provided the tree was consistent with the previous entries and every
//! inserted, updated or removed index is in the change set.

use std::collections::BTreeSet;

use grovedb_costs::{CostResult, CostsExt, OperationCost};
use tracing::trace;

use crate::{
    hash::{add_hash_call, leaf_hash, level_count, node_hash, parent_count},
    EntrySource, HashSerialiser, HashTree, HashTreeError, HashableValue, NodeHash,
};

/// A node written during an incremental update.
///
/// Passed to the observer given to [`IncrementalTreeCalculator::update`],
/// typically to mirror new nodes into a content-addressed store.
#[derive(Debug, Clone, Copy)]
pub enum NodeChange<'a> {
    /// A level-0 node rehashed from its entry.
    Leaf {
        index: u64,
        hash: NodeHash,
        entry: &'a [HashableValue],
    },
    /// An interior node rehashed from its children. `right` is `None` when
    /// the node is the odd one out at the end of its level.
    Internal {
        level: u32,
        index: u64,
        hash: NodeHash,
        left: Option<NodeHash>,
        right: Option<NodeHash>,
    },
}

impl NodeChange<'_> {
    /// The new hash of the node.
    pub fn hash(&self) -> NodeHash {
        match self {
            NodeChange::Leaf { hash, .. } | NodeChange::Internal { hash, .. } => *hash,
        }
    }
}

/// Observer of nodes written by an incremental update.
pub type ChangeObserver<'o> = &'o mut dyn FnMut(NodeChange<'_>);

/// Updates a [`HashTree`] in place from changed entry indices.
#[derive(Debug, Default, Clone)]
pub struct IncrementalTreeCalculator<S> {
    serialiser: S,
}

impl<S: HashSerialiser> IncrementalTreeCalculator<S> {
    /// Create a calculator using `serialiser` for leaf encodings.
    pub fn new(serialiser: S) -> Self {
        Self { serialiser }
    }

    /// Rehash the paths above `changed` and return the new root hash.
    ///
    /// An index at or beyond the current entry count means the entry was
    /// removed: its node is deleted and its ancestors are recomputed or
    /// deleted in turn. Levels above the height required by the current
    /// entry count are trimmed afterwards.
    ///
    /// With no entries the tree is left untouched and its current top hash
    /// is returned. The tree must not be updated from two places at once.
    pub fn update<T, E, I>(
        &self,
        tree: &mut T,
        entries: &E,
        changed: I,
        mut on_change: Option<ChangeObserver<'_>>,
    ) -> CostResult<Option<NodeHash>, HashTreeError>
    where
        T: HashTree + ?Sized,
        E: EntrySource + ?Sized,
        I: IntoIterator<Item = u64>,
    {
        let mut cost = OperationCost::default();
        let mut root = tree.top_hash();

        let entry_count = entries.entry_count();
        if entry_count == 0 {
            return Ok(root).wrap_with_cost(cost);
        }
        let levels = level_count(entry_count);
        let mut item_count = entry_count;

        let mut scheduled = BTreeSet::new();
        for index in changed.into_iter().collect::<BTreeSet<u64>>() {
            if index < item_count {
                let encoding = cost_return_on_error_no_add!(cost, entries.hashable_encoding(index));
                let bytes =
                    cost_return_on_error_no_add!(cost, self.serialiser.serialise(&encoding));
                let hash = leaf_hash(&bytes);
                add_hash_call(&mut cost);
                if let Some(observer) = on_change.as_deref_mut() {
                    observer(NodeChange::Leaf {
                        index,
                        hash,
                        entry: &encoding,
                    });
                }
                tree.set_hash(0, index, hash);
                trace!(level = 0, index, hash = %hex::encode(hash), "set leaf hash");
            } else {
                tree.remove_hash(0, index);
            }
            scheduled.insert(index / 2);
        }
        item_count = parent_count(item_count);

        for level in 1..levels {
            let is_top = level == levels - 1;
            let mut next = BTreeSet::new();
            for &index in &scheduled {
                if index < item_count {
                    let left = tree.get_hash(level - 1, index * 2);
                    let right = tree.get_hash(level - 1, index * 2 + 1);
                    let hash = node_hash(
                        left.as_ref().map_or(&[][..], |h| h.as_slice()),
                        right.as_ref().map(|h| h.as_slice()),
                    );
                    add_hash_call(&mut cost);
                    if let Some(observer) = on_change.as_deref_mut() {
                        observer(NodeChange::Internal {
                            level,
                            index,
                            hash,
                            left,
                            right,
                        });
                    }
                    if is_top {
                        root = Some(hash);
                    }
                    tree.set_hash(level, index, hash);
                    trace!(level, index, hash = %hex::encode(hash), "set node hash");
                } else {
                    tree.remove_hash(level, index);
                    if is_top {
                        // The root itself was scheduled for removal; report
                        // whatever is left at the head of the top level.
                        root = tree.get_hash(level, 0);
                    }
                }
                next.insert(index / 2);
            }
            scheduled = next;
            item_count = parent_count(item_count);
        }

        tree.trim(levels);

        trace!(
            hashed = cost.hash_node_calls,
            entry_count,
            "incremental hash update complete"
        );
        Ok(root).wrap_with_cost(cost)
    }
}
