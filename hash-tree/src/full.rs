//! Full recomputation: every level of the tree built from scratch.

use grovedb_costs::{CostResult, CostsExt, OperationCost};
use tracing::trace;

use crate::{
    hash::{add_hash_call, leaf_hash, level_count, node_hash},
    EntrySource, HashSerialiser, HashTreeError, MemoryHashTree, NodeHash,
};

/// Every level of a tree, `levels[level][index]`, leaves first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullTree {
    levels: Vec<Vec<NodeHash>>,
}

impl FullTree {
    /// All levels, leaves first.
    pub fn levels(&self) -> &[Vec<NodeHash>] {
        &self.levels
    }

    /// Number of levels, leaves included. Always at least 2.
    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// The hash at `(level, index)`, if inside the tree.
    pub fn get_hash(&self, level: u32, index: u64) -> Option<NodeHash> {
        let index = usize::try_from(index).ok()?;
        self.levels.get(level as usize)?.get(index).copied()
    }

    /// The root hash.
    pub fn top_hash(&self) -> NodeHash {
        // A full tree always has at least two levels and one root node.
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    /// Convert into sparse storage that the incremental calculator can
    /// keep updating.
    pub fn into_hash_tree(self) -> MemoryHashTree {
        MemoryHashTree::from_levels(self.levels)
    }
}

/// Builds a complete tree from an entry source.
///
/// Pure: holds no state besides the serialiser, so one calculator can be
/// shared across threads hashing independent sources.
#[derive(Debug, Default, Clone)]
pub struct FullTreeCalculator<S> {
    serialiser: S,
}

impl<S: HashSerialiser> FullTreeCalculator<S> {
    /// Create a calculator using `serialiser` for leaf encodings.
    pub fn new(serialiser: S) -> Self {
        Self { serialiser }
    }

    /// Hash every entry of `entries` and every level above them.
    ///
    /// Returns `None` when there are no entries.
    pub fn compute<E: EntrySource + ?Sized>(
        &self,
        entries: &E,
    ) -> CostResult<Option<FullTree>, HashTreeError> {
        let mut cost = OperationCost::default();
        let entry_count = entries.entry_count();
        if entry_count == 0 {
            return Ok(None).wrap_with_cost(cost);
        }
        let levels = level_count(entry_count);

        let mut leaves = Vec::with_capacity(entry_count as usize);
        for index in 0..entry_count {
            let encoding = cost_return_on_error_no_add!(cost, entries.hashable_encoding(index));
            let bytes = cost_return_on_error_no_add!(cost, self.serialiser.serialise(&encoding));
            leaves.push(leaf_hash(&bytes));
            add_hash_call(&mut cost);
        }

        let mut tree = Vec::with_capacity(levels as usize);
        tree.push(leaves);
        for _ in 1..levels {
            let previous = &tree[tree.len() - 1];
            let next: Vec<NodeHash> = previous
                .chunks(2)
                .map(|pair| {
                    add_hash_call(&mut cost);
                    node_hash(&pair[0], pair.get(1).map(|h| h.as_slice()))
                })
                .collect();
            tree.push(next);
        }

        trace!(
            entry_count,
            levels,
            hash_calls = cost.hash_node_calls,
            "computed full hash tree"
        );
        Ok(Some(FullTree { levels: tree })).wrap_with_cost(cost)
    }
}
