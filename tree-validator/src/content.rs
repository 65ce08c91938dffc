//! Validation of collections held in a content-addressed store.
//!
//! Starting from the declared root, every node is fetched under its hash,
//! rehashed from its own content and compared with the hash it was fetched
//! under. Levels are numbered from the leaves, so the root of a collection
//! of `n` entries sits at `level_count(n) - 1`.

use chain_hash_tree::{
    ContentStore, HashSerialiser, HashableValue, NodeHash, OperationCost, StoredNode, level_count,
};
use grovedb_costs::{CostResult, CostsExt};
use sha2::{Digest, Sha256};

use crate::{Location, ValidationError};

/// Walks a content-addressed tree from its root, checking that every node
/// is stored under the hash of its content.
pub(crate) struct ContentWalker<'a, C: ?Sized, S: ?Sized> {
    pub(crate) store: &'a C,
    pub(crate) serialiser: &'a S,
    pub(crate) max_depth: usize,
}

impl<C: ContentStore + ?Sized, S: HashSerialiser + ?Sized> ContentWalker<'_, C, S> {
    /// Check the tree of `entry_count` leaves reachable from
    /// `declared_root`. A collection without a root is valid when it is
    /// empty.
    pub(crate) fn validate(
        &self,
        entry_count: u64,
        declared_root: Option<&NodeHash>,
    ) -> CostResult<(), ValidationError> {
        let mut cost = OperationCost::default();
        let result = match (entry_count, declared_root) {
            (0, None) => Ok(()),
            (0, Some(root)) => Err(ValidationError::mismatch(
                Location::new(0, 0),
                Some(root),
                None,
            )),
            (_, None) => Err(ValidationError::Structure {
                location: Location::new(level_count(entry_count) - 1, 0),
                kind: "absent root",
            }),
            (_, Some(root)) => {
                let top = Location::new(level_count(entry_count) - 1, 0);
                self.visit(root, top, 0, &mut cost)
            }
        };
        result.wrap_with_cost(cost)
    }

    fn visit(
        &self,
        hash: &NodeHash,
        location: Location,
        depth: usize,
        cost: &mut OperationCost,
    ) -> Result<(), ValidationError> {
        if depth > self.max_depth {
            return Err(ValidationError::DepthExceeded {
                max_depth: self.max_depth,
                location,
            });
        }

        let fetched = self.store.get(hash);
        add_cost(cost, fetched.cost());
        let node = fetched
            .unwrap()?
            .ok_or_else(|| ValidationError::MissingNode {
                location,
                hash: *hash,
            })?;

        match node {
            StoredNode::Leaf(entry) => {
                if location.level != 0 {
                    return Err(ValidationError::Structure {
                        location,
                        kind: "leaf",
                    });
                }
                self.check_leaf(hash, &entry, location, cost)
            }
            StoredNode::Internal { left, right } => {
                if location.level == 0 {
                    return Err(ValidationError::Structure {
                        location,
                        kind: "interior",
                    });
                }
                let mut hasher = Sha256::new();
                hasher.update(left);
                if let Some(right) = &right {
                    hasher.update(right);
                }
                let computed: NodeHash = hasher.finalize().into();
                cost.hash_node_calls = cost.hash_node_calls.saturating_add(1);
                if &computed != hash {
                    return Err(ValidationError::mismatch(
                        location,
                        Some(hash),
                        Some(&computed),
                    ));
                }

                let below = location.level - 1;
                self.visit(
                    &left,
                    Location::new(below, location.index * 2),
                    depth + 1,
                    cost,
                )?;
                if let Some(right) = right {
                    self.visit(
                        &right,
                        Location::new(below, location.index * 2 + 1),
                        depth + 1,
                        cost,
                    )?;
                }
                Ok(())
            }
        }
    }

    fn check_leaf(
        &self,
        hash: &NodeHash,
        entry: &[HashableValue],
        location: Location,
        cost: &mut OperationCost,
    ) -> Result<(), ValidationError> {
        let bytes = self.serialiser.serialise(entry)?;
        let computed: NodeHash = Sha256::digest(&bytes).into();
        cost.hash_node_calls = cost.hash_node_calls.saturating_add(1);
        if &computed != hash {
            return Err(ValidationError::mismatch(
                location,
                Some(hash),
                Some(&computed),
            ));
        }
        Ok(())
    }
}

fn add_cost(total: &mut OperationCost, other: &OperationCost) {
    total.seek_count = total.seek_count.saturating_add(other.seek_count);
    total.hash_node_calls = total.hash_node_calls.saturating_add(other.hash_node_calls);
}
