//! Validation of collections stored as a plain entry array.
//!
//! The tree is rebuilt here from the raw entries with its own hashing code
//! rather than through the calculators of `chain-hash-tree`, so that a
//! fault in those calculators shows up as a mismatch instead of being
//! reproduced.

use std::collections::HashMap;

use chain_hash_tree::{HashSerialiser, HashTree, HashableValue, MemoryHashTree, NodeHash};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{Location, ValidationError};

/// Rebuild every level from `entries` and check it against `stored_tree`
/// (node by node, leaves first) and then against `declared_root`.
///
/// An empty collection is valid whatever is declared.
pub(crate) fn validate_direct<S: HashSerialiser + ?Sized>(
    serialiser: &S,
    entries: &[Vec<HashableValue>],
    stored_tree: Option<&MemoryHashTree>,
    declared_root: Option<&NodeHash>,
) -> Result<(), ValidationError> {
    if entries.is_empty() {
        return Ok(());
    }

    let mut leaves: HashMap<u64, NodeHash> = HashMap::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let bytes = serialiser.serialise(entry)?;
        leaves.insert(index as u64, Sha256::digest(&bytes).into());
    }

    let mut tree: Vec<HashMap<u64, NodeHash>> = vec![leaves];
    let mut nodes = entries.len() as u64;
    // Always hash at least once above the leaves, even for a single entry.
    loop {
        nodes = nodes.div_ceil(2);
        let below = &tree[tree.len() - 1];
        let mut level = HashMap::with_capacity(nodes as usize);
        for node in 0..nodes {
            let mut hasher = Sha256::new();
            for branch in 0..2 {
                if let Some(child) = below.get(&(node * 2 + branch)) {
                    hasher.update(child);
                }
            }
            level.insert(node, hasher.finalize().into());
        }
        tree.push(level);
        if nodes == 1 {
            break;
        }
    }

    if let Some(stored) = stored_tree {
        compare_stored(&tree, stored)?;
    }

    let top = Location::new(tree.len() as u32 - 1, 0);
    let computed_root = tree[top.level as usize].get(&0);
    if declared_root != computed_root {
        return Err(ValidationError::mismatch(top, declared_root, computed_root));
    }
    debug!(
        entries = entries.len(),
        levels = tree.len(),
        "direct merkle verified"
    );
    Ok(())
}

/// Compare persisted node hashes with the rebuilt levels, leaves first and
/// in index order within a level. Nodes the store holds beyond the rebuilt
/// tree are mismatches too.
fn compare_stored(
    computed: &[HashMap<u64, NodeHash>],
    stored: &MemoryHashTree,
) -> Result<(), ValidationError> {
    let levels = computed.len().max(stored.level_count() as usize);
    for level in 0..levels {
        let rebuilt = computed.get(level);
        let mut indices: Vec<u64> = rebuilt
            .map(|nodes| nodes.keys().copied().collect())
            .unwrap_or_default();
        indices.extend(
            stored
                .level_nodes(level as u32)
                .into_iter()
                .map(|(index, _)| index)
                .filter(|index| rebuilt.is_none_or(|nodes| !nodes.contains_key(index))),
        );
        indices.sort_unstable();

        for index in indices {
            let location = Location::new(level as u32, index);
            let expected = stored.get_hash(location.level, index);
            let actual = rebuilt.and_then(|nodes| nodes.get(&index));
            if expected.as_ref() != actual {
                return Err(ValidationError::mismatch(
                    location,
                    expected.as_ref(),
                    actual,
                ));
            }
        }
    }
    Ok(())
}
