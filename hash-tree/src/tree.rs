//! Hash tree storage.
//!
//! Nodes are addressed by `(level, index)`: level 0 holds one hash per
//! entry, and the single node of the highest level is the root. An absent
//! node reads as `None`, which digests as the empty byte string.

use std::collections::HashMap;

use crate::NodeHash;

/// Storage of a binary hash tree's node digests.
pub trait HashTree {
    /// The hash stored at `(level, index)`, or `None` if absent.
    fn get_hash(&self, level: u32, index: u64) -> Option<NodeHash>;

    /// Store `hash` at `(level, index)`.
    fn set_hash(&mut self, level: u32, index: u64, hash: NodeHash);

    /// Delete the node at `(level, index)` if present.
    fn remove_hash(&mut self, level: u32, index: u64);

    /// Delete every level `>= from_level`.
    fn trim(&mut self, from_level: u32);

    /// The node at `(level_count - 1, 0)`, or `None` for a tree with no
    /// levels.
    fn top_hash(&self) -> Option<NodeHash>;
}

/// In-memory hash tree.
///
/// Levels are kept in a `Vec` so they are always numbered `0..level_count`
/// without gaps; writing to a level above the current top creates the
/// intermediate (empty) levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryHashTree {
    levels: Vec<HashMap<u64, NodeHash>>,
}

impl MemoryHashTree {
    /// Create an empty tree with no levels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from dense per-level hash arrays (`levels[level][index]`).
    pub fn from_levels(levels: Vec<Vec<NodeHash>>) -> Self {
        let levels = levels
            .into_iter()
            .map(|hashes| {
                hashes
                    .into_iter()
                    .enumerate()
                    .map(|(i, h)| (i as u64, h))
                    .collect()
            })
            .collect();
        Self { levels }
    }

    /// Number of levels currently held, leaves included.
    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Number of nodes stored on `level`.
    pub fn level_len(&self, level: u32) -> usize {
        self.levels.get(level as usize).map_or(0, HashMap::len)
    }

    /// The nodes stored on `level`, ordered by index.
    pub fn level_nodes(&self, level: u32) -> Vec<(u64, NodeHash)> {
        let mut nodes: Vec<(u64, NodeHash)> = self
            .levels
            .get(level as usize)
            .map(|l| l.iter().map(|(i, h)| (*i, *h)).collect())
            .unwrap_or_default();
        nodes.sort_unstable_by_key(|(i, _)| *i);
        nodes
    }
}

impl HashTree for MemoryHashTree {
    fn get_hash(&self, level: u32, index: u64) -> Option<NodeHash> {
        self.levels.get(level as usize)?.get(&index).copied()
    }

    fn set_hash(&mut self, level: u32, index: u64, hash: NodeHash) {
        let level = level as usize;
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, HashMap::new);
        }
        self.levels[level].insert(index, hash);
    }

    fn remove_hash(&mut self, level: u32, index: u64) {
        if let Some(nodes) = self.levels.get_mut(level as usize) {
            nodes.remove(&index);
        }
    }

    fn trim(&mut self, from_level: u32) {
        self.levels.truncate(from_level as usize);
    }

    fn top_hash(&self) -> Option<NodeHash> {
        self.levels.last()?.get(&0).copied()
    }
}

/// Pending writes layered over an immutable base tree.
///
/// Used to update a persisted snapshot without touching it: reads fall
/// through to the base unless the overlay has written or removed the node.
/// Removals are kept as tombstones so they shadow the base. The base is
/// never trimmed and [`HashTree::top_hash`] reports the base's root; the
/// new root is the one returned by the calculator that drove the updates.
#[derive(Debug)]
pub struct OverlayHashTree<'a, B> {
    base: &'a B,
    overlay: Vec<HashMap<u64, Option<NodeHash>>>,
}

impl<'a, B: HashTree> OverlayHashTree<'a, B> {
    /// Create an overlay with no pending writes.
    pub fn new(base: &'a B) -> Self {
        Self {
            base,
            overlay: Vec::new(),
        }
    }

    /// Whether any node has been written or removed.
    pub fn is_empty(&self) -> bool {
        self.overlay.iter().all(HashMap::is_empty)
    }

    /// The pending writes as `(level, index, hash)`; `None` marks a removal.
    /// Ordered by level, then index.
    pub fn into_changes(self) -> Vec<(u32, u64, Option<NodeHash>)> {
        let mut changes: Vec<(u32, u64, Option<NodeHash>)> = self
            .overlay
            .into_iter()
            .enumerate()
            .flat_map(|(level, nodes)| {
                nodes
                    .into_iter()
                    .map(move |(index, hash)| (level as u32, index, hash))
            })
            .collect();
        changes.sort_unstable_by_key(|(level, index, _)| (*level, *index));
        changes
    }

    fn record(&mut self, level: u32, index: u64, hash: Option<NodeHash>) {
        let level = level as usize;
        if self.overlay.len() <= level {
            self.overlay.resize_with(level + 1, HashMap::new);
        }
        self.overlay[level].insert(index, hash);
    }
}

impl<B: HashTree> HashTree for OverlayHashTree<'_, B> {
    fn get_hash(&self, level: u32, index: u64) -> Option<NodeHash> {
        match self
            .overlay
            .get(level as usize)
            .and_then(|nodes| nodes.get(&index))
        {
            Some(written) => *written,
            None => self.base.get_hash(level, index),
        }
    }

    fn set_hash(&mut self, level: u32, index: u64, hash: NodeHash) {
        self.record(level, index, Some(hash));
    }

    fn remove_hash(&mut self, level: u32, index: u64) {
        self.record(level, index, None);
    }

    fn trim(&mut self, _from_level: u32) {}

    fn top_hash(&self) -> Option<NodeHash> {
        self.base.top_hash()
    }
}
