use std::fmt;

use chain_hash_tree::{HashTreeError, NodeHash};
use thiserror::Error;

/// Position of a node: level 0 holds the leaves, the highest level the
/// root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Level of the node, counted up from the leaves.
    pub level: u32,
    /// Index of the node within its level.
    pub index: u64,
}

impl Location {
    /// Create a location.
    pub fn new(level: u32, index: u64) -> Self {
        Self { level, index }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.level, self.index)
    }
}

/// Errors raised while validating stored hash trees.
///
/// Any of them stops a running [`crate::ValidatorScheduler`].
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A stored hash differs from the one recomputed from its inputs.
    /// Absent hashes are carried as empty byte strings.
    #[error(
        "hash mismatch at {location}: stored {}, computed {}",
        hex::encode(.expected),
        hex::encode(.computed)
    )]
    HashMismatch {
        location: Location,
        expected: Vec<u8>,
        computed: Vec<u8>,
    },
    /// The content-addressed walk went deeper than allowed.
    #[error("tree depth exceeds maximum of {max_depth} at {location}")]
    DepthExceeded { max_depth: usize, location: Location },
    /// The content-addressed store has nothing under a referenced hash.
    #[error("no node stored under {} at {location}", hex::encode(.hash))]
    MissingNode { location: Location, hash: NodeHash },
    /// A node of the wrong kind for its level: a leaf above level 0, an
    /// interior node at level 0, or no root for a non-empty collection.
    #[error("unexpected {kind} node at {location}")]
    Structure {
        location: Location,
        kind: &'static str,
    },
    /// The state source has no state at the requested height.
    #[error("no state found for height {height}")]
    NoState { height: u64 },
    /// The state source failed to load a state.
    #[error("storage error: {0}")]
    Storage(String),
    /// Serialising an entry or reading the content store failed.
    #[error(transparent)]
    HashTree(#[from] HashTreeError),
}

impl ValidationError {
    /// Build a mismatch error from two optional hashes.
    pub(crate) fn mismatch(
        location: Location,
        expected: Option<&NodeHash>,
        computed: Option<&NodeHash>,
    ) -> Self {
        ValidationError::HashMismatch {
            location,
            expected: expected.map(|h| h.to_vec()).unwrap_or_default(),
            computed: computed.map(|h| h.to_vec()).unwrap_or_default(),
        }
    }

    /// Where in the tree the failure was detected, when known.
    pub fn location(&self) -> Option<Location> {
        match self {
            ValidationError::HashMismatch { location, .. }
            | ValidationError::DepthExceeded { location, .. }
            | ValidationError::MissingNode { location, .. }
            | ValidationError::Structure { location, .. } => Some(*location),
            _ => None,
        }
    }
}
