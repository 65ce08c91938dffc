//! A keyed list of entries that maintains its own hash tree.
//!
//! Mutations only record which indices changed; the tree is brought up to
//! date by the incremental calculator the next time the root hash is
//! requested.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use tracing::debug;

use crate::{
    ContentStore, ContentStoreWriter, EntrySource, HashSerialiser, HashTree, HashTreeError,
    HashableValue, IncrementalTreeCalculator, MemoryHashTree, NodeChange, NodeHash,
};

/// An entry that can live in a [`MerkleList`].
pub trait MerkleEntry {
    /// Unique key of the entry within its list.
    fn key(&self) -> &str;

    /// The hashable encoding of this entry when stored at `index`.
    fn encode(&self, index: u64) -> Vec<HashableValue>;
}

/// Entries exposed as an [`EntrySource`] while the list's tree is borrowed
/// mutably.
struct EntriesView<'a, V>(&'a [V]);

impl<V: MerkleEntry> EntrySource for EntriesView<'_, V> {
    fn entry_count(&self) -> u64 {
        self.0.len() as u64
    }

    fn hashable_encoding(&self, index: u64) -> Result<Vec<HashableValue>, HashTreeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.0.get(i))
            .map(|entry| entry.encode(index))
            .ok_or_else(|| HashTreeError::EntrySource {
                index,
                message: format!("out of range (count={})", self.0.len()),
            })
    }
}

/// Ordered keyed entries with a lazily maintained Merkle root.
///
/// Removal moves the last entry into the vacated slot, so indices stay
/// dense. Every node recomputed while hashing can be mirrored into a
/// [`ContentStore`].
pub struct MerkleList<V, S> {
    entries: Vec<V>,
    key_to_index: HashMap<String, u64>,
    tree: MemoryHashTree,
    unhashed: BTreeSet<u64>,
    calculator: IncrementalTreeCalculator<S>,
    store: Option<Arc<dyn ContentStore + Send + Sync>>,
}

impl<V: MerkleEntry, S: HashSerialiser> MerkleList<V, S> {
    /// Create an empty list.
    pub fn new(serialiser: S) -> Self {
        Self {
            entries: Vec::new(),
            key_to_index: HashMap::new(),
            tree: MemoryHashTree::new(),
            unhashed: BTreeSet::new(),
            calculator: IncrementalTreeCalculator::new(serialiser),
            store: None,
        }
    }

    /// Create a list holding `entries` in order and hash it.
    pub fn from_entries(entries: Vec<V>, serialiser: S) -> Result<Self, HashTreeError> {
        let mut list = Self::new(serialiser);
        for (index, entry) in entries.iter().enumerate() {
            let key = entry.key().to_owned();
            if list.key_to_index.insert(key.clone(), index as u64).is_some() {
                return Err(HashTreeError::DuplicateKey(key));
            }
        }
        list.unhashed = (0..entries.len() as u64).collect();
        list.entries = entries;
        list.flush()?;
        Ok(list)
    }

    /// Mirror every node hashed from now on into `store`.
    pub fn set_content_store(&mut self, store: Arc<dyn ContentStore + Send + Sync>) {
        self.store = Some(store);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in index order.
    pub fn entries(&self) -> &[V] {
        &self.entries
    }

    /// The entry at `index`.
    pub fn get(&self, index: u64) -> Option<&V> {
        self.entries.get(usize::try_from(index).ok()?)
    }

    /// Index of the entry with `key`.
    pub fn find_index(&self, key: &str) -> Option<u64> {
        self.key_to_index.get(key).copied()
    }

    /// The entry with `key`.
    pub fn find(&self, key: &str) -> Option<&V> {
        self.find_index(key).and_then(|index| self.get(index))
    }

    /// Whether an entry with `key` exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.key_to_index.contains_key(key)
    }

    /// Whether mutations are waiting to be hashed.
    pub fn has_unhashed_changes(&self) -> bool {
        !self.unhashed.is_empty()
    }

    /// Replace the entry with the same key, or append it. Returns its index.
    pub fn update(&mut self, entry: V) -> u64 {
        let index = match self.find_index(entry.key()) {
            Some(index) => {
                self.entries[index as usize] = entry;
                index
            }
            None => {
                let index = self.entries.len() as u64;
                self.key_to_index.insert(entry.key().to_owned(), index);
                self.entries.push(entry);
                index
            }
        };
        self.unhashed.insert(index);
        index
    }

    /// Remove the entry with `key`.
    ///
    /// The last entry takes the vacated index. Returns the index the moved
    /// entry used to occupy (the old last index).
    pub fn remove(&mut self, key: &str) -> Result<u64, HashTreeError> {
        let index = self
            .key_to_index
            .remove(key)
            .ok_or_else(|| HashTreeError::UnknownKey(key.to_owned()))?;
        let last_index = (self.entries.len() - 1) as u64;
        self.entries.swap_remove(index as usize);
        if index < last_index {
            let moved_key = self.entries[index as usize].key().to_owned();
            self.key_to_index.insert(moved_key, index);
            self.unhashed.insert(index);
        }
        self.unhashed.insert(last_index);
        Ok(last_index)
    }

    /// The root hash after applying pending changes, `None` when the list
    /// is empty.
    pub fn root_hash(&mut self) -> Result<Option<NodeHash>, HashTreeError> {
        self.flush()?;
        if self.entries.is_empty() {
            return Ok(None);
        }
        Ok(self.tree.top_hash())
    }

    /// The hash tree after applying pending changes.
    pub fn hash_tree(&mut self) -> Result<&MemoryHashTree, HashTreeError> {
        self.flush()?;
        Ok(&self.tree)
    }

    /// Rehash every entry and write every node into `store`, whether or not
    /// it changed. Returns the number of nodes written.
    pub fn publish_to(&mut self, store: &dyn ContentStore) -> Result<usize, HashTreeError> {
        if self.entries.is_empty() {
            self.flush()?;
            return Ok(0);
        }
        let all: BTreeSet<u64> = (0..self.entries.len() as u64).collect();
        let mut writer = ContentStoreWriter::new(store);
        let mut observer = |change: NodeChange<'_>| writer.observe(change);
        self.calculator
            .update(
                &mut self.tree,
                &EntriesView(&self.entries),
                all,
                Some(&mut observer),
            )
            .unwrap()?;
        self.unhashed.clear();
        let written = writer.finish()?;
        debug!(written, entries = self.entries.len(), "published merkle list");
        Ok(written)
    }

    fn flush(&mut self) -> Result<(), HashTreeError> {
        if self.unhashed.is_empty() {
            return Ok(());
        }
        if self.entries.is_empty() {
            // The calculator leaves the tree alone when there is nothing to
            // hash; drop the stale nodes so a later insert starts clean.
            self.tree.trim(0);
            self.unhashed.clear();
            return Ok(());
        }
        let changed = self.unhashed.clone();
        let mut writer = self.store.as_deref().map(ContentStoreWriter::new);
        let mut observer = |change: NodeChange<'_>| {
            if let Some(writer) = writer.as_mut() {
                writer.observe(change);
            }
        };
        let result = self.calculator.update(
            &mut self.tree,
            &EntriesView(&self.entries),
            changed,
            Some(&mut observer),
        );
        let cost = result.cost;
        result.value?;
        if let Some(writer) = writer {
            writer.finish()?;
        }
        debug!(
            changed = self.unhashed.len(),
            hash_calls = cost.hash_node_calls,
            "rehashed merkle list"
        );
        self.unhashed.clear();
        Ok(())
    }
}
