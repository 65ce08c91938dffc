use crate::{HashTreeError, HashableValue};

/// An ordered, indexable collection of entries to be hashed.
///
/// Entry `i` becomes leaf `i` of the tree. Implementations must return the
/// same encoding for the same index for as long as the count is unchanged.
pub trait EntrySource {
    /// Number of entries; valid indices are `0..entry_count()`.
    fn entry_count(&self) -> u64;

    /// The hashable encoding of the entry at `index`.
    fn hashable_encoding(&self, index: u64) -> Result<Vec<HashableValue>, HashTreeError>;
}

impl<T: EntrySource + ?Sized> EntrySource for &T {
    fn entry_count(&self) -> u64 {
        (**self).entry_count()
    }

    fn hashable_encoding(&self, index: u64) -> Result<Vec<HashableValue>, HashTreeError> {
        (**self).hashable_encoding(index)
    }
}

impl EntrySource for [Vec<HashableValue>] {
    fn entry_count(&self) -> u64 {
        self.len() as u64
    }

    fn hashable_encoding(&self, index: u64) -> Result<Vec<HashableValue>, HashTreeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.get(i))
            .cloned()
            .ok_or_else(|| HashTreeError::EntrySource {
                index,
                message: format!("out of range (count={})", self.len()),
            })
    }
}

impl EntrySource for Vec<Vec<HashableValue>> {
    fn entry_count(&self) -> u64 {
        self.as_slice().entry_count()
    }

    fn hashable_encoding(&self, index: u64) -> Result<Vec<HashableValue>, HashTreeError> {
        self.as_slice().hashable_encoding(index)
    }
}
