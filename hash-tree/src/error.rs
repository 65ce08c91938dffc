use thiserror::Error;

/// Errors from hash tree construction and maintenance.
#[derive(Debug, Error)]
pub enum HashTreeError {
    /// An entry could not be encoded for hashing.
    #[error("serialise error: {0}")]
    Serialise(String),
    /// The entry source could not produce the entry at `index`.
    #[error("entry source error at index {index}: {message}")]
    EntrySource { index: u64, message: String },
    /// A content store rejected a read or write.
    #[error("store error: {0}")]
    Store(String),
    #[error("key {0:?} is already present")]
    DuplicateKey(String),
    #[error("key {0:?} not found")]
    UnknownKey(String),
}
