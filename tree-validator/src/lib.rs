//! Independent validation of persisted Merkle hash trees.
//!
//! [`MerkleTreeValidator`] re-derives the trees of every Merkle collection
//! in a state from their raw inputs and reports the first node whose
//! persisted hash disagrees. Two storage layouts are understood:
//!
//! - entries stored as a plain array, optionally with their node hashes
//!   persisted alongside;
//! - nodes stored in a [`chain_hash_tree::ContentStore`], walked from the
//!   declared root with a depth bound.
//!
//! [`ValidatorScheduler`] runs a [`Validator`] on a background thread as
//! the chain height advances and stops for good on the first failure.

#![warn(missing_docs)]

mod config;
mod content;
mod direct;
mod error;
mod scheduler;
mod state;
mod validator;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_MAX_DEPTH, DEFAULT_WAIT_TIMEOUT, SchedulerConfig, ValidatorConfig};
pub use error::{Location, ValidationError};
pub use scheduler::ValidatorScheduler;
pub use state::{MerkleLayout, StateSource, StoredMerkle};
pub use validator::{MerkleTreeValidator, Validator};
