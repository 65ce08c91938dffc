use chain_hash_tree::{ContentStore, HashSerialiser};
use tracing::{debug, error, info};

use crate::{
    MerkleLayout, StateSource, StoredMerkle, ValidationError, ValidatorConfig,
    content::ContentWalker, direct::validate_direct,
};

/// Something that can check the persisted state at a height.
///
/// The scheduler only depends on this trait, so tests and hosts can plug
/// in their own checks.
pub trait Validator {
    /// Check the state at `height`. Any error is fatal to the caller's
    /// validation run.
    fn validate(&self, height: u64) -> Result<(), ValidationError>;
}

/// Re-derives the hash trees of a state's Merkle collections and compares
/// them with what was persisted.
///
/// Direct collections are rebuilt from their entries; content-addressed
/// collections are walked from their declared root through `store`.
pub struct MerkleTreeValidator<St, C, S> {
    state: St,
    store: C,
    serialiser: S,
    config: ValidatorConfig,
}

impl<St, C, S> MerkleTreeValidator<St, C, S>
where
    St: StateSource,
    C: ContentStore,
    S: HashSerialiser,
{
    /// Create a validator reading states from `state` and content-addressed
    /// nodes from `store`.
    pub fn new(state: St, store: C, serialiser: S, config: ValidatorConfig) -> Self {
        Self {
            state,
            store,
            serialiser,
            config,
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    fn validate_merkle(&self, merkle: &StoredMerkle) -> Result<(), ValidationError> {
        match &merkle.layout {
            MerkleLayout::Direct {
                entries,
                stored_tree,
                declared_root,
            } => validate_direct(
                &self.serialiser,
                entries,
                stored_tree.as_ref(),
                declared_root.as_ref(),
            ),
            MerkleLayout::ContentAddressed {
                entry_count,
                declared_root,
            } => {
                let walker = ContentWalker {
                    store: &self.store,
                    serialiser: &self.serialiser,
                    max_depth: self.config.max_depth,
                };
                let result = walker.validate(*entry_count, declared_root.as_ref());
                let seeks = result.cost().seek_count;
                result.unwrap()?;
                debug!(
                    merkle = merkle.name.as_str(),
                    entries = entry_count,
                    seeks,
                    "content-addressed merkle verified"
                );
                Ok(())
            }
        }
    }
}

impl<St, C, S> Validator for MerkleTreeValidator<St, C, S>
where
    St: StateSource,
    C: ContentStore,
    S: HashSerialiser,
{
    fn validate(&self, height: u64) -> Result<(), ValidationError> {
        info!(height, "validating merkle trees");
        let merkles = self.state.merkles_at(height)?;
        for merkle in &merkles {
            if let Err(e) = self.validate_merkle(merkle) {
                error!(height, merkle = merkle.name.as_str(), error = %e, "merkle validation failed");
                return Err(e);
            }
            info!(height, merkle = merkle.name.as_str(), "merkle valid");
        }
        info!(height, merkles = merkles.len(), "merkle trees valid");
        Ok(())
    }
}
