use std::collections::HashMap;

use chain_hash_tree::{
    ContentStoreWriter, FullTreeCalculator, HashableValue, IncrementalTreeCalculator,
    MemContentStore, MemoryHashTree, MsgPackHashSerialiser, NodeChange, NodeHash,
};

use crate::{StateSource, StoredMerkle, ValidationError};

mod direct;

/// Root of `["alpha"], ["bravo"], ["charlie"], ["delta"]` as computed by the
/// legacy network.
const LEGACY_ROOT: &str = "63e81b531f046dd48db1738e387d469472b1ecc85474a3aadb2b7c214190475a";
const CHARLIE_LEAF: &str = "f791ec2c681e37ffc8cec403522a97cc4cbc7d7b66c94d26841281a01d9a1bda";
const ZULU_LEAF: &str = "400af2096d8ac3b0230b924d509a79932b6ec53ce931901ee23e5b27bfad0422";
const LEVEL_ONE: [&str; 2] = [
    "6c399e63cd14d9db73c1debc0837f6bb96c4680ae262aa4ab051e06fdc246c13",
    "c2f8f9ba8de86e778588c7dd79ca601f2d3d9f7f49b5e8b726723d88fac7b341",
];

const BOGUS: NodeHash = [0xee; 32];

fn h(hex_str: &str) -> NodeHash {
    hex::decode(hex_str)
        .expect("valid hex")
        .try_into()
        .expect("32 bytes")
}

fn words(words: &[&str]) -> Vec<Vec<HashableValue>> {
    words.iter().map(|w| vec![HashableValue::from(*w)]).collect()
}

fn legacy_entries() -> Vec<Vec<HashableValue>> {
    words(&["alpha", "bravo", "charlie", "delta"])
}

fn full_tree(entries: &[Vec<HashableValue>]) -> (MemoryHashTree, NodeHash) {
    let tree = FullTreeCalculator::new(MsgPackHashSerialiser)
        .compute(entries)
        .unwrap()
        .expect("full compute")
        .expect("non-empty");
    let root = tree.top_hash();
    (tree.into_hash_tree(), root)
}

/// Store every node of the tree over `entries` and return the root.
fn content_store(entries: &[Vec<HashableValue>]) -> (MemContentStore, Option<NodeHash>) {
    let store = MemContentStore::new();
    let mut writer = ContentStoreWriter::new(&store);
    let mut observer = |change: NodeChange<'_>| writer.observe(change);
    let mut tree = MemoryHashTree::new();
    let root = IncrementalTreeCalculator::new(MsgPackHashSerialiser)
        .update(
            &mut tree,
            entries,
            0..entries.len() as u64,
            Some(&mut observer),
        )
        .unwrap()
        .expect("update");
    writer.finish().expect("writes");
    (store, root)
}

/// States keyed by height.
#[derive(Default)]
struct MemState {
    states: HashMap<u64, Vec<StoredMerkle>>,
}

impl StateSource for MemState {
    fn merkles_at(&self, height: u64) -> Result<Vec<StoredMerkle>, ValidationError> {
        self.states
            .get(&height)
            .cloned()
            .ok_or(ValidationError::NoState { height })
    }
}
