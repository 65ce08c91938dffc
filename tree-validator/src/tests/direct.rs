use assert_matches::assert_matches;
use chain_hash_tree::{HashTree, MemoryHashTree, MsgPackHashSerialiser};

use super::*;
use crate::{Location, direct::validate_direct};

fn validate(
    entries: &[Vec<HashableValue>],
    stored: Option<&MemoryHashTree>,
    root: Option<&NodeHash>,
) -> Result<(), ValidationError> {
    validate_direct(&MsgPackHashSerialiser, entries, stored, root)
}

fn mismatch_at(result: Result<(), ValidationError>) -> (Location, Vec<u8>, Vec<u8>) {
    match result {
        Err(ValidationError::HashMismatch {
            location,
            expected,
            computed,
        }) => (location, expected, computed),
        other => panic!("expected a hash mismatch, got {other:?}"),
    }
}

#[test]
fn test_legacy_state_is_valid() {
    let entries = legacy_entries();
    let (stored, root) = full_tree(&entries);
    assert_eq!(root, h(LEGACY_ROOT));
    validate(&entries, Some(&stored), Some(&root)).expect("valid");
    validate(&entries, None, Some(&root)).expect("valid without stored nodes");
}

#[test]
fn test_odd_sizes_are_valid() {
    for n in [1usize, 3, 5, 7, 9, 33] {
        let entries: Vec<_> = (0..n)
            .map(|i| vec![HashableValue::UInt(i as u64)])
            .collect();
        let (stored, root) = full_tree(&entries);
        validate(&entries, Some(&stored), Some(&root)).expect("valid");
    }
}

#[test]
fn test_empty_collection_is_valid() {
    validate(&[], None, None).expect("valid");
    validate(&[], None, Some(&BOGUS)).expect("nothing to check");
}

#[test]
fn test_corrupted_leaf_reported_at_its_location() {
    let entries = legacy_entries();
    let (mut stored, root) = full_tree(&entries);
    stored.set_hash(0, 2, BOGUS);

    let (location, expected, computed) =
        mismatch_at(validate(&entries, Some(&stored), Some(&root)));
    assert_eq!(location, Location::new(0, 2));
    assert_eq!(expected, BOGUS.to_vec());
    assert_eq!(computed, h(CHARLIE_LEAF).to_vec());
}

#[test]
fn test_corrupted_interior_reported_at_its_location() {
    let entries = legacy_entries();
    let (mut stored, root) = full_tree(&entries);
    stored.set_hash(1, 1, BOGUS);

    let (location, _, computed) = mismatch_at(validate(&entries, Some(&stored), Some(&root)));
    assert_eq!(location, Location::new(1, 1));
    assert_eq!(computed, h(LEVEL_ONE[1]).to_vec());
}

#[test]
fn test_wrong_declared_root() {
    let entries = legacy_entries();
    let (stored, _) = full_tree(&entries);

    let (location, expected, computed) =
        mismatch_at(validate(&entries, Some(&stored), Some(&BOGUS)));
    assert_eq!(location, Location::new(2, 0));
    assert_eq!(expected, BOGUS.to_vec());
    assert_eq!(computed, h(LEGACY_ROOT).to_vec());

    let (location, expected, _) = mismatch_at(validate(&entries, None, None));
    assert_eq!(location, Location::new(2, 0));
    assert!(expected.is_empty());
}

#[test]
fn test_changed_entry_detected_at_leaf() {
    let entries = legacy_entries();
    let (stored, root) = full_tree(&entries);
    let mut changed = entries.clone();
    changed[2] = vec![HashableValue::from("zulu")];

    let (location, expected, computed) =
        mismatch_at(validate(&changed, Some(&stored), Some(&root)));
    assert_eq!(location, Location::new(0, 2));
    assert_eq!(expected, h(CHARLIE_LEAF).to_vec());
    assert_eq!(computed, h(ZULU_LEAF).to_vec());

    // Without stored nodes only the root can disagree.
    let (location, _, _) = mismatch_at(validate(&changed, None, Some(&root)));
    assert_eq!(location, Location::new(2, 0));
}

#[test]
fn test_extra_stored_node_detected() {
    let entries = legacy_entries();
    let (mut stored, root) = full_tree(&entries);
    stored.set_hash(0, 4, BOGUS);

    let (location, expected, computed) =
        mismatch_at(validate(&entries, Some(&stored), Some(&root)));
    assert_eq!(location, Location::new(0, 4));
    assert_eq!(expected, BOGUS.to_vec());
    assert!(computed.is_empty());
}

#[test]
fn test_missing_stored_node_detected() {
    let entries = legacy_entries();
    let (mut stored, root) = full_tree(&entries);
    stored.remove_hash(1, 0);

    let result = validate(&entries, Some(&stored), Some(&root));
    assert_matches!(
        result,
        Err(ValidationError::HashMismatch { location, ref expected, .. })
            if location == Location::new(1, 0) && expected.is_empty()
    );
}
