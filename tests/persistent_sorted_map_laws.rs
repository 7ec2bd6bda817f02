//! Property-based tests for PersistentSortedMap against a BTreeMap model.

use std::collections::BTreeMap;

use permafrost::PersistentSortedMap;
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

fn arbitrary_entries(max_size: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((0i32..300, any::<i32>()), 0..max_size)
}

fn build(entries: &[(i32, i32)]) -> PersistentSortedMap<i32, i32> {
    entries.iter().copied().collect()
}

// =============================================================================
// Model Conformance
// =============================================================================

proptest! {
    /// Law: last insert wins, iteration is key-ordered, len matches.
    #[test]
    fn prop_matches_btreemap(entries in arbitrary_entries(100)) {
        let model: BTreeMap<i32, i32> = entries.iter().copied().collect();
        let map = build(&entries);

        prop_assert_eq!(map.len(), model.len());
        prop_assert_eq!(
            map.iter().map(|(key, value)| (*key, *value)).collect::<Vec<_>>(),
            model.into_iter().collect::<Vec<_>>()
        );
    }

    /// Law: get agrees with the model for present and absent keys.
    #[test]
    fn prop_get_matches_model(entries in arbitrary_entries(60), probe in 0i32..400) {
        let model: BTreeMap<i32, i32> = entries.iter().copied().collect();
        let map = build(&entries);
        prop_assert_eq!(map.get(&probe), model.get(&probe));
        prop_assert_eq!(map.contains_key(&probe), model.contains_key(&probe));
    }

    /// Law: remove agrees with the model and leaves the original alone.
    #[test]
    fn prop_remove_matches_model(entries in arbitrary_entries(60), victim in 0i32..400) {
        let mut model: BTreeMap<i32, i32> = entries.iter().copied().collect();
        let map = build(&entries);
        let before = map.len();

        let removed = map.remove(&victim);
        model.remove(&victim);
        prop_assert_eq!(removed.len(), model.len());
        prop_assert_eq!(removed.get(&victim), None);
        prop_assert_eq!(map.len(), before);
    }

    /// Law: rank addressing inverts key-ordered iteration.
    #[test]
    fn prop_rank_is_iteration_position(entries in arbitrary_entries(60)) {
        let map = build(&entries);
        for (position, (key, value)) in map.iter().enumerate() {
            prop_assert_eq!(map.get_at(position), Some((key, value)));
            prop_assert_eq!(map.index_of(key), Some(position));
        }
        prop_assert_eq!(map.get_at(map.len()), None);
    }
}

// =============================================================================
// Transient Laws
// =============================================================================

proptest! {
    /// Law: a transient round trip preserves contents exactly.
    #[test]
    fn prop_transient_round_trip(entries in arbitrary_entries(60)) {
        let map = build(&entries);
        let round_tripped = map.to_transient().into_persistent();
        prop_assert_eq!(round_tripped, map);
    }

    /// Law: staged edits match direct persistent edits.
    #[test]
    fn prop_transient_agrees_with_persistent(
        entries in arbitrary_entries(40),
        edits in arbitrary_entries(40)
    ) {
        let base = build(&entries);

        let mut persistent = base.clone();
        for (key, value) in &edits {
            persistent = persistent.insert(*key, *value);
        }

        let mut transient = base.to_transient();
        for (key, value) in &edits {
            transient.insert(*key, *value);
        }

        prop_assert_eq!(transient.into_persistent(), persistent);
    }
}
