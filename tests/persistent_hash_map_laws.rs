//! Property-based tests for PersistentHashMap, checked against the
//! standard HashMap as a model.

use std::collections::HashMap;

use permafrost::PersistentHashMap;
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

fn arbitrary_entries(max_size: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((any::<i32>(), any::<i32>()), 0..max_size)
}

// =============================================================================
// Get-Insert Laws
// =============================================================================

proptest! {
    /// Law: get after insert returns the inserted value.
    #[test]
    fn prop_get_insert_law(entries in arbitrary_entries(30), key: i32, value: i32) {
        let map: PersistentHashMap<i32, i32> = entries.into_iter().collect();
        let inserted = map.insert(key, value);
        prop_assert_eq!(inserted.get(&key), Some(&value));
    }

    /// Law: insert does not affect other keys.
    #[test]
    fn prop_insert_other_keys_law(
        entries in arbitrary_entries(30),
        key1: i32,
        key2: i32,
        value: i32
    ) {
        prop_assume!(key1 != key2);
        let map: PersistentHashMap<i32, i32> = entries.into_iter().collect();
        let inserted = map.insert(key1, value);
        prop_assert_eq!(inserted.get(&key2), map.get(&key2));
    }

    /// Law: get after remove returns None, other keys unaffected.
    #[test]
    fn prop_remove_law(entries in arbitrary_entries(30), key1: i32, key2: i32) {
        prop_assume!(key1 != key2);
        let map: PersistentHashMap<i32, i32> = entries.into_iter().collect();
        let removed = map.remove(&key1);
        prop_assert_eq!(removed.get(&key1), None);
        prop_assert_eq!(removed.get(&key2), map.get(&key2));
    }
}

// =============================================================================
// Model Conformance
// =============================================================================

proptest! {
    /// Law: collecting a pair sequence gives the same bindings as HashMap.
    #[test]
    fn prop_matches_std_hashmap(entries in arbitrary_entries(100)) {
        let model: HashMap<i32, i32> = entries.iter().copied().collect();
        let map: PersistentHashMap<i32, i32> = entries.into_iter().collect();

        prop_assert_eq!(map.len(), model.len());
        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(value));
        }
        for (key, value) in map.iter() {
            prop_assert_eq!(model.get(key), Some(value));
        }
    }

    /// Law: a random interleaving of inserts and removes matches the model.
    #[test]
    fn prop_interleaved_operations_match_model(
        operations in prop::collection::vec((any::<bool>(), 0i32..50, any::<i32>()), 0..120)
    ) {
        let mut model: HashMap<i32, i32> = HashMap::new();
        let mut map: PersistentHashMap<i32, i32> = PersistentHashMap::new();

        for (is_insert, key, value) in operations {
            if is_insert {
                model.insert(key, value);
                map = map.insert(key, value);
            } else {
                model.remove(&key);
                map = map.remove(&key);
            }
            prop_assert_eq!(map.len(), model.len());
        }
        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(value));
        }
    }
}

// =============================================================================
// Persistence and Identity Laws
// =============================================================================

proptest! {
    /// Law: mutating never changes the original version.
    #[test]
    fn prop_original_survives_mutation(entries in arbitrary_entries(40), key: i32, value: i32) {
        let map: PersistentHashMap<i32, i32> = entries.clone().into_iter().collect();
        let before: HashMap<i32, i32> = entries.into_iter().collect();

        let _ = map.insert(key, value);
        let _ = map.remove(&key);

        prop_assert_eq!(map.len(), before.len());
        for (stored_key, stored_value) in &before {
            prop_assert_eq!(map.get(stored_key), Some(stored_value));
        }
    }

    /// Law: re-inserting every existing binding is a no-op by equality.
    #[test]
    fn prop_reinsert_is_identity(entries in arbitrary_entries(40)) {
        let map: PersistentHashMap<i32, i32> = entries.into_iter().collect();
        let reinserted = map.insert_many(map.iter().map(|(key, value)| (*key, *value)));
        prop_assert_eq!(reinserted, map);
    }

    /// Law: the transient round trip is the identity.
    #[test]
    fn prop_transient_round_trip_is_identity(entries in arbitrary_entries(60)) {
        let map: PersistentHashMap<i32, i32> = entries.into_iter().collect();
        prop_assert_eq!(map.to_transient().into_persistent(), map);
    }
}
