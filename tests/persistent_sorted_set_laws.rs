//! Property-based tests for PersistentSortedSet, including the
//! equivalence of the incremental and bulk-rebuild batch paths.

use std::collections::BTreeSet;

use permafrost::PersistentSortedSet;
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

fn arbitrary_elements(max_size: usize) -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(0i32..500, 0..max_size)
}

fn as_vec(set: &PersistentSortedSet<i32>) -> Vec<i32> {
    set.iter().copied().collect()
}

// =============================================================================
// Ordering Laws
// =============================================================================

proptest! {
    /// Law: iteration is sorted and deduplicated, matching BTreeSet.
    #[test]
    fn prop_matches_btreeset(elements in arbitrary_elements(100)) {
        let model: BTreeSet<i32> = elements.iter().copied().collect();
        let set = PersistentSortedSet::from_elements(elements);
        prop_assert_eq!(set.len(), model.len());
        prop_assert_eq!(as_vec(&set), model.into_iter().collect::<Vec<_>>());
    }

    /// Law: rank addressing inverts iteration order.
    #[test]
    fn prop_rank_is_iteration_position(elements in arbitrary_elements(60)) {
        let set = PersistentSortedSet::from_elements(elements);
        for (position, element) in set.iter().enumerate() {
            prop_assert_eq!(set.get_at(position), Some(element));
            prop_assert_eq!(set.index_of(element), Some(position));
        }
    }

    /// Law: min and max bound every element.
    #[test]
    fn prop_min_max_are_bounds(elements in arbitrary_elements(60)) {
        let set = PersistentSortedSet::from_elements(elements);
        if let (Some(minimum), Some(maximum)) = (set.min(), set.max()) {
            for element in set.iter() {
                prop_assert!(minimum <= element);
                prop_assert!(element <= maximum);
            }
        } else {
            prop_assert!(set.is_empty());
        }
    }
}

// =============================================================================
// Batch Path Equivalence
// =============================================================================

proptest! {
    /// Law: insert_many gives the same result as one-by-one insertion,
    /// whichever internal path (incremental or bulk rebuild) it takes.
    #[test]
    fn prop_batch_paths_agree(
        initial in arbitrary_elements(20),
        batch in arbitrary_elements(200)
    ) {
        let set = PersistentSortedSet::from_elements(initial);

        let mut incremental = set.clone();
        for element in &batch {
            incremental = incremental.insert(*element);
        }

        let batched = set.insert_many(batch);
        prop_assert_eq!(batched, incremental);
    }
}

// =============================================================================
// Algebra Laws
// =============================================================================

proptest! {
    /// Law: the set algebra agrees with the BTreeSet model.
    #[test]
    fn prop_algebra_matches_model(
        left in arbitrary_elements(60),
        right in arbitrary_elements(60)
    ) {
        let left_model: BTreeSet<i32> = left.iter().copied().collect();
        let right_model: BTreeSet<i32> = right.iter().copied().collect();
        let left_set = PersistentSortedSet::from_elements(left);
        let right_set = PersistentSortedSet::from_elements(right);

        prop_assert_eq!(
            as_vec(&left_set.union(&right_set)),
            left_model.union(&right_model).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            as_vec(&left_set.intersection(&right_set)),
            left_model.intersection(&right_model).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            as_vec(&left_set.difference(&right_set)),
            left_model.difference(&right_model).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            as_vec(&left_set.symmetric_difference(&right_set)),
            left_model.symmetric_difference(&right_model).copied().collect::<Vec<_>>()
        );
    }

    /// Law: membership operations leave the original untouched.
    #[test]
    fn prop_persistence(elements in arbitrary_elements(40), probe: i32) {
        let set = PersistentSortedSet::from_elements(elements.clone());
        let _ = set.insert(probe);
        let _ = set.remove(&probe);
        let model: BTreeSet<i32> = elements.into_iter().collect();
        prop_assert_eq!(as_vec(&set), model.into_iter().collect::<Vec<_>>());
    }
}
