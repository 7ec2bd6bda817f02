//! Integration tests for PersistentSortedSet.

use permafrost::PersistentSortedSet;
use rstest::rstest;

fn as_vec(set: &PersistentSortedSet<i32>) -> Vec<i32> {
    set.iter().copied().collect()
}

// =============================================================================
// Ordering
// =============================================================================

#[rstest]
fn test_iteration_is_sorted_and_deduplicated() {
    let set = PersistentSortedSet::from_elements(vec![5, 1, 3, 1, 5, 2]);
    assert_eq!(as_vec(&set), vec![1, 2, 3, 5]);
    assert_eq!(
        set.iter_reversed().copied().collect::<Vec<_>>(),
        vec![5, 3, 2, 1]
    );
}

#[rstest]
fn test_range_iteration_respects_bounds() {
    let set = PersistentSortedSet::from_elements(vec![1, 3, 5, 7, 9]);
    assert_eq!(set.range(3..=7).copied().collect::<Vec<_>>(), vec![3, 5, 7]);
    assert_eq!(set.range(..5).copied().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(set.range(6..).copied().collect::<Vec<_>>(), vec![7, 9]);
    assert_eq!(set.range(10..).count(), 0);
}

#[rstest]
fn test_rank_addressing() {
    let set = PersistentSortedSet::from_elements(vec![10, 20, 30]);
    assert_eq!(set.get_at(0), Some(&10));
    assert_eq!(set.get_at(2), Some(&30));
    assert_eq!(set.get_at(3), None);
    assert_eq!(set.index_of(&20), Some(1));
    assert_eq!(set.index_of(&25), None);
    assert_eq!(set.min(), Some(&10));
    assert_eq!(set.max(), Some(&30));
}

// =============================================================================
// Persistence
// =============================================================================

#[rstest]
fn test_insert_and_remove_leave_original_untouched() {
    let set = PersistentSortedSet::from_elements(vec![1, 2, 3]);
    let grown = set.insert(4);
    let shrunk = set.remove(&1);

    assert_eq!(as_vec(&set), vec![1, 2, 3]);
    assert_eq!(as_vec(&grown), vec![1, 2, 3, 4]);
    assert_eq!(as_vec(&shrunk), vec![2, 3]);
}

#[rstest]
fn test_duplicate_insert_is_a_no_op() {
    let set = PersistentSortedSet::from_elements(vec![1, 2]);
    let same = set.insert(2);
    assert_eq!(same.len(), 2);
    assert_eq!(same, set);
}

#[rstest]
fn test_get_stored_returns_the_set_element() {
    let set: PersistentSortedSet<String> =
        PersistentSortedSet::from_elements(vec!["alpha".to_string()]);
    assert_eq!(set.get_stored("alpha"), Some(&"alpha".to_string()));
    assert_eq!(set.get_stored("beta"), None);
}

// =============================================================================
// Batch insertion
// =============================================================================

#[rstest]
#[case::incremental_path(vec![1, 2, 3])]
#[case::bulk_rebuild_path((0..400).collect())]
fn test_insert_many_merges_batches(#[case] batch: Vec<i32>) {
    let set: PersistentSortedSet<i32> = (0..20).map(|value| value * 2).collect();
    let mut expected: Vec<i32> = set.iter().chain(batch.iter()).copied().collect();
    expected.sort_unstable();
    expected.dedup();

    let merged = set.insert_many(batch);
    assert_eq!(as_vec(&merged), expected);
    assert_eq!(set.len(), 20); // Original untouched
}

#[rstest]
fn test_remove_many() {
    let set: PersistentSortedSet<i32> = (0..10).collect();
    let remaining = set.remove_many([0, 2, 4, 6, 8, 99]);
    assert_eq!(as_vec(&remaining), vec![1, 3, 5, 7, 9]);
}

// =============================================================================
// Algebra and relations
// =============================================================================

#[rstest]
fn test_set_algebra() {
    let left = PersistentSortedSet::from_elements(vec![1, 2, 3, 4]);
    let right = PersistentSortedSet::from_elements(vec![3, 4, 5, 6]);

    assert_eq!(as_vec(&left.union(&right)), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(as_vec(&left.intersection(&right)), vec![3, 4]);
    assert_eq!(as_vec(&left.difference(&right)), vec![1, 2]);
    assert_eq!(as_vec(&left.symmetric_difference(&right)), vec![1, 2, 5, 6]);
}

#[rstest]
fn test_relations() {
    let small = PersistentSortedSet::from_elements(vec![2, 3]);
    let large = PersistentSortedSet::from_elements(vec![1, 2, 3, 4]);
    let other = PersistentSortedSet::from_elements(vec![10, 11]);

    assert!(small.is_subset(&large));
    assert!(large.is_superset(&small));
    assert!(!large.is_subset(&small));
    assert!(small.is_disjoint(&other));
    assert!(!small.is_disjoint(&large));
}

// =============================================================================
// Transient staging
// =============================================================================

#[rstest]
fn test_transient_round_trip() {
    let set: PersistentSortedSet<i32> = (0..10).collect();
    let mut builder = set.to_transient();
    builder.insert(100);
    builder.remove(&0);
    assert!(builder.contains(&100));

    let frozen = builder.into_persistent();
    assert_eq!(frozen.len(), 10);
    assert_eq!(frozen.min(), Some(&1));
    assert_eq!(frozen.max(), Some(&100));
    assert_eq!(set.len(), 10); // Source unchanged
}

// =============================================================================
// Formatting
// =============================================================================

#[rstest]
fn test_display_is_sorted() {
    let set = PersistentSortedSet::from_elements(vec![3, 1, 2]);
    assert_eq!(format!("{set}"), "{1, 2, 3}");
}
