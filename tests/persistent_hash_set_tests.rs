//! Integration tests for PersistentHashSet and its set algebra.

use permafrost::{PersistentHashSet, TransientHashSet};
use rstest::rstest;

// =============================================================================
// Basic operations
// =============================================================================

#[rstest]
fn test_insert_contains_remove() {
    let set = PersistentHashSet::new().insert("a").insert("b");
    assert_eq!(set.len(), 2);
    assert!(set.contains("a"));
    assert!(!set.contains("c"));

    let removed = set.remove("a");
    assert!(!removed.contains("a"));
    assert!(removed.contains("b"));
    assert!(set.contains("a")); // Original unchanged
}

#[rstest]
fn test_duplicate_insert_does_not_grow() {
    let set = PersistentHashSet::new().insert(1).insert(1).insert(1);
    assert_eq!(set.len(), 1);
}

#[rstest]
fn test_insert_many_and_remove_many() {
    let set = PersistentHashSet::new().insert_many(0..100);
    assert_eq!(set.len(), 100);
    let trimmed = set.remove_many(0..50);
    assert_eq!(trimmed.len(), 50);
    assert!(trimmed.contains(&75));
}

#[rstest]
fn test_borrowed_element_lookup() {
    let set: PersistentHashSet<String> = ["alpha".to_string()].into_iter().collect();
    assert!(set.contains("alpha"));
    assert_eq!(set.get_stored("alpha"), Some(&"alpha".to_string()));
}

// =============================================================================
// Set algebra
// =============================================================================

#[rstest]
fn test_union() {
    let left: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    let right: PersistentHashSet<i32> = [3, 4, 5].into_iter().collect();
    let union = left.union(&right);
    assert_eq!(union.len(), 5);
    for value in 1..=5 {
        assert!(union.contains(&value));
    }
}

#[rstest]
fn test_intersection_and_difference() {
    let left: PersistentHashSet<i32> = [1, 2, 3, 4].into_iter().collect();
    let right: PersistentHashSet<i32> = [3, 4, 5, 6].into_iter().collect();

    let intersection = left.intersection(&right);
    assert_eq!(intersection, [3, 4].into_iter().collect());

    let difference = left.difference(&right);
    assert_eq!(difference, [1, 2].into_iter().collect());

    let symmetric = left.symmetric_difference(&right);
    assert_eq!(symmetric, [1, 2, 5, 6].into_iter().collect());
}

#[rstest]
fn test_relations() {
    let small: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    let large: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    let disjoint: PersistentHashSet<i32> = [10, 11].into_iter().collect();

    assert!(small.is_subset(&large));
    assert!(small.is_subset(&small));
    assert!(large.is_superset(&small));
    assert!(!small.is_superset(&large));
    assert!(small.is_disjoint(&disjoint));
    assert!(!small.is_disjoint(&large));
}

#[rstest]
fn test_operations_with_empty_sets() {
    let set: PersistentHashSet<i32> = [1, 2].into_iter().collect();
    let empty = PersistentHashSet::new();

    assert_eq!(set.union(&empty), set);
    assert_eq!(set.intersection(&empty), empty);
    assert_eq!(set.difference(&empty), set);
    assert_eq!(empty.difference(&set), empty);
    assert!(empty.is_subset(&set));
    assert!(empty.is_disjoint(&empty));
}

// =============================================================================
// Transient staging
// =============================================================================

#[rstest]
fn test_transient_build_and_freeze() {
    let mut builder = TransientHashSet::new();
    for value in 0..500 {
        assert!(builder.insert(value));
        assert!(!builder.insert(value));
    }
    let set = builder.into_persistent();
    assert_eq!(set.len(), 500);
}

#[rstest]
fn test_transient_remove_reports_presence() {
    let set: PersistentHashSet<i32> = [1, 2, 3].into_iter().collect();
    let mut builder = set.to_transient();
    assert!(builder.remove(&2));
    assert!(!builder.remove(&2));
    assert_eq!(builder.len(), 2);
    assert_eq!(set.len(), 3);
}

// =============================================================================
// Equality
// =============================================================================

#[rstest]
fn test_equality_is_order_insensitive() {
    let forward: PersistentHashSet<i32> = (0..30).collect();
    let backward: PersistentHashSet<i32> = (0..30).rev().collect();
    assert_eq!(forward, backward);
    assert_ne!(forward, forward.remove(&0));
}
