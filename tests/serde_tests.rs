//! Serialization round trips through serde_json for every collection.

#![cfg(feature = "serde")]

use permafrost::{
    PersistentHashMap, PersistentHashSet, PersistentList, PersistentQueue, PersistentSortedMap,
    PersistentSortedSet, PersistentStack, ValueArray,
};
use rstest::rstest;

// =============================================================================
// Sequences
// =============================================================================

#[rstest]
fn test_list_round_trip() {
    let list: PersistentList<i32> = (0..50).collect();
    let json = serde_json::to_string(&list).unwrap();
    let decoded: PersistentList<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, list);
}

#[rstest]
fn test_list_serializes_in_order() {
    let list = PersistentList::from_slice(&[3, 1, 2]);
    assert_eq!(serde_json::to_string(&list).unwrap(), "[3,1,2]");
}

#[rstest]
fn test_array_round_trip() {
    let array = ValueArray::from_slice(&["a".to_string(), "b".to_string()]);
    let json = serde_json::to_string(&array).unwrap();
    assert_eq!(json, r#"["a","b"]"#);
    let decoded: ValueArray<String> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, array);
}

#[rstest]
fn test_stack_round_trip_preserves_order() {
    let stack = PersistentStack::new().push(1).push(2).push(3);
    let json = serde_json::to_string(&stack).unwrap();
    // Top-first on the wire
    assert_eq!(json, "[3,2,1]");
    let decoded: PersistentStack<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, stack);
    assert_eq!(decoded.peek(), Some(&3));
}

#[rstest]
fn test_queue_round_trip_preserves_order() {
    let queue: PersistentQueue<i32> = (0..10).collect();
    // Exercise the two-stack layout before serializing
    let (queue, _) = queue.dequeue().unwrap();
    let queue = queue.enqueue(100);

    let json = serde_json::to_string(&queue).unwrap();
    let decoded: PersistentQueue<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(
        decoded.iter().copied().collect::<Vec<_>>(),
        queue.iter().copied().collect::<Vec<_>>()
    );
}

// =============================================================================
// Maps
// =============================================================================

#[rstest]
fn test_hash_map_round_trip() {
    let map: PersistentHashMap<String, i32> = (0..50).map(|i| (format!("key{i}"), i)).collect();
    let json = serde_json::to_string(&map).unwrap();
    let decoded: PersistentHashMap<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, map);
}

#[rstest]
fn test_sorted_map_serializes_in_key_order() {
    let map: PersistentSortedMap<String, i32> = [("b".to_string(), 2), ("a".to_string(), 1)]
        .into_iter()
        .collect();
    assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"a":1,"b":2}"#);

    let decoded: PersistentSortedMap<String, i32> =
        serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
    assert_eq!(decoded, map);
}

// =============================================================================
// Sets
// =============================================================================

#[rstest]
fn test_hash_set_round_trip() {
    let set: PersistentHashSet<i32> = (0..50).collect();
    let json = serde_json::to_string(&set).unwrap();
    let decoded: PersistentHashSet<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, set);
}

#[rstest]
fn test_sorted_set_serializes_sorted() {
    let set = PersistentSortedSet::from_elements(vec![3, 1, 2, 1]);
    assert_eq!(serde_json::to_string(&set).unwrap(), "[1,2,3]");
    let decoded: PersistentSortedSet<i32> = serde_json::from_str("[2,3,1]").unwrap();
    assert_eq!(decoded, set);
}

#[rstest]
fn test_duplicate_entries_collapse_on_deserialization() {
    let decoded: PersistentHashSet<i32> = serde_json::from_str("[1,1,2]").unwrap();
    assert_eq!(decoded.len(), 2);

    let map: PersistentHashMap<String, i32> = serde_json::from_str(r#"{"a":1}"#).unwrap();
    assert_eq!(map.get("a"), Some(&1));
}
