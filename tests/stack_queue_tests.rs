//! Integration tests for PersistentStack and PersistentQueue.

use std::collections::VecDeque;

use permafrost::{PersistentQueue, PersistentStack};
use proptest::prelude::*;
use rstest::rstest;

// =============================================================================
// Stack
// =============================================================================

#[rstest]
fn test_stack_push_peek_pop() {
    let stack = PersistentStack::new().push(1).push(2).push(3);
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.peek(), Some(&3));

    let (rest, top) = stack.pop().unwrap();
    assert_eq!(top, 3);
    assert_eq!(rest.len(), 2);
    assert_eq!(stack.len(), 3); // Original unchanged
}

#[rstest]
fn test_stack_empty_behaviour() {
    let stack: PersistentStack<i32> = PersistentStack::new();
    assert!(stack.is_empty());
    assert!(stack.pop().is_none());
    assert!(stack.peek().is_none());
}

#[rstest]
fn test_stack_versions_branch_from_shared_tail() {
    let base = PersistentStack::new().push(1).push(2);
    let left = base.push(10);
    let right = base.push(20);

    assert_eq!(left.iter().copied().collect::<Vec<_>>(), vec![10, 2, 1]);
    assert_eq!(right.iter().copied().collect::<Vec<_>>(), vec![20, 2, 1]);
    assert_eq!(base.iter().copied().collect::<Vec<_>>(), vec![2, 1]);
}

#[rstest]
fn test_stack_deep_drop_does_not_overflow() {
    // Dropping a long chain must not recurse node by node
    let mut stack = PersistentStack::new();
    for value in 0..100_000 {
        stack = stack.push(value);
    }
    assert_eq!(stack.len(), 100_000);
    let mut remaining = stack;
    while let Some((rest, _)) = remaining.pop() {
        remaining = rest;
    }
    assert!(remaining.is_empty());
}

// =============================================================================
// Queue
// =============================================================================

#[rstest]
fn test_queue_enqueue_peek_dequeue() {
    let queue = PersistentQueue::new().enqueue(1).enqueue(2).enqueue(3);
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.peek(), Some(&1));

    let (rest, front) = queue.dequeue().unwrap();
    assert_eq!(front, 1);
    assert_eq!(rest.peek(), Some(&2));
    assert_eq!(queue.len(), 3); // Original unchanged
}

#[rstest]
fn test_queue_empty_behaviour() {
    let queue: PersistentQueue<i32> = PersistentQueue::new();
    assert!(queue.is_empty());
    assert!(queue.dequeue().is_none());
    assert!(queue.peek().is_none());
}

#[rstest]
fn test_queue_iteration_order() {
    let queue: PersistentQueue<i32> = (0..10).collect();
    assert_eq!(
        queue.iter().copied().collect::<Vec<_>>(),
        (0..10).collect::<Vec<_>>()
    );
}

#[rstest]
fn test_queue_drain_after_interleaving() {
    let mut queue = PersistentQueue::new();
    for value in 0..5 {
        queue = queue.enqueue(value);
    }
    // Drain two, add two more, then drain everything
    let (queue, first) = queue.dequeue().unwrap();
    let (queue, second) = queue.dequeue().unwrap();
    assert_eq!((first, second), (0, 1));

    let queue = queue.enqueue(100).enqueue(101);
    let drained: Vec<i32> = queue.into_iter().collect();
    assert_eq!(drained, vec![2, 3, 4, 100, 101]);
}

// =============================================================================
// Queue model conformance
// =============================================================================

proptest! {
    /// Law: an arbitrary enqueue/dequeue interleaving matches VecDeque.
    #[test]
    fn prop_queue_matches_vecdeque(
        operations in prop::collection::vec(prop::option::of(any::<i32>()), 0..200)
    ) {
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut queue: PersistentQueue<i32> = PersistentQueue::new();

        for operation in operations {
            match operation {
                Some(value) => {
                    model.push_back(value);
                    queue = queue.enqueue(value);
                }
                None => {
                    let expected = model.pop_front();
                    match queue.dequeue() {
                        Some((rest, front)) => {
                            prop_assert_eq!(Some(front), expected);
                            queue = rest;
                        }
                        None => prop_assert_eq!(expected, None),
                    }
                }
            }
            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.peek(), model.front());
        }
    }

    /// Law: stack iteration is the reverse of push order.
    #[test]
    fn prop_stack_reverses_push_order(elements in prop::collection::vec(any::<i32>(), 0..100)) {
        let stack: PersistentStack<i32> = elements.iter().copied().collect();
        let mut expected = elements;
        expected.reverse();
        prop_assert_eq!(stack.iter().copied().collect::<Vec<_>>(), expected);
    }
}
