//! Thread-local pool of reusable enumeration-stack buffers.
//!
//! Enumerating a parent-less tree needs a stack of "nodes whose right
//! subtree is still unvisited". Owning iterators check such a buffer out
//! of a per-thread, type-keyed free list instead of allocating a fresh
//! one for every enumeration, and return it (cleared) on disposal.
//!
//! Every checkout is tagged with a monotonically increasing [`Ticket`]
//! that is never reused while live. A handle whose buffer has already
//! been returned reports [`PoolError::UsedAfterDispose`] instead of
//! silently touching pooled state. Borrowed iterators do not use the
//! pool at all; their stacks live inline (see `avl::InOrderIter`).

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use arrayvec::ArrayVec;

use crate::error::{PoolError, TransientError};

/// Upper bound on buffers retained per element type. Checkouts beyond
/// this bound still work; their buffers are simply dropped on return.
pub(crate) const POOL_CAPACITY: usize = 35;

/// Version sentinel captured by enumerators over frozen collections,
/// which can never change underneath them.
pub(crate) const FROZEN_VERSION: u64 = u64::MAX;

/// A capability token identifying the current borrower of a pooled buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

impl Ticket {
    pub(crate) const fn value(self) -> u64 {
        self.0
    }
}

type FreeList<T> = ArrayVec<Vec<T>, POOL_CAPACITY>;

thread_local! {
    static NEXT_TICKET: Cell<u64> = const { Cell::new(1) };
    static FREE_LISTS: RefCell<HashMap<TypeId, Box<dyn Any>>> =
        RefCell::new(HashMap::new());
}

fn issue_ticket() -> Ticket {
    NEXT_TICKET.with(|counter| {
        let ticket = counter.get();
        counter.set(ticket + 1);
        Ticket(ticket)
    })
}

/// A traversal-stack buffer checked out of the thread-local pool.
///
/// Dropping the handle returns the buffer; any later access through a
/// surviving handle is a reported error, never silent corruption.
pub(crate) struct PooledStack<T: 'static> {
    ticket: Ticket,
    buffer: Option<Vec<T>>,
}

impl<T: 'static> PooledStack<T> {
    /// Checks a buffer out of the pool (or starts a fresh one) under a
    /// newly issued ticket.
    pub(crate) fn acquire() -> Self {
        let buffer = FREE_LISTS
            .with(|lists| {
                let mut lists = lists.borrow_mut();
                lists
                    .get_mut(&TypeId::of::<T>())
                    .and_then(|entry| entry.downcast_mut::<FreeList<T>>())
                    .and_then(|free_list| free_list.pop())
            })
            .unwrap_or_default();
        Self {
            ticket: issue_ticket(),
            buffer: Some(buffer),
        }
    }

    pub(crate) const fn ticket(&self) -> Ticket {
        self.ticket
    }

    fn buffer_mut(&mut self) -> Result<&mut Vec<T>, PoolError> {
        self.buffer.as_mut().ok_or(PoolError::UsedAfterDispose {
            ticket: self.ticket.0,
        })
    }

    pub(crate) fn push(&mut self, item: T) -> Result<(), PoolError> {
        self.buffer_mut()?.push(item);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Option<T>, PoolError> {
        Ok(self.buffer_mut()?.pop())
    }

    /// Returns the buffer to the free list keyed by element type.
    ///
    /// Clearing is skipped for buffers that are already empty. When the
    /// free list is full the buffer is dropped instead of retained.
    pub(crate) fn dispose(&mut self) {
        let Some(mut buffer) = self.buffer.take() else {
            return;
        };
        if !buffer.is_empty() {
            buffer.clear();
        }
        FREE_LISTS.with(|lists| {
            let mut lists = lists.borrow_mut();
            let entry = lists
                .entry(TypeId::of::<T>())
                .or_insert_with(|| Box::new(FreeList::<T>::new()));
            if let Some(free_list) = entry.downcast_mut::<FreeList<T>>() {
                let _ = free_list.try_push(buffer);
            }
        });
    }
}

impl<T: 'static> Drop for PooledStack<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Checks a builder version captured at enumerator creation against the
/// current one. [`FROZEN_VERSION`] always passes.
pub(crate) const fn guard_version(expected: u64, actual: u64) -> Result<(), TransientError> {
    if expected == FROZEN_VERSION || expected == actual {
        Ok(())
    } else {
        Err(TransientError::ConcurrentModification { expected, actual })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_tickets_are_monotonic_and_unique() {
        let first: PooledStack<i32> = PooledStack::acquire();
        let second: PooledStack<i32> = PooledStack::acquire();
        assert!(second.ticket().value() > first.ticket().value());
    }

    #[rstest]
    fn test_buffer_round_trips_through_free_list() {
        let reused_capacity = {
            let mut stack: PooledStack<i32> = PooledStack::acquire();
            for value in 0..100 {
                stack.push(value).unwrap();
            }
            stack.dispose();
            // The cleared buffer is back in the free list; the next
            // checkout of the same element type reuses its allocation.
            let stack: PooledStack<i32> = PooledStack::acquire();
            stack.buffer.as_ref().map(|buffer| buffer.capacity())
        };
        assert!(reused_capacity.unwrap_or(0) >= 100);
    }

    #[rstest]
    fn test_use_after_dispose_is_reported() {
        let mut stack: PooledStack<String> = PooledStack::acquire();
        let ticket = stack.ticket().value();
        stack.dispose();
        assert_eq!(
            stack.push("late".to_string()),
            Err(PoolError::UsedAfterDispose { ticket })
        );
        assert_eq!(stack.pop(), Err(PoolError::UsedAfterDispose { ticket }));
    }

    #[rstest]
    fn test_dispose_twice_is_harmless() {
        let mut stack: PooledStack<i32> = PooledStack::acquire();
        stack.dispose();
        stack.dispose();
    }

    #[rstest]
    fn test_free_list_is_bounded() {
        let stacks: Vec<PooledStack<u8>> =
            (0..POOL_CAPACITY + 10).map(|_| PooledStack::acquire()).collect();
        drop(stacks);
        FREE_LISTS.with(|lists| {
            let lists = lists.borrow();
            let free_list = lists
                .get(&TypeId::of::<u8>())
                .and_then(|entry| entry.downcast_ref::<FreeList<u8>>())
                .expect("free list for u8 exists");
            assert!(free_list.len() <= POOL_CAPACITY);
        });
    }

    #[rstest]
    fn test_guard_version_accepts_frozen_sentinel() {
        assert!(guard_version(FROZEN_VERSION, 12345).is_ok());
        assert!(guard_version(3, 3).is_ok());
        assert_eq!(
            guard_version(3, 4),
            Err(TransientError::ConcurrentModification {
                expected: 3,
                actual: 4
            })
        );
    }
}
