//! A shared cell for applying pure transformations to a persistent
//! collection with optimistic concurrency.
//!
//! The transformation runs *outside* the critical section against a
//! cheap O(1) snapshot clone. Publication then only succeeds when no
//! other writer got in between (detected with a version stamp); a lost
//! race re-reads and re-applies the transformation.
//!
//! With the `arc` feature the persistent collections are `Send + Sync`
//! and a [`CollectionCell`] can be shared across threads; without it
//! the cell still provides the same retry semantics for re-entrant
//! single-thread use.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::{CollectionCell, PersistentList};
//!
//! let cell = CollectionCell::new(PersistentList::new());
//! cell.update(|list| list.push_back(1));
//! cell.update(|list| list.push_back(2));
//! assert_eq!(cell.load().len(), 2);
//! ```

use parking_lot::Mutex;

use crate::error::CellError;

// =============================================================================
// CollectionCell Definition
// =============================================================================

/// A mutable location holding a persistent collection, updated through
/// pure transformations with compare-and-swap publication.
pub struct CollectionCell<C> {
    slot: Mutex<Stamped<C>>,
}

struct Stamped<C> {
    /// Bumped on every successful publication.
    stamp: u64,
    value: C,
}

impl<C: Clone> CollectionCell<C> {
    /// Creates a cell holding `value`.
    #[must_use]
    pub const fn new(value: C) -> Self {
        Self {
            slot: Mutex::new(Stamped { stamp: 0, value }),
        }
    }

    /// Returns a snapshot of the current value.
    ///
    /// Persistent collections clone in O(1), so this is cheap.
    #[must_use]
    pub fn load(&self) -> C {
        self.slot.lock().value.clone()
    }

    /// Replaces the current value unconditionally.
    pub fn store(&self, value: C) {
        let mut slot = self.slot.lock();
        slot.stamp += 1;
        slot.value = value;
    }

    /// Replaces the current value, returning the previous one.
    #[must_use]
    pub fn swap(&self, value: C) -> C {
        let mut slot = self.slot.lock();
        slot.stamp += 1;
        std::mem::replace(&mut slot.value, value)
    }

    /// Publishes `value` only when the cell still holds the snapshot
    /// taken at `expected` stamp. Returns the fresh snapshot on failure.
    fn compare_exchange(&self, expected: u64, value: C) -> Result<(), (u64, C)> {
        let mut slot = self.slot.lock();
        if slot.stamp == expected {
            slot.stamp += 1;
            slot.value = value;
            Ok(())
        } else {
            Err((slot.stamp, slot.value.clone()))
        }
    }

    fn snapshot(&self) -> (u64, C) {
        let slot = self.slot.lock();
        (slot.stamp, slot.value.clone())
    }

    /// Applies `transform` to the current value and publishes the
    /// result, retrying for as long as concurrent writers interfere.
    ///
    /// `transform` must be pure: it can run any number of times and its
    /// discarded results must have no side effects. It executes outside
    /// the critical section, so it may be arbitrarily slow without
    /// blocking readers.
    ///
    /// Returns the published value.
    pub fn update<F>(&self, mut transform: F) -> C
    where
        F: FnMut(&C) -> C,
    {
        let (mut stamp, mut current) = self.snapshot();
        loop {
            let next = transform(&current);
            match self.compare_exchange(stamp, next.clone()) {
                Ok(()) => return next,
                Err((fresh_stamp, fresh_value)) => {
                    stamp = fresh_stamp;
                    current = fresh_value;
                }
            }
        }
    }

    /// Like [`Self::update`], but gives up after `max_attempts` lost
    /// races.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::RetriesExhausted`] when every attempt lost
    /// the race; the cell is left holding the other writers' value.
    pub fn try_update<F>(&self, mut transform: F, max_attempts: usize) -> Result<C, CellError>
    where
        F: FnMut(&C) -> C,
    {
        let (mut stamp, mut current) = self.snapshot();
        for _ in 0..max_attempts {
            let next = transform(&current);
            match self.compare_exchange(stamp, next.clone()) {
                Ok(()) => return Ok(next),
                Err((fresh_stamp, fresh_value)) => {
                    stamp = fresh_stamp;
                    current = fresh_value;
                }
            }
        }
        Err(CellError::RetriesExhausted {
            attempts: max_attempts,
        })
    }
}

impl<C: Clone + Default> Default for CollectionCell<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C: Clone + std::fmt::Debug> std::fmt::Debug for CollectionCell<C> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CollectionCell")
            .field("value", &self.load())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::PersistentList;
    use rstest::rstest;

    #[rstest]
    fn test_update_applies_transformation() {
        let cell = CollectionCell::new(PersistentList::new());
        let published = cell.update(|list| list.push_back(1));
        assert_eq!(published.len(), 1);
        assert_eq!(cell.load().len(), 1);
    }

    #[rstest]
    fn test_swap_returns_previous_value() {
        let cell = CollectionCell::new(PersistentList::singleton(1));
        let previous = cell.swap(PersistentList::new());
        assert_eq!(previous.len(), 1);
        assert!(cell.load().is_empty());
    }

    #[rstest]
    fn test_update_retries_after_interference() {
        let cell = CollectionCell::new(PersistentList::new());
        let mut attempts = 0;
        cell.update(|list| {
            attempts += 1;
            if attempts == 1 {
                // Simulate a concurrent writer landing mid-transform
                cell.store(PersistentList::singleton(99));
            }
            list.push_back(1)
        });
        assert_eq!(attempts, 2);
        let final_value: Vec<i32> = cell.load().iter().copied().collect();
        assert_eq!(final_value, vec![99, 1]);
    }

    #[rstest]
    fn test_try_update_reports_exhaustion() {
        let cell = CollectionCell::new(PersistentList::new());
        let result = cell.try_update(
            |list| {
                // Interfere on every attempt
                cell.store(PersistentList::new());
                list.push_back(1)
            },
            3,
        );
        assert_eq!(result, Err(CellError::RetriesExhausted { attempts: 3 }));
    }

    #[cfg(feature = "arc")]
    #[rstest]
    fn test_concurrent_updates_are_all_applied() {
        use std::sync::Arc;

        let cell = Arc::new(CollectionCell::new(PersistentList::new()));
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let cell = Arc::clone(&cell);
                std::thread::spawn(move || {
                    for value in 0..50 {
                        cell.update(|list| list.push_back(worker * 100 + value));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert_eq!(cell.load().len(), 200);
    }
}
