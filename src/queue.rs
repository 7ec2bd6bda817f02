//! Persistent (immutable) FIFO queue built from two stacks.
//!
//! Enqueues push onto a `backwards` stack; dequeues pop from a
//! `forwards` stack. When `forwards` runs dry the `backwards` stack is
//! reversed onto it, giving amortized O(1) operations.
//!
//! Invariant: `forwards` is empty only when the whole queue is empty,
//! so `peek` never has to reverse.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::PersistentQueue;
//!
//! let queue = PersistentQueue::new().enqueue(1).enqueue(2);
//! let (rest, front) = queue.dequeue().unwrap();
//! assert_eq!(front, 1);
//! assert_eq!(rest.peek(), Some(&2));
//! assert_eq!(queue.len(), 2); // Original unchanged
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::stack::PersistentStack;
use crate::traits::Sequence;

// =============================================================================
// PersistentQueue Definition
// =============================================================================

/// A persistent (immutable) FIFO queue.
///
/// # Time Complexity
///
/// | Operation | Complexity       |
/// |-----------|------------------|
/// | `enqueue` | O(1)             |
/// | `dequeue` | amortized O(1)   |
/// | `peek`    | O(1)             |
/// | `len`     | O(1)             |
#[derive(Clone)]
pub struct PersistentQueue<T> {
    /// Dequeue order; empty only when the queue is empty.
    forwards: PersistentStack<T>,
    /// Reverse enqueue order, reversed onto `forwards` on demand.
    backwards: PersistentStack<T>,
}

impl<T> PersistentQueue<T> {
    /// Creates a new empty queue.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forwards: PersistentStack::new(),
            backwards: PersistentStack::new(),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.forwards.len() + self.backwards.len()
    }

    /// Returns `true` if the queue holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.forwards.is_empty()
    }

    /// Returns the front element without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.forwards.peek()
    }

    /// Returns an iterator in dequeue order.
    ///
    /// # Complexity
    ///
    /// O(N) overall; the backwards half is staged into a buffer so it
    /// can be yielded oldest-first.
    #[must_use]
    pub fn iter(&self) -> PersistentQueueIterator<'_, T> {
        PersistentQueueIterator {
            forwards: self.forwards.iter(),
            backwards: self.backwards.iter().collect::<Vec<_>>().into_iter().rev(),
        }
    }
}

impl<T: Clone> PersistentQueue<T> {
    /// Creates a queue containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().enqueue(element)
    }

    /// Appends `element` at the back, returning the new queue.
    #[must_use]
    pub fn enqueue(&self, element: T) -> Self {
        if self.forwards.is_empty() {
            // The whole queue was empty; the new element is the front
            Self {
                forwards: PersistentStack::singleton(element),
                backwards: PersistentStack::new(),
            }
        } else {
            Self {
                forwards: self.forwards.clone(),
                backwards: self.backwards.push(element),
            }
        }
    }

    /// Removes the front element, returning the remaining queue and the
    /// element, or `None` when the queue is empty.
    #[must_use]
    pub fn dequeue(&self) -> Option<(Self, T)> {
        let (forwards, front) = self.forwards.pop()?;
        let remaining = if forwards.is_empty() {
            // Restore the invariant by reversing the backwards stack
            Self {
                forwards: self.backwards.iter().cloned().collect(),
                backwards: PersistentStack::new(),
            }
        } else {
            Self {
                forwards,
                backwards: self.backwards.clone(),
            }
        };
        Some((remaining, front))
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over a [`PersistentQueue`] in dequeue order.
pub struct PersistentQueueIterator<'a, T> {
    forwards: crate::stack::PersistentStackIterator<'a, T>,
    backwards: std::iter::Rev<std::vec::IntoIter<&'a T>>,
}

impl<'a, T> Iterator for PersistentQueueIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.forwards.next().or_else(|| self.backwards.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.forwards.len() + self.backwards.len();
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for PersistentQueueIterator<'_, T> {}

/// An owning iterator over a [`PersistentQueue`] in dequeue order.
pub struct PersistentQueueIntoIterator<T> {
    queue: PersistentQueue<T>,
}

impl<T: Clone> Iterator for PersistentQueueIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (rest, front) = self.queue.dequeue()?;
        self.queue = rest;
        Some(front)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentQueueIntoIterator<T> {
    fn len(&self) -> usize {
        self.queue.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentQueue<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |queue, element| queue.enqueue(element))
    }
}

impl<T: Clone> IntoIterator for PersistentQueue<T> {
    type Item = T;
    type IntoIter = PersistentQueueIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentQueueIntoIterator { queue: self }
    }
}

impl<'a, T> IntoIterator for &'a PersistentQueue<T> {
    type Item = &'a T;
    type IntoIter = PersistentQueueIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Equality compares dequeue order, not internal stack split.
impl<T: PartialEq> PartialEq for PersistentQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentQueue<T> {}

impl<T: Hash> Hash for PersistentQueue<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self.iter() {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentQueue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentQueue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Capability Trait Implementations
// =============================================================================

impl<T> Sequence for PersistentQueue<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.forwards.len() + self.backwards.len()
    }

    fn fold_left<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.iter()
            .fold(init, |accumulator, element| function(accumulator, element))
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentQueue<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for element in self.iter() {
            sequence.serialize_element(element)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentQueue<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let elements: Vec<T> = Vec::deserialize(deserializer)?;
        Ok(elements.into_iter().collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
