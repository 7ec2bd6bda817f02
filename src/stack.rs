//! Persistent (immutable) LIFO stack as a shared cons list.
//!
//! Every operation is O(1): pushing allocates one node pointing at the
//! previous head, and popping returns the tail, which is shared with
//! every other version that contains it.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::PersistentStack;
//!
//! let stack = PersistentStack::new().push(1).push(2);
//! assert_eq!(stack.peek(), Some(&2));
//!
//! let (rest, top) = stack.pop().unwrap();
//! assert_eq!(top, 2);
//! assert_eq!(rest.peek(), Some(&1));
//! assert_eq!(stack.len(), 2); // Original unchanged
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::shared::ReferenceCounter;
use crate::traits::Sequence;

// =============================================================================
// PersistentStack Definition
// =============================================================================

struct StackNode<T> {
    element: T,
    below: Option<ReferenceCounter<StackNode<T>>>,
}

/// A persistent (immutable) LIFO stack.
///
/// # Time Complexity
///
/// | Operation | Complexity |
/// |-----------|------------|
/// | `push`    | O(1)       |
/// | `pop`     | O(1)       |
/// | `peek`    | O(1)       |
/// | `len`     | O(1)       |
#[derive(Clone)]
pub struct PersistentStack<T> {
    top: Option<ReferenceCounter<StackNode<T>>>,
    length: usize,
}

impl<T> PersistentStack<T> {
    /// Creates a new empty stack.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            top: None,
            length: 0,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the stack holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the top element without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.top.as_ref().map(|node| &node.element)
    }

    /// Pushes `element` on top, returning the new stack. The previous
    /// stack becomes the shared tail.
    #[must_use]
    pub fn push(&self, element: T) -> Self {
        Self {
            top: Some(ReferenceCounter::new(StackNode {
                element,
                below: self.top.clone(),
            })),
            length: self.length + 1,
        }
    }

    /// Returns an iterator from the top of the stack downwards.
    #[must_use]
    pub fn iter(&self) -> PersistentStackIterator<'_, T> {
        PersistentStackIterator {
            cursor: self.top.as_deref(),
            remaining: self.length,
        }
    }
}

impl<T: Clone> PersistentStack<T> {
    /// Creates a stack containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().push(element)
    }

    /// Pops the top element, returning the remaining stack and the
    /// element, or `None` when the stack is empty.
    #[must_use]
    pub fn pop(&self) -> Option<(Self, T)> {
        let node = self.top.as_ref()?;
        Some((
            Self {
                top: node.below.clone(),
                length: self.length - 1,
            },
            node.element.clone(),
        ))
    }
}

/// Unlinks the chain iteratively; the derived drop would recurse once
/// per node and overflow on long stacks.
impl<T> Drop for PersistentStack<T> {
    fn drop(&mut self) {
        let mut cursor = self.top.take();
        while let Some(node) = cursor {
            match ReferenceCounter::try_unwrap(node) {
                Ok(mut owned) => cursor = owned.below.take(),
                // Another version still owns the rest of the chain
                Err(_) => break,
            }
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over a [`PersistentStack`] from top to bottom.
pub struct PersistentStackIterator<'a, T> {
    cursor: Option<&'a StackNode<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for PersistentStackIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor?;
        self.cursor = node.below.as_deref();
        self.remaining -= 1;
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentStackIterator<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

/// An owning iterator over a [`PersistentStack`] from top to bottom.
pub struct PersistentStackIntoIterator<T> {
    stack: PersistentStack<T>,
}

impl<T: Clone> Iterator for PersistentStackIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (rest, element) = self.stack.pop()?;
        self.stack = rest;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), Some(self.stack.len()))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentStackIntoIterator<T> {
    fn len(&self) -> usize {
        self.stack.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentStack<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a stack by pushing in iteration order: the last yielded
/// element ends up on top.
impl<T> FromIterator<T> for PersistentStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut top = None;
        let mut length = 0;
        for element in iter {
            top = Some(ReferenceCounter::new(StackNode {
                element,
                below: top,
            }));
            length += 1;
        }
        Self { top, length }
    }
}

impl<T: Clone> IntoIterator for PersistentStack<T> {
    type Item = T;
    type IntoIter = PersistentStackIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentStackIntoIterator { stack: self }
    }
}

impl<'a, T> IntoIterator for &'a PersistentStack<T> {
    type Item = &'a T;
    type IntoIter = PersistentStackIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentStack<T> {}

impl<T: Hash> Hash for PersistentStack<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self.iter() {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentStack<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentStack<T> {
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

impl<T> Sequence for PersistentStack<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.length
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
impl<T: serde::Serialize> serde::Serialize for PersistentStack<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        // Serialized top-first; deserialization re-pushes in reverse
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for element in self.iter() {
            sequence.serialize_element(element)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentStack<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mut elements: Vec<T> = Vec::deserialize(deserializer)?;
        elements.reverse();
        Ok(elements.into_iter().collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
