//! Persistent (immutable) indexed list backed by a counted AVL tree.
//!
//! This module provides [`PersistentList`], an immutable random-access
//! list that uses structural sharing for efficient operations, and its
//! mutable staging counterpart [`TransientList`].
//!
//! # Overview
//!
//! The list stores its elements in an AVL tree whose nodes carry subtree
//! element counts, so position lookups descend by count instead of key.
//!
//! - O(log N) get / update
//! - O(log N) insert / remove at any position
//! - O(N) bulk construction from a slice or iterator
//! - O(1) len and `is_empty`
//!
//! All operations return new lists without modifying the original;
//! only the O(log N) nodes on the path to the mutation site are rebuilt.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::PersistentList;
//!
//! let list = PersistentList::new().push_back(1).push_back(2).push_back(3);
//! assert_eq!(list.get(1), Some(&2));
//! assert_eq!(list.len(), 3);
//!
//! // Structural sharing: the original list is preserved
//! let inserted = list.insert(0, 0).unwrap();
//! assert_eq!(list.len(), 3);      // Original unchanged
//! assert_eq!(inserted.len(), 4);  // New version
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::avl::{self, Link};
use crate::error::IndexOutOfRange;
use crate::pool;
use crate::traits::{Sequence, Sortable};

// =============================================================================
// PersistentList Definition
// =============================================================================

/// A persistent (immutable) indexed list.
///
/// `PersistentList` is an immutable data structure that uses structural
/// sharing to efficiently support functional programming patterns.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log N)          |
/// | `push_back`    | O(log N)          |
/// | `insert`       | O(log N)          |
/// | `remove_at`    | O(log N)          |
/// | `update`       | O(log N)          |
/// | `len`          | O(1)              |
/// | `is_empty`     | O(1)              |
///
/// # Examples
///
/// ```rust
/// use permafrost::PersistentList;
///
/// let list = PersistentList::singleton(42);
/// assert_eq!(list.get(0), Some(&42));
/// ```
#[derive(Clone)]
pub struct PersistentList<T> {
    /// Root node of the tree
    root: Link<T>,
    /// Number of elements
    length: usize,
}

impl<T> PersistentList<T> {
    /// Creates a new empty list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentList;
    ///
    /// let list: PersistentList<i32> = PersistentList::new();
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of elements in the list.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the list contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Complexity
    ///
    /// O(log N), descending by left-subtree counts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentList;
    ///
    /// let list = PersistentList::from_slice(&[10, 20, 30]);
    /// assert_eq!(list.get(1), Some(&20));
    /// assert_eq!(list.get(3), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        avl::get_at(&self.root, index)
    }

    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        avl::leftmost(&self.root)
    }

    /// Returns the last element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        avl::rightmost(&self.root)
    }

    /// Returns an iterator over the elements in index order.
    #[must_use]
    pub fn iter(&self) -> PersistentListIterator<'_, T> {
        PersistentListIterator {
            inner: avl::InOrderIter::new(&self.root),
        }
    }

    /// Returns an iterator over the elements in reverse index order.
    #[must_use]
    pub fn iter_reversed(&self) -> PersistentListReverseIterator<'_, T> {
        PersistentListReverseIterator {
            inner: avl::ReverseOrderIter::new(&self.root),
        }
    }

    /// Returns the index of the first element satisfying `predicate`.
    pub fn find_index<P>(&self, mut predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().position(|element| predicate(element))
    }

    fn check_index(&self, index: usize, limit: usize) -> Result<(), IndexOutOfRange> {
        if index < limit {
            Ok(())
        } else {
            Err(IndexOutOfRange {
                index,
                length: self.length,
            })
        }
    }
}

impl<T: Clone> PersistentList<T> {
    /// Creates a list containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().push_back(element)
    }

    /// Builds a list from a slice in O(N) with a minimal-height tree,
    /// bypassing incremental insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentList;
    ///
    /// let list = PersistentList::from_slice(&[1, 2, 3, 4]);
    /// assert_eq!(list.len(), 4);
    /// ```
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self {
        Self {
            root: avl::from_sorted_slice(slice),
            length: slice.len(),
        }
    }

    /// Appends an element, returning the new list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentList;
    ///
    /// let list = PersistentList::new().push_back(1);
    /// let longer = list.push_back(2);
    /// assert_eq!(list.len(), 1);   // Original unchanged
    /// assert_eq!(longer.len(), 2); // New version
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        Self {
            root: avl::insert_at(&self.root, self.length, element),
            length: self.length + 1,
        }
    }

    /// Appends every element of `iterable`, returning the new list.
    ///
    /// Internally stages the additions in a [`TransientList`] so shared
    /// nodes are copied at most once.
    #[must_use]
    pub fn push_back_many<I>(&self, iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut transient = self.to_transient();
        for element in iterable {
            transient.push_back(element);
        }
        transient.into_persistent()
    }

    /// Inserts an element so it ends up at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index > len`. The list is left
    /// untouched on failure.
    pub fn insert(&self, index: usize, element: T) -> Result<Self, IndexOutOfRange> {
        self.check_index(index, self.length + 1)?;
        Ok(Self {
            root: avl::insert_at(&self.root, index, element),
            length: self.length + 1,
        })
    }

    /// Inserts every element of `iterable` starting at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index > len`.
    pub fn insert_many<I>(&self, index: usize, iterable: I) -> Result<Self, IndexOutOfRange>
    where
        I: IntoIterator<Item = T>,
    {
        self.check_index(index, self.length + 1)?;
        let mut transient = self.to_transient();
        for (offset, element) in iterable.into_iter().enumerate() {
            transient
                .insert(index + offset, element)
                .unwrap_or_else(|_| unreachable!("indices stay in range while growing"));
        }
        Ok(transient.into_persistent())
    }

    /// Removes the element at `index`, returning the new list and the
    /// removed element.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentList;
    ///
    /// let list = PersistentList::from_slice(&[1, 2, 3]);
    /// let (shorter, removed) = list.remove_at(1).unwrap();
    /// assert_eq!(removed, 2);
    /// assert_eq!(shorter.len(), 2);
    /// assert_eq!(list.len(), 3); // Original unchanged
    /// ```
    pub fn remove_at(&self, index: usize) -> Result<(Self, T), IndexOutOfRange> {
        self.check_index(index, self.length)?;
        let (root, removed) = avl::remove_at(&self.root, index);
        Ok((
            Self {
                root,
                length: self.length - 1,
            },
            removed,
        ))
    }

    /// Removes `count` elements starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when the range does not fit in the
    /// list; nothing is removed on failure.
    pub fn remove_range(&self, start: usize, count: usize) -> Result<Self, IndexOutOfRange> {
        let end = start.checked_add(count).ok_or(IndexOutOfRange {
            index: usize::MAX,
            length: self.length,
        })?;
        if end > self.length {
            return Err(IndexOutOfRange {
                index: end,
                length: self.length,
            });
        }
        let mut transient = self.to_transient();
        for _ in 0..count {
            transient
                .remove_at(start)
                .unwrap_or_else(|_| unreachable!("range validated above"));
        }
        Ok(transient.into_persistent())
    }

    /// Removes the first element satisfying `predicate`.
    ///
    /// When nothing matches, the returned list shares its entire root
    /// with `self` (reference identity preserved).
    #[must_use]
    pub fn remove_first_where<P>(&self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        let mut predicate = predicate;
        match self.find_index(&mut predicate) {
            None => self.clone(),
            Some(index) => {
                let (root, _) = avl::remove_at(&self.root, index);
                Self {
                    root,
                    length: self.length - 1,
                }
            }
        }
    }

    /// Replaces the element at `index`, returning the new list.
    ///
    /// Returns `None` when `index >= len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentList;
    ///
    /// let list = PersistentList::from_slice(&[1, 2, 3]);
    /// let updated = list.update(1, 20).unwrap();
    /// assert_eq!(list.get(1), Some(&2));      // Original unchanged
    /// assert_eq!(updated.get(1), Some(&20));  // New version
    /// ```
    #[must_use]
    pub fn update(&self, index: usize, element: T) -> Option<Self> {
        if index >= self.length {
            return None;
        }
        Some(Self {
            root: avl::replace_at(&self.root, index, element),
            length: self.length,
        })
    }

    /// Returns a new list with the elements in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut elements: Vec<T> = self.iter().cloned().collect();
        elements.reverse();
        Self::from_slice(&elements)
    }

    /// Returns a new list with `count` elements starting at `start`
    /// reversed in place.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when the range does not fit.
    pub fn reversed_range(&self, start: usize, count: usize) -> Result<Self, IndexOutOfRange> {
        let end = start.checked_add(count).ok_or(IndexOutOfRange {
            index: usize::MAX,
            length: self.length,
        })?;
        if end > self.length {
            return Err(IndexOutOfRange {
                index: end,
                length: self.length,
            });
        }
        let mut elements: Vec<T> = self.iter().cloned().collect();
        elements[start..end].reverse();
        Ok(Self::from_slice(&elements))
    }

    /// Returns a new list sorted by the natural order of the elements.
    #[must_use]
    pub fn sorted(&self) -> Self
    where
        T: Ord,
    {
        self.sorted_by(T::cmp)
    }

    /// Returns a new list sorted by the given comparison.
    #[must_use]
    pub fn sorted_by<F>(&self, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        let mut elements: Vec<T> = self.iter().cloned().collect();
        elements.sort_by(compare);
        Self::from_slice(&elements)
    }

    /// Converts this list into a mutable [`TransientList`] builder.
    ///
    /// The builder starts out sharing every node with `self`; nodes are
    /// copied lazily, the first time the builder mutates them.
    #[must_use]
    pub fn to_transient(&self) -> TransientList<T> {
        TransientList {
            root: self.root.clone(),
            length: self.length,
            version: 0,
        }
    }
}

impl<T: Clone + PartialEq> PersistentList<T> {
    /// Returns the index of the first occurrence of `element`.
    #[must_use]
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.iter().position(|candidate| candidate == element)
    }

    /// Returns the index of the last occurrence of `element`.
    #[must_use]
    pub fn last_index_of(&self, element: &T) -> Option<usize> {
        self.iter_reversed()
            .position(|candidate| candidate == element)
            .map(|reversed| self.length - 1 - reversed)
    }

    /// Returns the index of the first occurrence of `element` within
    /// `count` elements starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when the range does not fit.
    pub fn index_of_within(
        &self,
        element: &T,
        start: usize,
        count: usize,
    ) -> Result<Option<usize>, IndexOutOfRange> {
        let end = start.checked_add(count).ok_or(IndexOutOfRange {
            index: usize::MAX,
            length: self.length,
        })?;
        if end > self.length {
            return Err(IndexOutOfRange {
                index: end,
                length: self.length,
            });
        }
        Ok(self
            .iter()
            .skip(start)
            .take(count)
            .position(|candidate| candidate == element)
            .map(|offset| start + offset))
    }

    /// Returns `true` if the list contains `element`.
    #[must_use]
    pub fn contains(&self, element: &T) -> bool {
        self.index_of(element).is_some()
    }
}

impl<T: Clone + Ord> PersistentList<T> {
    /// Binary-searches a sorted list for `element`.
    ///
    /// Like `slice::binary_search`: `Ok(index)` when found, otherwise
    /// `Err(insertion_index)`. The result is unspecified when the list
    /// is not sorted.
    pub fn binary_search(&self, element: &T) -> Result<usize, usize> {
        self.binary_search_by(|candidate| candidate.cmp(element))
    }
}

impl<T: Clone> PersistentList<T> {
    /// Binary-searches with an externally supplied ordering probe.
    pub fn binary_search_by<F>(&self, mut probe: F) -> Result<usize, usize>
    where
        F: FnMut(&T) -> std::cmp::Ordering,
    {
        let mut low = 0;
        let mut high = self.length;
        while low < high {
            let middle = low + (high - low) / 2;
            let candidate = self
                .get(middle)
                .unwrap_or_else(|| unreachable!("middle is below len"));
            match probe(candidate) {
                std::cmp::Ordering::Less => low = middle + 1,
                std::cmp::Ordering::Greater => high = middle,
                std::cmp::Ordering::Equal => return Ok(middle),
            }
        }
        Err(low)
    }
}

// =============================================================================
// TransientList Definition
// =============================================================================

/// A mutable staging list convertible to and from [`PersistentList`].
///
/// The builder mutates tree nodes in place while it is their exclusive
/// owner and copies them on first touch while they are still shared
/// with a frozen list. Converting back to a persistent list freezes the
/// current nodes without copying.
///
/// A `TransientList` is **not** thread-safe; callers must not share one
/// across threads without external serialization.
///
/// # Examples
///
/// ```rust
/// use permafrost::PersistentList;
///
/// let list = PersistentList::from_slice(&[1, 2, 3]);
/// let mut builder = list.to_transient();
/// builder.push_back(4);
/// let longer = builder.into_persistent();
///
/// assert_eq!(longer.len(), 4);
/// assert_eq!(list.len(), 3); // Original unchanged
/// ```
#[derive(Clone)]
pub struct TransientList<T> {
    root: Link<T>,
    length: usize,
    /// Bumped on every mutation; enumerators verify it on each step.
    version: u64,
}

impl<T> TransientList<T> {
    /// Creates an empty builder.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
            version: 0,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the builder holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns a reference to the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        avl::get_at(&self.root, index)
    }

    /// Returns an iterator over the elements in index order.
    ///
    /// The iterator captures the builder version and panics if a step
    /// observes a mutation made through another path (which safe Rust
    /// prevents for this type, but the guard also covers internal bugs).
    #[must_use]
    pub fn iter(&self) -> TransientListIterator<'_, T> {
        TransientListIterator {
            inner: avl::InOrderIter::new(&self.root),
            expected_version: self.version,
            current_version: &self.version,
        }
    }
}

impl<T: Clone> TransientList<T> {
    /// Appends an element in place.
    pub fn push_back(&mut self, element: T) {
        avl::insert_at_mut(&mut self.root, self.length, element);
        self.length += 1;
        self.version += 1;
    }

    /// Inserts an element at `index` in place.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index > len`.
    pub fn insert(&mut self, index: usize, element: T) -> Result<(), IndexOutOfRange> {
        if index > self.length {
            return Err(IndexOutOfRange {
                index,
                length: self.length,
            });
        }
        avl::insert_at_mut(&mut self.root, index, element);
        self.length += 1;
        self.version += 1;
        Ok(())
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, IndexOutOfRange> {
        if index >= self.length {
            return Err(IndexOutOfRange {
                index,
                length: self.length,
            });
        }
        let removed = avl::remove_at_mut(&mut self.root, index);
        self.length -= 1;
        self.version += 1;
        Ok(removed)
    }

    /// Replaces the element at `index` in place.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len`.
    pub fn update(&mut self, index: usize, element: T) -> Result<(), IndexOutOfRange> {
        if index >= self.length {
            return Err(IndexOutOfRange {
                index,
                length: self.length,
            });
        }
        avl::replace_at_mut(&mut self.root, index, element);
        self.version += 1;
        Ok(())
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.root = None;
        self.length = 0;
        self.version += 1;
    }

    /// Freezes the current contents into a [`PersistentList`] while the
    /// builder stays usable (subsequent mutations copy shared nodes).
    #[must_use]
    pub fn to_persistent(&self) -> PersistentList<T> {
        PersistentList {
            root: self.root.clone(),
            length: self.length,
        }
    }

    /// Consumes the builder, freezing its nodes without any copying.
    #[must_use]
    pub fn into_persistent(self) -> PersistentList<T> {
        PersistentList {
            root: self.root,
            length: self.length,
        }
    }
}

impl<T> Default for TransientList<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over the elements of a [`PersistentList`].
pub struct PersistentListIterator<'a, T> {
    inner: avl::InOrderIter<'a, T>,
}

impl<'a, T> Iterator for PersistentListIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentListIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// A reverse-order iterator over the elements of a [`PersistentList`].
pub struct PersistentListReverseIterator<'a, T> {
    inner: avl::ReverseOrderIter<'a, T>,
}

impl<'a, T> Iterator for PersistentListReverseIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentListReverseIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the elements of a [`PersistentList`].
///
/// Uses a pooled traversal-stack buffer from the thread-local
/// enumerator pool.
pub struct PersistentListIntoIterator<T: 'static> {
    inner: avl::OwnedInOrderIter<T>,
}

impl<T: Clone + 'static> Iterator for PersistentListIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Clone + 'static> ExactSizeIterator for PersistentListIntoIterator<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An iterator over a [`TransientList`] guarded by the builder version.
pub struct TransientListIterator<'a, T> {
    inner: avl::InOrderIter<'a, T>,
    expected_version: u64,
    current_version: &'a u64,
}

impl<'a, T> Iterator for TransientListIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(error) = pool::guard_version(self.expected_version, *self.current_version) {
            panic!("{error}");
        }
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentList<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let elements: Vec<T> = iter.into_iter().collect();
        Self::from_slice(&elements)
    }
}

impl<T: Clone + 'static> IntoIterator for PersistentList<T> {
    type Item = T;
    type IntoIter = PersistentListIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentListIntoIterator {
            inner: avl::OwnedInOrderIter::new(self.root),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentList<T> {
    type Item = &'a T;
    type IntoIter = PersistentListIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentList<T> {}

/// Hashes the length, then every element in index order, so equal lists
/// hash equally regardless of their internal tree shapes.
impl<T: Hash> Hash for PersistentList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self.iter() {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentList<T> {
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

impl<T> Sequence for PersistentList<T> {
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

impl<T> Sortable for PersistentList<T> {
    fn to_sorted_vec(&self) -> Vec<T>
    where
        T: Clone + Ord,
    {
        let mut elements: Vec<T> = self.iter().cloned().collect();
        elements.sort();
        elements
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentList<T> {
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
struct PersistentListVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentListVisitor<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentList<T>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut transient = TransientList::new();
        while let Some(element) = access.next_element()? {
            transient.push_back(element);
        }
        Ok(transient.into_persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentList<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentListVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Thread-safety assertions
// =============================================================================

// Transients are documented as single-thread builders; without the `arc`
// feature the node pointers are `Rc` and the compiler enforces it.
#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(TransientList<i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
