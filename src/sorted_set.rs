//! Persistent (immutable) set ordered by element, backed directly by
//! the counted AVL engine.
//!
//! Iteration yields elements in ascending order and elements can be
//! addressed by rank, like [`crate::PersistentSortedMap`] entries.
//!
//! Large batch additions take a different path than small ones: past a
//! size ratio it is cheaper to flatten everything into one sorted
//! buffer and rebuild a minimal-height tree than to insert
//! incrementally (see [`BULK_REBUILD_NUMERATOR`]).
//!
//! # Examples
//!
//! ```rust
//! use permafrost::PersistentSortedSet;
//!
//! let set = PersistentSortedSet::new().insert(3).insert(1).insert(2);
//! let elements: Vec<i32> = set.iter().copied().collect();
//! assert_eq!(elements, vec![1, 2, 3]);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::avl::{self, Link};
use crate::pool;
use crate::traits::{Sequence, Sortable};

/// Numerator of the batch-to-set size ratio past which a batch addition
/// rebuilds the whole tree from a sorted buffer instead of inserting
/// element by element. With 3/20, a batch above roughly 15% of the
/// current size triggers the O(n) rebuild.
pub(crate) const BULK_REBUILD_NUMERATOR: usize = 3;
/// Denominator of the bulk-rebuild ratio.
pub(crate) const BULK_REBUILD_DENOMINATOR: usize = 20;

/// `true` when adding `incoming` elements to a set of `existing` should
/// rebuild rather than insert incrementally: bulk rebuild wins once
/// `incoming / existing` exceeds the 3/20 ratio.
const fn should_bulk_rebuild(existing: usize, incoming: usize) -> bool {
    existing == 0 || incoming * BULK_REBUILD_DENOMINATOR > existing * BULK_REBUILD_NUMERATOR
}

// =============================================================================
// PersistentSortedSet Definition
// =============================================================================

/// A persistent (immutable) element-ordered set.
///
/// All operations return a new set and leave the original untouched;
/// inserting a present element or removing an absent one shares the
/// entire root with the original.
///
/// # Time Complexity
///
/// | Operation          | Complexity               |
/// |--------------------|--------------------------|
/// | `contains`         | O(log N)                 |
/// | `get_at` (by rank) | O(log N)                 |
/// | `insert`           | O(log N)                 |
/// | `remove`           | O(log N)                 |
/// | `union`            | O(M log N) or O(N + M)   |
#[derive(Clone)]
pub struct PersistentSortedSet<T> {
    root: Link<T>,
}

impl<T> PersistentSortedSet<T> {
    /// Creates a new empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        avl::count(&self.root)
    }

    /// Returns `true` if the set holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the element with rank `index` (the `index`-th smallest).
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&T> {
        avl::get_at(&self.root, index)
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        avl::leftmost(&self.root)
    }

    /// Returns the largest element.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        avl::rightmost(&self.root)
    }

    /// Returns an iterator over the elements in ascending order.
    #[must_use]
    pub fn iter(&self) -> PersistentSortedSetIterator<'_, T> {
        PersistentSortedSetIterator {
            inner: avl::InOrderIter::new(&self.root),
        }
    }

    /// Returns an iterator over the elements in descending order.
    #[must_use]
    pub fn iter_reversed(&self) -> PersistentSortedSetReverseIterator<'_, T> {
        PersistentSortedSetReverseIterator {
            inner: avl::ReverseOrderIter::new(&self.root),
        }
    }
}

impl<T: Clone + Ord> PersistentSortedSet<T> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }

    /// Builds a set from arbitrary elements in O(n log n): sort, dedup,
    /// then build a minimal-height tree.
    #[must_use]
    pub fn from_elements<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut elements: Vec<T> = iterable.into_iter().collect();
        elements.sort();
        elements.dedup();
        Self {
            root: avl::from_sorted_slice(&elements),
        }
    }

    /// Returns `true` if `element` is in the set.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        avl::find_by(&self.root, &|stored: &T| element.cmp(stored.borrow())).is_some()
    }

    /// Returns the element instance actually stored for `element`.
    #[must_use]
    pub fn get_stored<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        avl::find_by(&self.root, &|stored: &T| element.cmp(stored.borrow()))
    }

    /// Returns the rank of `element`: how many elements are strictly
    /// smaller. `None` when absent.
    #[must_use]
    pub fn index_of<Q>(&self, element: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut link = &self.root;
        let mut preceding = 0;
        while let Some(node) = link.as_ref() {
            match element.cmp(node.element().borrow()) {
                Ordering::Less => link = node.left(),
                Ordering::Greater => {
                    preceding += avl::count(node.left()) + 1;
                    link = node.right();
                }
                Ordering::Equal => return Some(preceding + avl::count(node.left())),
            }
        }
        None
    }

    /// Returns an iterator over the elements that fall within `bounds`,
    /// in ascending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentSortedSet;
    ///
    /// let set = PersistentSortedSet::from_elements(1..=5);
    /// let slice: Vec<i32> = set.range(2..=4).copied().collect();
    /// assert_eq!(slice, vec![2, 3, 4]);
    /// ```
    pub fn range<R>(&self, bounds: R) -> impl Iterator<Item = &T>
    where
        R: std::ops::RangeBounds<T>,
    {
        use std::ops::Bound;
        let start = bounds.start_bound().cloned();
        let end = bounds.end_bound().cloned();
        self.iter()
            .skip_while(move |element| match &start {
                Bound::Included(bound) => *element < bound,
                Bound::Excluded(bound) => *element <= bound,
                Bound::Unbounded => false,
            })
            .take_while(move |element| match &end {
                Bound::Included(bound) => *element <= bound,
                Bound::Excluded(bound) => *element < bound,
                Bound::Unbounded => true,
            })
    }

    /// Adds `element`, returning the new set.
    ///
    /// Adding a present element is a no-op that shares the whole root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentSortedSet;
    ///
    /// let set = PersistentSortedSet::new().insert(5);
    /// assert_eq!(set.insert(5).len(), 1);
    /// assert_eq!(set.insert(6).len(), 2);
    /// ```
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        let insertion = avl::insert_by(
            &self.root,
            element,
            &|incoming: &T, stored: &T| incoming.cmp(stored),
            &|_: &T, _: T| None,
        );
        match insertion {
            avl::Insertion::Unchanged => self.clone(),
            avl::Insertion::Added(root) => Self { root },
            avl::Insertion::Updated(_) => unreachable!("the merge never replaces"),
        }
    }

    /// Removes `element`, returning the new set.
    ///
    /// Removing an absent element is a no-op that shares the whole root.
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match avl::remove_by(&self.root, &|stored: &T| element.cmp(stored.borrow())) {
            None => self.clone(),
            Some((root, _)) => Self { root },
        }
    }

    /// Adds every element of `iterable`, returning the new set.
    ///
    /// Small batches are inserted incrementally; once the batch grows
    /// past a fraction of the set size it is cheaper to flatten
    /// everything and rebuild a minimal-height tree in O(N + M log M)
    /// instead.
    #[must_use]
    pub fn insert_many<I>(&self, iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let incoming: Vec<T> = iterable.into_iter().collect();
        if incoming.is_empty() {
            return self.clone();
        }
        if should_bulk_rebuild(self.len(), incoming.len()) {
            let mut elements: Vec<T> = self.iter().cloned().collect();
            elements.extend(incoming);
            return Self::from_elements(elements);
        }
        let mut transient = self.to_transient();
        for element in incoming {
            transient.insert(element);
        }
        transient.into_persistent()
    }

    /// Removes every element of `iterable`, returning the new set.
    #[must_use]
    pub fn remove_many<I>(&self, iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut transient = self.to_transient();
        for element in iterable {
            transient.remove(&element);
        }
        transient.into_persistent()
    }

    /// Returns the union of the two sets. An empty operand short-circuits
    /// to the other set, root shared.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        self.insert_many(other.iter().cloned())
    }

    /// Returns the set of elements present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::new();
        }
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        // The walk is already sorted, so the result builds in O(n)
        let elements: Vec<T> = smaller
            .iter()
            .filter(|element| larger.contains(*element))
            .cloned()
            .collect();
        Self {
            root: avl::from_sorted_slice(&elements),
        }
    }

    /// Returns the elements of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        self.remove_many(other.iter().cloned())
    }

    /// Returns the elements present in exactly one of the two sets.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let mut transient = self.to_transient();
        for element in other.iter() {
            if !transient.remove(element) {
                transient.insert(element.clone());
            }
        }
        transient.into_persistent()
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if every element of `other` is in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns `true` if the sets share no element.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        !smaller.iter().any(|element| larger.contains(element))
    }

    /// Converts this set into a mutable [`TransientSortedSet`] builder.
    #[must_use]
    pub fn to_transient(&self) -> TransientSortedSet<T> {
        TransientSortedSet {
            root: self.root.clone(),
            version: 0,
        }
    }
}

// =============================================================================
// TransientSortedSet Definition
// =============================================================================

/// A mutable staging set convertible to and from [`PersistentSortedSet`].
///
/// Not thread-safe.
#[derive(Clone)]
pub struct TransientSortedSet<T> {
    root: Link<T>,
    version: u64,
}

impl<T> TransientSortedSet<T> {
    /// Creates an empty builder.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            version: 0,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        avl::count(&self.root)
    }

    /// Returns `true` if the builder holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a version-guarded iterator over the elements in
    /// ascending order.
    #[must_use]
    pub fn iter(&self) -> TransientSortedSetIterator<'_, T> {
        TransientSortedSetIterator {
            inner: avl::InOrderIter::new(&self.root),
            expected_version: self.version,
            current_version: &self.version,
        }
    }
}

impl<T: Clone + Ord> TransientSortedSet<T> {
    /// Returns `true` if `element` is in the set.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        avl::find_by(&self.root, &|stored: &T| element.cmp(stored.borrow())).is_some()
    }

    /// Adds `element` in place. Returns `true` when it was newly added.
    pub fn insert(&mut self, element: T) -> bool {
        let insertion = avl::insert_by(
            &self.root,
            element,
            &|incoming: &T, stored: &T| incoming.cmp(stored),
            &|_: &T, _: T| None,
        );
        match insertion {
            avl::Insertion::Unchanged => false,
            avl::Insertion::Added(root) => {
                self.root = root;
                self.version += 1;
                true
            }
            avl::Insertion::Updated(_) => unreachable!("the merge never replaces"),
        }
    }

    /// Removes `element` in place. Returns `true` when it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match avl::remove_by(&self.root, &|stored: &T| element.cmp(stored.borrow())) {
            None => false,
            Some((root, _)) => {
                self.root = root;
                self.version += 1;
                true
            }
        }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.root = None;
        self.version += 1;
    }

    /// Freezes the current contents into a [`PersistentSortedSet`]
    /// while the builder stays usable.
    #[must_use]
    pub fn to_persistent(&self) -> PersistentSortedSet<T> {
        PersistentSortedSet {
            root: self.root.clone(),
        }
    }

    /// Consumes the builder, freezing its contents without copying.
    #[must_use]
    pub fn into_persistent(self) -> PersistentSortedSet<T> {
        PersistentSortedSet { root: self.root }
    }
}

impl<T> Default for TransientSortedSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Ord> Extend<T> for TransientSortedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An ascending iterator over the elements of a [`PersistentSortedSet`].
pub struct PersistentSortedSetIterator<'a, T> {
    inner: avl::InOrderIter<'a, T>,
}

impl<'a, T> Iterator for PersistentSortedSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentSortedSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// A descending iterator over the elements of a [`PersistentSortedSet`].
pub struct PersistentSortedSetReverseIterator<'a, T> {
    inner: avl::ReverseOrderIter<'a, T>,
}

impl<'a, T> Iterator for PersistentSortedSetReverseIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An owning ascending iterator over the elements of a
/// [`PersistentSortedSet`].
pub struct PersistentSortedSetIntoIterator<T: 'static> {
    inner: avl::OwnedInOrderIter<T>,
}

impl<T: Clone + 'static> Iterator for PersistentSortedSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A version-guarded iterator over the elements of a
/// [`TransientSortedSet`].
pub struct TransientSortedSetIterator<'a, T> {
    inner: avl::InOrderIter<'a, T>,
    expected_version: u64,
    current_version: &'a u64,
}

impl<'a, T> Iterator for TransientSortedSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(error) = pool::guard_version(self.expected_version, *self.current_version) {
            panic!("{error}");
        }
        self.inner.next()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentSortedSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Ord> FromIterator<T> for PersistentSortedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_elements(iter)
    }
}

impl<T: Clone + 'static> IntoIterator for PersistentSortedSet<T> {
    type Item = T;
    type IntoIter = PersistentSortedSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentSortedSetIntoIterator {
            inner: avl::OwnedInOrderIter::new(self.root),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentSortedSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentSortedSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Element-wise equality in ascending order.
impl<T: PartialEq> PartialEq for PersistentSortedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentSortedSet<T> {}

impl<T: Hash> Hash for PersistentSortedSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self.iter() {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentSortedSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentSortedSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Capability Trait Implementations
// =============================================================================

impl<T> Sequence for PersistentSortedSet<T> {
    type Item = T;

    fn len(&self) -> usize {
        avl::count(&self.root)
    }

    fn fold_left<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        avl::InOrderIter::new(&self.root)
            .fold(init, |accumulator, element| function(accumulator, element))
    }
}

impl<T> Sortable for PersistentSortedSet<T> {
    fn to_sorted_vec(&self) -> Vec<T>
    where
        T: Clone + Ord,
    {
        avl::InOrderIter::new(&self.root).cloned().collect()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentSortedSet<T> {
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
struct PersistentSortedSetVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentSortedSetVisitor<T>
where
    T: serde::Deserialize<'de> + Clone + Ord,
{
    type Value = PersistentSortedSet<T>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence of set elements")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut elements: Vec<T> = Vec::new();
        while let Some(element) = access.next_element()? {
            elements.push(element);
        }
        Ok(PersistentSortedSet::from_elements(elements))
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentSortedSet<T>
where
    T: serde::Deserialize<'de> + Clone + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentSortedSetVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Thread-safety assertions
// =============================================================================

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(TransientSortedSet<i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
