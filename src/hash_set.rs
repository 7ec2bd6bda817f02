//! Persistent (immutable) hash set built on the hash trie engine.
//!
//! [`PersistentHashSet`] stores each element as a key with a unit value
//! in the same trie that backs [`crate::PersistentHashMap`], so elements
//! only need `Hash + Eq`. Iteration order follows hash order.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::PersistentHashSet;
//!
//! let set = PersistentHashSet::new().insert(1).insert(2);
//! assert!(set.contains(&1));
//!
//! // Structural sharing: the original set is preserved
//! let removed = set.remove(&1);
//! assert_eq!(set.len(), 2);
//! assert_eq!(removed.len(), 1);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::pool;
use crate::traits::{Sequence, Sortable};
use crate::trie::{self, InsertPolicy, TrieInsertion, TrieIntoIter, TrieIter, TrieRemoval, TrieRoot};

// =============================================================================
// PersistentHashSet Definition
// =============================================================================

/// A persistent (immutable) hash set.
///
/// All operations return a new set and leave the original untouched.
/// Inserting a present element or removing an absent one is a no-op
/// that returns a set sharing its entire root with the original.
///
/// # Time Complexity
///
/// | Operation          | Complexity           |
/// |--------------------|----------------------|
/// | `contains`         | O(log N) expected    |
/// | `insert`           | O(log N) expected    |
/// | `remove`           | O(log N) expected    |
/// | `union`            | O(M log(N + M))      |
/// | `len` / `is_empty` | O(1)                 |
#[derive(Clone)]
pub struct PersistentHashSet<T> {
    root: TrieRoot<T, ()>,
    length: usize,
}

impl<T> PersistentHashSet<T> {
    /// Creates a new empty set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the set holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns an iterator over the elements in hash order.
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: TrieIter::new(&self.root, self.length),
        }
    }
}

impl<T: Clone + Eq + Hash> PersistentHashSet<T> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }

    /// Returns `true` if `element` is in the set.
    ///
    /// # Complexity
    ///
    /// O(log N) expected.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        trie::get(&self.root, element).is_some()
    }

    /// Returns the element instance actually stored for `element`.
    #[must_use]
    pub fn get_stored<Q>(&self, element: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.iter().find(|stored| (*stored).borrow() == element)
    }

    /// Adds `element`, returning the new set.
    ///
    /// Adding a present element is a no-op that shares the whole root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentHashSet;
    ///
    /// let set = PersistentHashSet::new().insert(7);
    /// let same = set.insert(7);
    /// assert_eq!(same.len(), 1);
    /// ```
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        match trie::insert(&self.root, element, (), InsertPolicy::Skip) {
            TrieInsertion::Unchanged => self.clone(),
            TrieInsertion::Added(root) => Self {
                root,
                length: self.length + 1,
            },
            TrieInsertion::Updated(_) | TrieInsertion::Conflict(..) => {
                unreachable!("skip never updates or conflicts")
            }
        }
    }

    /// Removes `element`, returning the new set.
    ///
    /// Removing an absent element is a no-op that shares the whole root.
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match trie::remove(&self.root, element) {
            TrieRemoval::NotFound => self.clone(),
            TrieRemoval::Removed(root, ()) => Self {
                root,
                length: self.length - 1,
            },
        }
    }

    /// Adds every element of `iterable`, returning the new set.
    #[must_use]
    pub fn insert_many<I>(&self, iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut transient = self.to_transient();
        for element in iterable {
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

    /// Returns the union of the two sets.
    ///
    /// When either operand is empty the other is returned as-is, with
    /// its root shared.
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
        // Probe with the smaller operand
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        smaller
            .iter()
            .filter(|element| larger.contains(*element))
            .cloned()
            .collect()
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

    /// Converts this set into a mutable [`TransientHashSet`] builder.
    #[must_use]
    pub fn to_transient(&self) -> TransientHashSet<T> {
        TransientHashSet {
            root: self.root.clone(),
            length: self.length,
            version: 0,
        }
    }
}

// =============================================================================
// TransientHashSet Definition
// =============================================================================

/// A mutable staging set convertible to and from [`PersistentHashSet`].
///
/// Not thread-safe.
#[derive(Clone)]
pub struct TransientHashSet<T> {
    root: TrieRoot<T, ()>,
    length: usize,
    version: u64,
}

impl<T> TransientHashSet<T> {
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

    /// Returns a version-guarded iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> TransientHashSetIterator<'_, T> {
        TransientHashSetIterator {
            inner: TrieIter::new(&self.root, self.length),
            expected_version: self.version,
            current_version: &self.version,
        }
    }
}

impl<T: Clone + Eq + Hash> TransientHashSet<T> {
    /// Returns `true` if `element` is in the set.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        trie::get(&self.root, element).is_some()
    }

    /// Adds `element` in place. Returns `true` when it was newly added.
    pub fn insert(&mut self, element: T) -> bool {
        match trie::insert(&self.root, element, (), InsertPolicy::Skip) {
            TrieInsertion::Unchanged => false,
            TrieInsertion::Added(root) => {
                self.root = root;
                self.length += 1;
                self.version += 1;
                true
            }
            TrieInsertion::Updated(_) | TrieInsertion::Conflict(..) => {
                unreachable!("skip never updates or conflicts")
            }
        }
    }

    /// Removes `element` in place. Returns `true` when it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match trie::remove(&self.root, element) {
            TrieRemoval::NotFound => false,
            TrieRemoval::Removed(root, ()) => {
                self.root = root;
                self.length -= 1;
                self.version += 1;
                true
            }
        }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.root = None;
        self.length = 0;
        self.version += 1;
    }

    /// Freezes the current contents into a [`PersistentHashSet`] while
    /// the builder stays usable.
    #[must_use]
    pub fn to_persistent(&self) -> PersistentHashSet<T> {
        PersistentHashSet {
            root: self.root.clone(),
            length: self.length,
        }
    }

    /// Consumes the builder, freezing its contents without copying.
    #[must_use]
    pub fn into_persistent(self) -> PersistentHashSet<T> {
        PersistentHashSet {
            root: self.root,
            length: self.length,
        }
    }
}

impl<T> Default for TransientHashSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> Extend<T> for TransientHashSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIterator<'a, T> {
    inner: TrieIter<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentHashSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIntoIterator<T: 'static> {
    inner: TrieIntoIter<T, ()>,
}

impl<T: Clone + 'static> Iterator for PersistentHashSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Clone + 'static> ExactSizeIterator for PersistentHashSetIntoIterator<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// A version-guarded iterator over the elements of a [`TransientHashSet`].
pub struct TransientHashSetIterator<'a, T> {
    inner: TrieIter<'a, T, ()>,
    expected_version: u64,
    current_version: &'a u64,
}

impl<'a, T> Iterator for TransientHashSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(error) = pool::guard_version(self.expected_version, *self.current_version) {
            panic!("{error}");
        }
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentHashSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> FromIterator<T> for PersistentHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = TransientHashSet::new();
        transient.extend(iter);
        transient.into_persistent()
    }
}

impl<T: Clone + 'static> IntoIterator for PersistentHashSet<T> {
    type Item = T;
    type IntoIter = PersistentHashSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentHashSetIntoIterator {
            inner: TrieIntoIter::new(self.root, self.length),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentHashSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentHashSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Order-insensitive equality: equal when both sets hold the same
/// elements.
impl<T: Clone + Eq + Hash> PartialEq for PersistentHashSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().all(|element| other.contains(element))
    }
}

impl<T: Clone + Eq + Hash> Eq for PersistentHashSet<T> {}

/// Order-insensitive hash combining per-element hashes commutatively.
impl<T: Hash> Hash for PersistentHashSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        let mut combined: u64 = 0;
        for (element, ()) in TrieIter::new(&self.root, self.length) {
            combined = combined.wrapping_add(trie::compute_hash(element));
        }
        combined.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentHashSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentHashSet<T> {
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

impl<T> Sequence for PersistentHashSet<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.length
    }

    fn fold_left<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        TrieIter::new(&self.root, self.length)
            .fold(init, |accumulator, (element, ())| function(accumulator, element))
    }
}

impl<T> Sortable for PersistentHashSet<T> {
    fn to_sorted_vec(&self) -> Vec<T>
    where
        T: Clone + Ord,
    {
        let mut elements: Vec<T> = TrieIter::new(&self.root, self.length)
            .map(|(element, ())| element.clone())
            .collect();
        elements.sort();
        elements
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentHashSet<T> {
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
struct PersistentHashSetVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentHashSetVisitor<T>
where
    T: serde::Deserialize<'de> + Clone + Eq + Hash,
{
    type Value = PersistentHashSet<T>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a sequence of set elements")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut transient = TransientHashSet::new();
        while let Some(element) = access.next_element()? {
            transient.insert(element);
        }
        Ok(transient.into_persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentHashSet<T>
where
    T: serde::Deserialize<'de> + Clone + Eq + Hash,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentHashSetVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Thread-safety assertions
// =============================================================================

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(TransientHashSet<i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
