//! Persistent (immutable) map ordered by key, backed directly by the
//! counted AVL engine.
//!
//! Unlike [`crate::PersistentHashMap`], iteration yields entries in
//! ascending key order, and entries can additionally be addressed by
//! rank: `get_at(i)` returns the i-th smallest entry in O(log N).
//!
//! # Examples
//!
//! ```rust
//! use permafrost::PersistentSortedMap;
//!
//! let map = PersistentSortedMap::new()
//!     .insert("cherry", 3)
//!     .insert("apple", 1)
//!     .insert("banana", 2);
//!
//! let keys: Vec<&&str> = map.keys().collect();
//! assert_eq!(keys, vec![&"apple", &"banana", &"cherry"]);
//! assert_eq!(map.get_at(0), Some((&"apple", &1)));
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::avl::{self, Link};
use crate::error::MapError;
use crate::pool;
use crate::traits::{Keyed, Sequence, Sortable};

// =============================================================================
// PersistentSortedMap Definition
// =============================================================================

/// A persistent (immutable) key-ordered map.
///
/// All operations return a new map and leave the original untouched;
/// no-op operations (overwriting with an equal value, removing an
/// absent key) return a map sharing its entire root with the original.
///
/// # Time Complexity
///
/// | Operation          | Complexity |
/// |--------------------|------------|
/// | `get`              | O(log N)   |
/// | `get_at` (by rank) | O(log N)   |
/// | `insert`           | O(log N)   |
/// | `remove`           | O(log N)   |
/// | `min` / `max`      | O(log N)   |
#[derive(Clone)]
pub struct PersistentSortedMap<K, V> {
    root: Link<(K, V)>,
}

/// Rank of `key` within the subtree: the number of strictly smaller keys.
fn rank_of<K, V, Q>(root: &Link<(K, V)>, key: &Q) -> Option<usize>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut link = root;
    let mut preceding = 0;
    while let Some(node) = link.as_ref() {
        match key.cmp(node.element().0.borrow()) {
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

impl<K, V> PersistentSortedMap<K, V> {
    /// Creates a new empty map.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Returns the number of entries.
    ///
    /// # Complexity
    ///
    /// O(1), read off the root's subtree count.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        avl::count(&self.root)
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the entry with rank `index` (the `index`-th smallest key).
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<(&K, &V)> {
        avl::get_at(&self.root, index).map(|(key, value)| (key, value))
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn min(&self) -> Option<(&K, &V)> {
        avl::leftmost(&self.root).map(|(key, value)| (key, value))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn max(&self) -> Option<(&K, &V)> {
        avl::rightmost(&self.root).map(|(key, value)| (key, value))
    }

    /// Returns an iterator over entries in ascending key order.
    #[must_use]
    pub fn iter(&self) -> PersistentSortedMapIterator<'_, K, V> {
        PersistentSortedMapIterator {
            inner: avl::InOrderIter::new(&self.root),
        }
    }

    /// Returns an iterator over entries in descending key order.
    #[must_use]
    pub fn iter_reversed(&self) -> PersistentSortedMapReverseIterator<'_, K, V> {
        PersistentSortedMapReverseIterator {
            inner: avl::ReverseOrderIter::new(&self.root),
        }
    }

    /// Returns an iterator over the keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values in ascending key order.
    #[must_use]
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Clone + Ord, V: Clone> PersistentSortedMap<K, V> {
    /// Returns the value stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        avl::find_by(&self.root, &|pair: &(K, V)| key.cmp(pair.0.borrow()))
            .map(|(_, value)| value)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Strict lookup: like [`get`](Self::get), but an absent key is an
    /// error instead of `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::KeyNotFound`] when `key` is absent.
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V, MapError>
    where
        K: Borrow<Q>,
        Q: Ord + fmt::Debug + ?Sized,
    {
        self.get(key).ok_or_else(|| MapError::key_not_found(&key))
    }

    /// Returns the key instance actually stored under `key`.
    #[must_use]
    pub fn get_stored_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        avl::find_by(&self.root, &|pair: &(K, V)| key.cmp(pair.0.borrow()))
            .map(|(stored, _)| stored)
    }

    /// Returns the rank of `key`: how many entries have a strictly
    /// smaller key. `None` when the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentSortedMap;
    ///
    /// let map = PersistentSortedMap::new().insert(10, "a").insert(20, "b");
    /// assert_eq!(map.index_of(&20), Some(1));
    /// assert_eq!(map.index_of(&15), None);
    /// ```
    #[must_use]
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        rank_of(&self.root, key)
    }

    /// Returns an iterator over the entries whose keys fall within
    /// `bounds`, in ascending key order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentSortedMap;
    ///
    /// let map: PersistentSortedMap<i32, &str> =
    ///     [(1, "a"), (2, "b"), (3, "c"), (4, "d")].into_iter().collect();
    /// let slice: Vec<i32> = map.range(2..4).map(|(key, _)| *key).collect();
    /// assert_eq!(slice, vec![2, 3]);
    /// ```
    pub fn range<R>(&self, bounds: R) -> impl Iterator<Item = (&K, &V)>
    where
        R: std::ops::RangeBounds<K>,
    {
        use std::ops::Bound;
        let start = bounds.start_bound().cloned();
        let end = bounds.end_bound().cloned();
        self.iter()
            .skip_while(move |(key, _)| match &start {
                Bound::Included(bound) => *key < bound,
                Bound::Excluded(bound) => *key <= bound,
                Bound::Unbounded => false,
            })
            .take_while(move |(key, _)| match &end {
                Bound::Included(bound) => *key <= bound,
                Bound::Excluded(bound) => *key < bound,
                Bound::Unbounded => true,
            })
    }

    /// Removes `key`, returning the new map.
    ///
    /// When the key is absent the returned map shares its entire root
    /// with `self`.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match avl::remove_by(&self.root, &|pair: &(K, V)| key.cmp(pair.0.borrow())) {
            None => self.clone(),
            Some((root, _)) => Self { root },
        }
    }

    /// Removes `key`, returning the new map together with the removed
    /// value, or `None` when the key is absent.
    #[must_use]
    pub fn remove_entry<Q>(&self, key: &Q) -> Option<(Self, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        avl::remove_by(&self.root, &|pair: &(K, V)| key.cmp(pair.0.borrow()))
            .map(|(root, (_, value))| (Self { root }, value))
    }

    /// Removes every key yielded by `keys`, returning the new map.
    #[must_use]
    pub fn remove_many<I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut transient = self.to_transient();
        for key in keys {
            transient.remove(&key);
        }
        transient.into_persistent()
    }

    /// Converts this map into a mutable [`TransientSortedMap`] builder.
    #[must_use]
    pub fn to_transient(&self) -> TransientSortedMap<K, V> {
        TransientSortedMap {
            root: self.root.clone(),
            version: 0,
        }
    }
}

impl<K: Clone + Ord, V: Clone + PartialEq> PersistentSortedMap<K, V> {
    /// Creates a map containing a single entry.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Inserts or replaces the value under `key` (upsert).
    ///
    /// Replacing a value with an equal one is a no-op: the returned map
    /// shares its entire root with `self`.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let insertion = avl::insert_by(
            &self.root,
            (key, value),
            &|incoming: &(K, V), stored: &(K, V)| incoming.0.cmp(&stored.0),
            &|stored: &(K, V), incoming: (K, V)| {
                if stored.1 == incoming.1 {
                    None
                } else {
                    Some(incoming)
                }
            },
        );
        match insertion {
            avl::Insertion::Unchanged => self.clone(),
            avl::Insertion::Added(root) | avl::Insertion::Updated(root) => Self { root },
        }
    }

    /// Inserts the entry only when `key` is absent.
    #[must_use]
    pub fn insert_if_absent(&self, key: K, value: V) -> Self {
        let insertion = avl::insert_by(
            &self.root,
            (key, value),
            &|incoming: &(K, V), stored: &(K, V)| incoming.0.cmp(&stored.0),
            &|_: &(K, V), _: (K, V)| None,
        );
        match insertion {
            avl::Insertion::Unchanged => self.clone(),
            avl::Insertion::Added(root) => Self { root },
            avl::Insertion::Updated(_) => unreachable!("the merge never replaces"),
        }
    }

    /// Inserts the entry, treating an existing key with a *different*
    /// value as an error. Re-adding an identical entry is a tolerated
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateKey`] when `key` is already bound to
    /// a different value.
    pub fn try_insert(&self, key: K, value: V) -> Result<Self, MapError>
    where
        K: fmt::Debug,
    {
        match self.get(&key) {
            Some(existing) if *existing == value => Ok(self.clone()),
            Some(_) => Err(MapError::duplicate_key(&key)),
            None => Ok(self.insert(key, value)),
        }
    }

    /// Upserts every entry yielded by `entries`, returning the new map.
    #[must_use]
    pub fn insert_many<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut transient = self.to_transient();
        for (key, value) in entries {
            transient.insert(key, value);
        }
        transient.into_persistent()
    }

    /// Returns `true` if any entry holds `value`. O(N).
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.values().any(|stored| stored == value)
    }
}

// =============================================================================
// TransientSortedMap Definition
// =============================================================================

/// A mutable staging map convertible to and from [`PersistentSortedMap`].
///
/// Not thread-safe.
#[derive(Clone)]
pub struct TransientSortedMap<K, V> {
    root: Link<(K, V)>,
    version: u64,
}

impl<K, V> TransientSortedMap<K, V> {
    /// Creates an empty builder.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            version: 0,
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        avl::count(&self.root)
    }

    /// Returns `true` if the builder holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a version-guarded iterator over entries in ascending
    /// key order.
    #[must_use]
    pub fn iter(&self) -> TransientSortedMapIterator<'_, K, V> {
        TransientSortedMapIterator {
            inner: avl::InOrderIter::new(&self.root),
            expected_version: self.version,
            current_version: &self.version,
        }
    }
}

impl<K: Clone + Ord, V: Clone> TransientSortedMap<K, V> {
    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        avl::find_by(&self.root, &|pair: &(K, V)| key.cmp(pair.0.borrow()))
            .map(|(_, value)| value)
    }

    /// Removes `key`, returning the removed value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (root, (_, value)) =
            avl::remove_by(&self.root, &|pair: &(K, V)| key.cmp(pair.0.borrow()))?;
        self.root = root;
        self.version += 1;
        Some(value)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.root = None;
        self.version += 1;
    }

    /// Freezes the current contents into a [`PersistentSortedMap`]
    /// while the builder stays usable.
    #[must_use]
    pub fn to_persistent(&self) -> PersistentSortedMap<K, V> {
        PersistentSortedMap {
            root: self.root.clone(),
        }
    }

    /// Consumes the builder, freezing its contents without copying.
    #[must_use]
    pub fn into_persistent(self) -> PersistentSortedMap<K, V> {
        PersistentSortedMap { root: self.root }
    }
}

impl<K: Clone + Ord, V: Clone + PartialEq> TransientSortedMap<K, V> {
    /// Inserts or replaces the value under `key`. Returns `true` when
    /// the key was newly added.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let insertion = avl::insert_by(
            &self.root,
            (key, value),
            &|incoming: &(K, V), stored: &(K, V)| incoming.0.cmp(&stored.0),
            &|stored: &(K, V), incoming: (K, V)| {
                if stored.1 == incoming.1 {
                    None
                } else {
                    Some(incoming)
                }
            },
        );
        match insertion {
            avl::Insertion::Unchanged => false,
            avl::Insertion::Added(root) => {
                self.root = root;
                self.version += 1;
                true
            }
            avl::Insertion::Updated(root) => {
                self.root = root;
                self.version += 1;
                false
            }
        }
    }
}

impl<K, V> Default for TransientSortedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord, V: Clone + PartialEq> Extend<(K, V)> for TransientSortedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An ascending iterator over the entries of a [`PersistentSortedMap`].
pub struct PersistentSortedMapIterator<'a, K, V> {
    inner: avl::InOrderIter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for PersistentSortedMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentSortedMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// A descending iterator over the entries of a [`PersistentSortedMap`].
pub struct PersistentSortedMapReverseIterator<'a, K, V> {
    inner: avl::ReverseOrderIter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for PersistentSortedMapReverseIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An owning ascending iterator over the entries of a
/// [`PersistentSortedMap`].
pub struct PersistentSortedMapIntoIterator<K: 'static, V: 'static> {
    inner: avl::OwnedInOrderIter<(K, V)>,
}

impl<K: Clone + 'static, V: Clone + 'static> Iterator for PersistentSortedMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A version-guarded iterator over the entries of a
/// [`TransientSortedMap`].
pub struct TransientSortedMapIterator<'a, K, V> {
    inner: avl::InOrderIter<'a, (K, V)>,
    expected_version: u64,
    current_version: &'a u64,
}

impl<'a, K, V> Iterator for TransientSortedMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(error) = pool::guard_version(self.expected_version, *self.current_version) {
            panic!("{error}");
        }
        self.inner.next().map(|(key, value)| (key, value))
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentSortedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord, V: Clone + PartialEq> FromIterator<(K, V)> for PersistentSortedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientSortedMap::new();
        transient.extend(iter);
        transient.into_persistent()
    }
}

impl<K: Clone + 'static, V: Clone + 'static> IntoIterator for PersistentSortedMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentSortedMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentSortedMapIntoIterator {
            inner: avl::OwnedInOrderIter::new(self.root),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentSortedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentSortedMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Entry-wise equality in key order.
impl<K: PartialEq, V: PartialEq> PartialEq for PersistentSortedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for PersistentSortedMap<K, V> {}

/// Hashes entries in key order; equal maps iterate identically, so no
/// commutative combination is needed here.
impl<K: Hash, V: Hash> Hash for PersistentSortedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for entry in self.iter() {
            entry.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentSortedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for PersistentSortedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Capability Trait Implementations
// =============================================================================

impl<K, V> Sequence for PersistentSortedMap<K, V> {
    type Item = (K, V);

    fn len(&self) -> usize {
        avl::count(&self.root)
    }

    fn fold_left<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &(K, V)) -> B,
    {
        avl::InOrderIter::new(&self.root)
            .fold(init, |accumulator, pair| function(accumulator, pair))
    }
}

impl<K: Clone + Ord, V: Clone> Keyed for PersistentSortedMap<K, V> {
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}

impl<K, V> Sortable for PersistentSortedMap<K, V> {
    fn to_sorted_vec(&self) -> Vec<(K, V)>
    where
        (K, V): Clone + Ord,
    {
        avl::InOrderIter::new(&self.root).cloned().collect()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for PersistentSortedMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentSortedMapVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for PersistentSortedMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone + PartialEq,
{
    type Value = PersistentSortedMap<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut transient = TransientSortedMap::new();
        while let Some((key, value)) = access.next_entry()? {
            transient.insert(key, value);
        }
        Ok(transient.into_persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for PersistentSortedMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone + PartialEq,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentSortedMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Thread-safety assertions
// =============================================================================

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(TransientSortedMap<i32, i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
