//! Persistent (immutable) hash map backed by the hash trie engine.
//!
//! [`PersistentHashMap`] keys entries by their hash code and resolves
//! collisions inside per-hash buckets, so keys only need `Hash + Eq`;
//! no ordering is required. Iteration order follows hash order and is
//! therefore unspecified with respect to insertion order.
//!
//! # Examples
//!
//! ```rust
//! use permafrost::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one", 1)
//!     .insert("two", 2);
//!
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(map.len(), 2);
//!
//! // Structural sharing: the original map is preserved
//! let removed = map.remove("one");
//! assert_eq!(map.len(), 2);
//! assert_eq!(removed.len(), 1);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::error::MapError;
use crate::pool;
use crate::traits::{Keyed, Sequence};
use crate::trie::{self, InsertPolicy, TrieInsertion, TrieIntoIter, TrieIter, TrieRemoval, TrieRoot};

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map.
///
/// All operations return a new map and leave the original untouched;
/// unchanged subtrees are shared between versions. An insert that would
/// not change the map (same key, equal value) returns a map sharing its
/// entire root with the original, so callers can detect no-ops by
/// pointer identity.
///
/// # Time Complexity
///
/// | Operation          | Complexity            |
/// |--------------------|-----------------------|
/// | `get`              | O(log N) expected     |
/// | `insert`           | O(log N) expected     |
/// | `remove`           | O(log N) expected     |
/// | `len` / `is_empty` | O(1)                  |
///
/// Colliding keys degrade gracefully: a bucket with C colliding keys
/// costs an extra O(C) scan.
#[derive(Clone)]
pub struct PersistentHashMap<K, V> {
    root: TrieRoot<K, V>,
    length: usize,
}

impl<K, V> PersistentHashMap<K, V> {
    /// Creates a new empty map.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns an iterator over `(&key, &value)` pairs in hash order.
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator {
            inner: TrieIter::new(&self.root, self.length),
        }
    }

    /// Returns an iterator over the keys.
    #[must_use]
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values.
    #[must_use]
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Clone + Eq + Hash, V: Clone> PersistentHashMap<K, V> {
    /// Returns the value stored under `key`.
    ///
    /// The key may be borrowed: a `PersistentHashMap<String, _>` accepts
    /// `&str` here, as with the standard maps.
    ///
    /// # Complexity
    ///
    /// O(log N) expected.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        trie::get(&self.root, key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
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
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.get(key).ok_or_else(|| MapError::key_not_found(&key))
    }

    /// Returns the key instance actually stored under `key`.
    ///
    /// Useful when keys carry data that does not participate in `Eq`
    /// (canonical casing, interned instances).
    #[must_use]
    pub fn get_stored_key<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        // Walk the pairs of the matching bucket rather than the value
        self.iter()
            .find(|(stored, _)| (*stored).borrow() == key)
            .map(|(stored, _)| stored)
    }

    /// Removes `key`, returning the new map.
    ///
    /// When the key is absent the returned map shares its entire root
    /// with `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1);
    /// let removed = map.remove("a");
    /// assert!(removed.is_empty());
    /// assert_eq!(map.len(), 1); // Original unchanged
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match trie::remove(&self.root, key) {
            TrieRemoval::NotFound => self.clone(),
            TrieRemoval::Removed(root, _) => Self {
                root,
                length: self.length - 1,
            },
        }
    }

    /// Removes `key`, returning the new map together with the removed
    /// value, or `None` when the key is absent.
    #[must_use]
    pub fn remove_entry<Q>(&self, key: &Q) -> Option<(Self, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match trie::remove(&self.root, key) {
            TrieRemoval::NotFound => None,
            TrieRemoval::Removed(root, value) => Some((
                Self {
                    root,
                    length: self.length - 1,
                },
                value,
            )),
        }
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

    /// Converts this map into a mutable [`TransientHashMap`] builder.
    #[must_use]
    pub fn to_transient(&self) -> TransientHashMap<K, V> {
        TransientHashMap {
            root: self.root.clone(),
            length: self.length,
            version: 0,
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone + PartialEq> PersistentHashMap<K, V> {
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
    ///
    /// # Examples
    ///
    /// ```rust
    /// use permafrost::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1);
    /// let updated = map.insert("a", 2);
    /// assert_eq!(map.get("a"), Some(&1));     // Original unchanged
    /// assert_eq!(updated.get("a"), Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        match trie::insert(&self.root, key, value, InsertPolicy::Overwrite) {
            TrieInsertion::Unchanged => self.clone(),
            TrieInsertion::Added(root) => Self {
                root,
                length: self.length + 1,
            },
            TrieInsertion::Updated(root) => Self {
                root,
                length: self.length,
            },
            TrieInsertion::Conflict(..) => unreachable!("overwrite never conflicts"),
        }
    }

    /// Inserts the entry only when `key` is absent; an existing value is
    /// never replaced.
    #[must_use]
    pub fn insert_if_absent(&self, key: K, value: V) -> Self {
        match trie::insert(&self.root, key, value, InsertPolicy::Skip) {
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
        match trie::insert(&self.root, key, value, InsertPolicy::ErrorIfDifferentValue) {
            TrieInsertion::Unchanged => Ok(self.clone()),
            TrieInsertion::Added(root) => Ok(Self {
                root,
                length: self.length + 1,
            }),
            TrieInsertion::Conflict(key, _) => Err(MapError::duplicate_key(&key)),
            TrieInsertion::Updated(_) => unreachable!("the error policy never updates"),
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

    /// Adds every entry, treating key conflicts the way [`Self::try_insert`]
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateKey`] for the first conflicting key;
    /// no partial map escapes on failure.
    pub fn try_insert_many<I>(&self, entries: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: fmt::Debug,
    {
        let mut transient = self.to_transient();
        for (key, value) in entries {
            transient.try_insert(key, value)?;
        }
        Ok(transient.into_persistent())
    }

    /// Returns `true` if the map contains exactly this key/value pair.
    #[must_use]
    pub fn contains_entry<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key) == Some(value)
    }

    /// Returns `true` if any entry holds `value`. O(N).
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.values().any(|stored| stored == value)
    }
}

// =============================================================================
// TransientHashMap Definition
// =============================================================================

/// A mutable staging map convertible to and from [`PersistentHashMap`].
///
/// Useful when many entries are staged at once: intermediate map
/// versions are never materialized. Not thread-safe.
///
/// # Examples
///
/// ```rust
/// use permafrost::PersistentHashMap;
///
/// let mut builder = PersistentHashMap::new().to_transient();
/// builder.insert("a", 1);
/// builder.insert("b", 2);
/// let map = builder.into_persistent();
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone)]
pub struct TransientHashMap<K, V> {
    root: TrieRoot<K, V>,
    length: usize,
    version: u64,
}

impl<K, V> TransientHashMap<K, V> {
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

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the builder holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns an iterator over `(&key, &value)` pairs, guarded by the
    /// builder version: iterating past a mutation panics instead of
    /// yielding stale entries.
    #[must_use]
    pub fn iter(&self) -> TransientHashMapIterator<'_, K, V> {
        TransientHashMapIterator {
            inner: TrieIter::new(&self.root, self.length),
            expected_version: self.version,
            current_version: &self.version,
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone> TransientHashMap<K, V> {
    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        trie::get(&self.root, key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes `key`, returning the removed value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match trie::remove(&self.root, key) {
            TrieRemoval::NotFound => None,
            TrieRemoval::Removed(root, value) => {
                self.root = root;
                self.length -= 1;
                self.version += 1;
                Some(value)
            }
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.root = None;
        self.length = 0;
        self.version += 1;
    }

    /// Freezes the current contents into a [`PersistentHashMap`] while
    /// the builder stays usable.
    #[must_use]
    pub fn to_persistent(&self) -> PersistentHashMap<K, V> {
        PersistentHashMap {
            root: self.root.clone(),
            length: self.length,
        }
    }

    /// Consumes the builder, freezing its contents without copying.
    #[must_use]
    pub fn into_persistent(self) -> PersistentHashMap<K, V> {
        PersistentHashMap {
            root: self.root,
            length: self.length,
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone + PartialEq> TransientHashMap<K, V> {
    /// Inserts or replaces the value under `key`, returning the previous
    /// binding state: `true` when the key was newly added.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match trie::insert(&self.root, key, value, InsertPolicy::Overwrite) {
            TrieInsertion::Unchanged => false,
            TrieInsertion::Added(root) => {
                self.root = root;
                self.length += 1;
                self.version += 1;
                true
            }
            TrieInsertion::Updated(root) => {
                self.root = root;
                self.version += 1;
                false
            }
            TrieInsertion::Conflict(..) => unreachable!("overwrite never conflicts"),
        }
    }

    /// Inserts the entry only when `key` is absent. Returns `true` when
    /// the entry was added.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        match trie::insert(&self.root, key, value, InsertPolicy::Skip) {
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

    /// Inserts the entry, treating an existing key with a different
    /// value as an error.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateKey`] when `key` is already bound to
    /// a different value.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), MapError>
    where
        K: fmt::Debug,
    {
        match trie::insert(&self.root, key, value, InsertPolicy::ErrorIfDifferentValue) {
            TrieInsertion::Unchanged => Ok(()),
            TrieInsertion::Added(root) => {
                self.root = root;
                self.length += 1;
                self.version += 1;
                Ok(())
            }
            TrieInsertion::Conflict(key, _) => Err(MapError::duplicate_key(&key)),
            TrieInsertion::Updated(_) => unreachable!("the error policy never updates"),
        }
    }
}

impl<K, V> Default for TransientHashMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash, V: Clone + PartialEq> Extend<(K, V)> for TransientHashMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over the entries of a [`PersistentHashMap`].
pub struct PersistentHashMapIterator<'a, K, V> {
    inner: TrieIter<'a, K, V>,
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the entries of a [`PersistentHashMap`].
pub struct PersistentHashMapIntoIterator<K: 'static, V: 'static> {
    inner: TrieIntoIter<K, V>,
}

impl<K: Clone + 'static, V: Clone + 'static> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Clone + 'static, V: Clone + 'static> ExactSizeIterator
    for PersistentHashMapIntoIterator<K, V>
{
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// A version-guarded iterator over the entries of a [`TransientHashMap`].
pub struct TransientHashMapIterator<'a, K, V> {
    inner: TrieIter<'a, K, V>,
    expected_version: u64,
    current_version: &'a u64,
}

impl<'a, K, V> Iterator for TransientHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(error) = pool::guard_version(self.expected_version, *self.current_version) {
            panic!("{error}");
        }
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentHashMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash, V: Clone + PartialEq> FromIterator<(K, V)> for PersistentHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientHashMap::new();
        transient.extend(iter);
        transient.into_persistent()
    }
}

impl<K: Clone + 'static, V: Clone + 'static> IntoIterator for PersistentHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentHashMapIntoIterator {
            inner: TrieIntoIter::new(self.root, self.length),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Order-insensitive equality: equal when both maps bind the same keys
/// to equal values.
impl<K: Clone + Eq + Hash, V: Clone + PartialEq> PartialEq for PersistentHashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Clone + Eq + Hash, V: Clone + Eq> Eq for PersistentHashMap<K, V> {}

/// Order-insensitive hash: per-entry hashes are combined with a
/// commutative operation so equal maps hash equally regardless of
/// internal bucket order.
impl<K: Hash, V: Hash> Hash for PersistentHashMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        let mut combined: u64 = 0;
        for pair in TrieIter::new(&self.root, self.length) {
            combined = combined.wrapping_add(trie::compute_hash(pair));
        }
        combined.hash(state);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentHashMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for PersistentHashMap<K, V> {
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

impl<K, V> Sequence for PersistentHashMap<K, V> {
    type Item = (K, V);

    fn len(&self) -> usize {
        self.length
    }

    fn fold_left<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &(K, V)) -> B,
    {
        TrieIter::new(&self.root, self.length)
            .fold(init, |accumulator, pair| function(accumulator, pair))
    }
}

impl<K: Clone + Eq + Hash, V: Clone> Keyed for PersistentHashMap<K, V> {
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for PersistentHashMap<K, V>
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
struct PersistentHashMapVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for PersistentHashMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de> + Clone + PartialEq,
{
    type Value = PersistentHashMap<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut transient = TransientHashMap::new();
        while let Some((key, value)) = access.next_entry()? {
            transient.insert(key, value);
        }
        Ok(transient.into_persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for PersistentHashMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de> + Clone + PartialEq,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentHashMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Thread-safety assertions
// =============================================================================

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(TransientHashMap<i32, i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
