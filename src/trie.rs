//! Hash trie engine backing the hashed map and set.
//!
//! The trie is the balanced tree engine from [`crate::avl`] keyed by raw
//! hash code. Each tree node holds a [`HashBucket`]: the first key/value
//! pair for that hash plus a counted AVL list of additional colliding
//! pairs. All pairs in one bucket share the same hash code; uniqueness of
//! logical keys is decided by `Eq`, never by hash equality.
//!
//! No-op insertions (skip policy, or an overwrite with an equal value)
//! return [`TrieInsertion::Unchanged`] so that facades can hand back the
//! *same* root reference; callers rely on pointer identity to detect
//! that no mutation occurred.

use std::borrow::Borrow;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::avl::{self, AvlNode, Link};
use crate::shared::ReferenceCounter;

// =============================================================================
// Hash computation
// =============================================================================

/// Computes the hash of a key with the configured hashing backend.
pub(crate) fn compute_hash<K: Hash + ?Sized>(key: &K) -> u64 {
    #[cfg(feature = "ahash")]
    let mut hasher = ahash::AHasher::default();
    #[cfg(all(feature = "fxhash", not(feature = "ahash")))]
    let mut hasher = rustc_hash::FxHasher::default();
    #[cfg(not(any(feature = "ahash", feature = "fxhash")))]
    let mut hasher = std::collections::hash_map::DefaultHasher::new();

    key.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Bucket Definition
// =============================================================================

/// The per-hash-code collision container: a first pair plus an indexed
/// AVL list of the remaining pairs in insertion order.
#[derive(Clone)]
pub(crate) struct HashBucket<K, V> {
    hash: u64,
    first: (K, V),
    additional: Link<(K, V)>,
}

/// How the trie resolves an insert that finds the key already present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InsertPolicy {
    /// Replace the stored value (upsert). Equal values are a no-op.
    Overwrite,
    /// Keep the stored value untouched.
    Skip,
    /// Conflict only when the stored value differs from the new one.
    ErrorIfDifferentValue,
    /// Conflict whenever the key is present at all.
    ErrorAlways,
}

enum BucketInsertion<K, V> {
    Unchanged,
    Added(HashBucket<K, V>),
    Updated(HashBucket<K, V>),
    Conflict(K, V),
}

enum BucketRemoval<K, V> {
    NotFound,
    /// The bucket still holds at least one pair.
    Shrunk(HashBucket<K, V>, V),
    /// The last pair left; the trie node collapses entirely.
    Emptied(V),
}

impl<K, V> HashBucket<K, V> {
    const fn of(hash: u64, key: K, value: V) -> Self {
        Self {
            hash,
            first: (key, value),
            additional: None,
        }
    }

    pub(crate) const fn hash(&self) -> u64 {
        self.hash
    }

    pub(crate) fn len(&self) -> usize {
        1 + avl::count(&self.additional)
    }

    /// Iterates the first pair, then the overflow pairs in insertion order.
    pub(crate) fn pairs(&self) -> impl Iterator<Item = &(K, V)> {
        std::iter::once(&self.first).chain(avl::InOrderIter::new(&self.additional))
    }
}

impl<K: Clone + Eq, V: Clone> HashBucket<K, V> {
    /// Looks a key up: the first slot is compared first, then the
    /// overflow list is scanned with `Eq`.
    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if self.first.0.borrow() == key {
            return Some(&self.first.1);
        }
        avl::InOrderIter::new(&self.additional)
            .find(|(stored, _)| stored.borrow() == key)
            .map(|(_, value)| value)
    }

    /// Finds the overflow-list index of a key, if present.
    fn position_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        avl::InOrderIter::new(&self.additional).position(|(stored, _)| stored.borrow() == key)
    }

    fn with_first(&self, key: K, value: V) -> Self {
        Self {
            hash: self.hash,
            first: (key, value),
            additional: self.additional.clone(),
        }
    }

    fn with_additional(&self, additional: Link<(K, V)>) -> Self {
        Self {
            hash: self.hash,
            first: self.first.clone(),
            additional,
        }
    }
}

impl<K: Clone + Eq, V: Clone + PartialEq> HashBucket<K, V> {
    fn insert(&self, key: K, value: V, policy: InsertPolicy) -> BucketInsertion<K, V> {
        if self.first.0 == key {
            return self.resolve_match(key, value, policy, None);
        }
        match self.position_of(&key) {
            Some(index) => self.resolve_match(key, value, policy, Some(index)),
            None => {
                let appended =
                    avl::insert_at(&self.additional, avl::count(&self.additional), (key, value));
                BucketInsertion::Added(self.with_additional(appended))
            }
        }
    }

    /// Applies the insert policy to an existing pair. `index` is `None`
    /// for the first slot, `Some` for an overflow-list position.
    fn resolve_match(
        &self,
        key: K,
        value: V,
        policy: InsertPolicy,
        index: Option<usize>,
    ) -> BucketInsertion<K, V> {
        let existing = index.map_or(&self.first.1, |position| {
            &avl::get_at(&self.additional, position)
                .unwrap_or_else(|| unreachable!("position found by scan"))
                .1
        });
        match policy {
            InsertPolicy::Skip => BucketInsertion::Unchanged,
            InsertPolicy::ErrorAlways => BucketInsertion::Conflict(key, value),
            InsertPolicy::Overwrite | InsertPolicy::ErrorIfDifferentValue => {
                if *existing == value {
                    return BucketInsertion::Unchanged;
                }
                if policy == InsertPolicy::ErrorIfDifferentValue {
                    return BucketInsertion::Conflict(key, value);
                }
                BucketInsertion::Updated(match index {
                    None => self.with_first(key, value),
                    Some(position) => self.with_additional(avl::replace_at(
                        &self.additional,
                        position,
                        (key, value),
                    )),
                })
            }
        }
    }

}

impl<K: Clone + Eq, V: Clone> HashBucket<K, V> {
    fn remove<Q>(&self, key: &Q) -> BucketRemoval<K, V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if self.first.0.borrow() == key {
            let removed = self.first.1.clone();
            return match avl::count(&self.additional) {
                0 => BucketRemoval::Emptied(removed),
                _ => {
                    // Promote the oldest overflow pair into the first slot
                    let (rest, promoted) = avl::remove_at(&self.additional, 0);
                    BucketRemoval::Shrunk(
                        Self {
                            hash: self.hash,
                            first: promoted,
                            additional: rest,
                        },
                        removed,
                    )
                }
            };
        }
        match self.position_of(key) {
            None => BucketRemoval::NotFound,
            Some(position) => {
                let (rest, removed) = avl::remove_at(&self.additional, position);
                BucketRemoval::Shrunk(self.with_additional(rest), removed.1)
            }
        }
    }
}

// =============================================================================
// Trie Operations
// =============================================================================

/// The root of a hash trie.
pub(crate) type TrieRoot<K, V> = Link<HashBucket<K, V>>;

/// The result of a trie insertion. `Unchanged` means the caller keeps
/// its original root; the size delta is 1 for `Added`, 0 otherwise.
pub(crate) enum TrieInsertion<K, V> {
    Unchanged,
    Added(TrieRoot<K, V>),
    Updated(TrieRoot<K, V>),
    /// The policy forbade the insert; the pair is handed back so the
    /// facade can build its error without extra bounds here.
    Conflict(K, V),
}

/// The result of a trie removal.
pub(crate) enum TrieRemoval<K, V> {
    NotFound,
    Removed(TrieRoot<K, V>, V),
}

/// Looks up a key by hash, then by equality inside the bucket.
pub(crate) fn get<'a, K, V, Q>(root: &'a TrieRoot<K, V>, key: &Q) -> Option<&'a V>
where
    K: Clone + Eq + Borrow<Q>,
    V: Clone,
    Q: Hash + Eq + ?Sized,
{
    let hash = compute_hash(key);
    find_bucket(root, hash)?.get(key)
}

fn find_bucket<K, V>(root: &TrieRoot<K, V>, hash: u64) -> Option<&HashBucket<K, V>> {
    avl::find_by(root, &|bucket: &HashBucket<K, V>| hash.cmp(&bucket.hash))
}

/// Inserts a pair under the given policy.
pub(crate) fn insert<K, V>(
    root: &TrieRoot<K, V>,
    key: K,
    value: V,
    policy: InsertPolicy,
) -> TrieInsertion<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone + PartialEq,
{
    let hash = compute_hash(&key);
    insert_into(root, hash, key, value, policy)
}

fn insert_into<K, V>(
    link: &TrieRoot<K, V>,
    hash: u64,
    key: K,
    value: V,
    policy: InsertPolicy,
) -> TrieInsertion<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone + PartialEq,
{
    let Some(node) = link.as_ref() else {
        let leaf = AvlNode::leaf(HashBucket::of(hash, key, value));
        return TrieInsertion::Added(Some(ReferenceCounter::new(leaf)));
    };
    match hash.cmp(&node.element().hash) {
        std::cmp::Ordering::Less => {
            match insert_into(node.left(), hash, key, value, policy) {
                TrieInsertion::Unchanged => TrieInsertion::Unchanged,
                TrieInsertion::Conflict(key, value) => TrieInsertion::Conflict(key, value),
                TrieInsertion::Added(new_left) => TrieInsertion::Added(avl::with_new_children(
                    node,
                    new_left,
                    node.right().clone(),
                )),
                TrieInsertion::Updated(new_left) => TrieInsertion::Updated(
                    avl::with_new_children(node, new_left, node.right().clone()),
                ),
            }
        }
        std::cmp::Ordering::Greater => {
            match insert_into(node.right(), hash, key, value, policy) {
                TrieInsertion::Unchanged => TrieInsertion::Unchanged,
                TrieInsertion::Conflict(key, value) => TrieInsertion::Conflict(key, value),
                TrieInsertion::Added(new_right) => TrieInsertion::Added(avl::with_new_children(
                    node,
                    node.left().clone(),
                    new_right,
                )),
                TrieInsertion::Updated(new_right) => TrieInsertion::Updated(
                    avl::with_new_children(node, node.left().clone(), new_right),
                ),
            }
        }
        std::cmp::Ordering::Equal => match node.element().insert(key, value, policy) {
            BucketInsertion::Unchanged => TrieInsertion::Unchanged,
            BucketInsertion::Conflict(key, value) => TrieInsertion::Conflict(key, value),
            BucketInsertion::Added(bucket) => {
                TrieInsertion::Added(avl::with_new_element(node, bucket))
            }
            BucketInsertion::Updated(bucket) => {
                TrieInsertion::Updated(avl::with_new_element(node, bucket))
            }
        },
    }
}

/// Removes a key. Emptying a bucket removes the trie node entirely.
pub(crate) fn remove<K, V, Q>(root: &TrieRoot<K, V>, key: &Q) -> TrieRemoval<K, V>
where
    K: Clone + Eq + Borrow<Q>,
    V: Clone,
    Q: Hash + Eq + ?Sized,
{
    let hash = compute_hash(key);
    remove_from(root, hash, key)
}

fn remove_from<K, V, Q>(link: &TrieRoot<K, V>, hash: u64, key: &Q) -> TrieRemoval<K, V>
where
    K: Clone + Eq + Borrow<Q>,
    V: Clone,
    Q: Hash + Eq + ?Sized,
{
    let Some(node) = link.as_ref() else {
        return TrieRemoval::NotFound;
    };
    match hash.cmp(&node.element().hash) {
        std::cmp::Ordering::Less => match remove_from(node.left(), hash, key) {
            TrieRemoval::Removed(new_left, removed) => TrieRemoval::Removed(
                avl::with_new_children(node, new_left, node.right().clone()),
                removed,
            ),
            other => other,
        },
        std::cmp::Ordering::Greater => match remove_from(node.right(), hash, key) {
            TrieRemoval::Removed(new_right, removed) => TrieRemoval::Removed(
                avl::with_new_children(node, node.left().clone(), new_right),
                removed,
            ),
            other => other,
        },
        std::cmp::Ordering::Equal => match node.element().remove(key) {
            BucketRemoval::NotFound => TrieRemoval::NotFound,
            BucketRemoval::Shrunk(bucket, removed) => {
                TrieRemoval::Removed(avl::with_new_element(node, bucket), removed)
            }
            BucketRemoval::Emptied(removed) => {
                let collapsed = avl::remove_by(link, &|bucket: &HashBucket<K, V>| {
                    hash.cmp(&bucket.hash)
                })
                .map(|(new_root, _)| new_root)
                .unwrap_or_else(|| unreachable!("bucket located above"));
                TrieRemoval::Removed(collapsed, removed)
            }
        },
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// Borrowed iteration over every pair, bucket by bucket.
pub(crate) struct TrieIter<'a, K, V> {
    buckets: avl::InOrderIter<'a, HashBucket<K, V>>,
    first: Option<&'a (K, V)>,
    overflow: Option<avl::InOrderIter<'a, (K, V)>>,
    remaining: usize,
}

impl<'a, K, V> TrieIter<'a, K, V> {
    pub(crate) fn new(root: &'a TrieRoot<K, V>, length: usize) -> Self {
        Self {
            buckets: avl::InOrderIter::new(root),
            first: None,
            overflow: None,
            remaining: length,
        }
    }
}

impl<'a, K, V> Iterator for TrieIter<'a, K, V> {
    type Item = &'a (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.first.take() {
                self.remaining -= 1;
                return Some(pair);
            }
            if let Some(pair) = self.overflow.as_mut().and_then(|pairs| pairs.next()) {
                self.remaining -= 1;
                return Some(pair);
            }
            let bucket = self.buckets.next()?;
            self.first = Some(&bucket.first);
            self.overflow = Some(avl::InOrderIter::new(&bucket.additional));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for TrieIter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

/// Owning iteration over every pair. Buckets are drained into a small
/// inline buffer; the bucket walk itself uses the pooled stack.
pub(crate) struct TrieIntoIter<K: 'static, V: 'static> {
    buckets: avl::OwnedInOrderIter<HashBucket<K, V>>,
    current: SmallVec<[(K, V); 2]>,
    remaining: usize,
}

impl<K: Clone + 'static, V: Clone + 'static> TrieIntoIter<K, V> {
    pub(crate) fn new(root: TrieRoot<K, V>, length: usize) -> Self {
        Self {
            buckets: avl::OwnedInOrderIter::new(root),
            current: SmallVec::new(),
            remaining: length,
        }
    }
}

impl<K: Clone + 'static, V: Clone + 'static> Iterator for TrieIntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.current.is_empty() {
                self.remaining -= 1;
                return Some(self.current.remove(0));
            }
            let bucket = self.buckets.next()?;
            self.current = bucket.pairs().cloned().collect();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone + 'static, V: Clone + 'static> ExactSizeIterator for TrieIntoIter<K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

// =============================================================================
// Tests
// =============================================================================
