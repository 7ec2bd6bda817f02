//! Small capability traits implemented per concrete collection.
//!
//! Instead of one deep hierarchy of read-only views, each collection
//! implements only the capabilities it actually has: [`Sequence`] for
//! anything enumerable with a known length, [`Keyed`] for the maps, and
//! [`Sortable`] for collections that can produce their elements in
//! sorted order.

/// An enumerable collection with a known length.
pub trait Sequence {
    /// The element type yielded during enumeration.
    type Item;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns `true` when the collection holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Folds every element left to right into an accumulator.
    fn fold_left<B, F>(&self, init: B, function: F) -> B
    where
        F: FnMut(B, &Self::Item) -> B;
}

/// A collection addressed by key.
pub trait Keyed {
    /// The key type.
    type Key;
    /// The value type.
    type Value;

    /// Returns the value stored under `key`, if any.
    fn lookup(&self, key: &Self::Key) -> Option<&Self::Value>;

    /// Returns `true` when a value is stored under `key`.
    fn contains_key(&self, key: &Self::Key) -> bool {
        self.lookup(key).is_some()
    }
}

/// A collection whose elements can be produced in sorted order.
pub trait Sortable: Sequence {
    /// Collects the elements into a sorted `Vec`.
    ///
    /// For inherently ordered collections this is a plain walk; for
    /// unordered ones it sorts a copy.
    fn to_sorted_vec(&self) -> Vec<Self::Item>
    where
        Self::Item: Clone + Ord;
}
