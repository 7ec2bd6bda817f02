//! Immutable value array and its exact-capacity builder.
//!
//! [`ValueArray`] wraps a shared, contiguous, never-mutated buffer, so
//! cloning is O(1) and reads are plain slice indexing. Every "mutation"
//! copies the whole buffer into an exact-size allocation, the right
//! trade when arrays are built once and read many times.
//!
//! A `ValueArray` distinguishes the *default* state (no buffer at all,
//! what you get from `ValueArray::default()`) from an allocated empty
//! array. Both report a length of zero; [`ValueArray::is_default`]
//! tells them apart.
//!
//! [`TransientArray`] accumulates elements with doubling growth and can
//! hand its buffer over without copying once capacity exactly matches
//! the count.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::error::{ArrayError, IndexOutOfRange};
use crate::shared::ReferenceCounter;
use crate::traits::{Sequence, Sortable};

// =============================================================================
// ValueArray Definition
// =============================================================================

/// An immutable array with O(1) clone and O(N) update.
///
/// # Time Complexity
///
/// | Operation  | Complexity |
/// |------------|------------|
/// | `get`      | O(1)       |
/// | `len`      | O(1)       |
/// | `clone`    | O(1)       |
/// | `push`     | O(N)       |
/// | `set_item` | O(N)       |
///
/// # Examples
///
/// ```rust
/// use permafrost::ValueArray;
///
/// let array = ValueArray::from_slice(&[1, 2, 3]);
/// assert_eq!(array.get(1), Some(&2));
///
/// let pushed = array.push(4);
/// assert_eq!(array.len(), 3);  // Original unchanged
/// assert_eq!(pushed.len(), 4);
/// ```
#[derive(Clone)]
pub struct ValueArray<T> {
    items: Option<ReferenceCounter<[T]>>,
}

impl<T> ValueArray<T> {
    /// Creates an array in the default (bufferless) state.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { items: None }
    }

    /// Creates an allocated empty array.
    ///
    /// Each call allocates a fresh zero-length backing slice (a shared
    /// per-type singleton would need a generic static, which Rust does
    /// not have); empty arrays compare equal regardless of which
    /// allocation backs them.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Some(ReferenceCounter::from(Vec::new())),
        }
    }

    /// Returns `true` when the array was never initialized with a
    /// buffer. A default array behaves like an empty one for reads.
    #[inline]
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.items.is_none()
    }

    /// Returns the number of elements (zero in the default state).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if the array holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Returns the contents as a slice (empty in the default state).
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        self.items.as_deref().unwrap_or(&[])
    }

    /// Returns a reference to the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns an iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    fn check_index(&self, index: usize, limit: usize) -> Result<(), IndexOutOfRange> {
        if index < limit {
            Ok(())
        } else {
            Err(IndexOutOfRange {
                index,
                length: self.len(),
            })
        }
    }
}

impl<T: Clone> ValueArray<T> {
    /// Copies a slice into a new array. Zero items produce the
    /// canonical allocated-empty value.
    #[must_use]
    pub fn from_slice(items: &[T]) -> Self {
        Self {
            items: Some(ReferenceCounter::from(items.to_vec())),
        }
    }

    /// Creates an array containing a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::from_slice(std::slice::from_ref(&element))
    }

    /// Returns a new array with `element` appended.
    #[must_use]
    pub fn push(&self, element: T) -> Self {
        let source = self.as_slice();
        let mut buffer = Vec::with_capacity(source.len() + 1);
        buffer.extend_from_slice(source);
        buffer.push(element);
        Self {
            items: Some(ReferenceCounter::from(buffer)),
        }
    }

    /// Returns a new array with `element` inserted at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index > len`.
    pub fn insert(&self, index: usize, element: T) -> Result<Self, IndexOutOfRange> {
        self.check_index(index, self.len() + 1)?;
        let source = self.as_slice();
        let mut buffer = Vec::with_capacity(source.len() + 1);
        buffer.extend_from_slice(&source[..index]);
        buffer.push(element);
        buffer.extend_from_slice(&source[index..]);
        Ok(Self {
            items: Some(ReferenceCounter::from(buffer)),
        })
    }

    /// Returns a new array without the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len`.
    pub fn remove_at(&self, index: usize) -> Result<Self, IndexOutOfRange> {
        self.check_index(index, self.len())?;
        let source = self.as_slice();
        let mut buffer = Vec::with_capacity(source.len() - 1);
        buffer.extend_from_slice(&source[..index]);
        buffer.extend_from_slice(&source[index + 1..]);
        Ok(Self {
            items: Some(ReferenceCounter::from(buffer)),
        })
    }

    /// Returns a new array with the element at `index` replaced.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len`.
    pub fn set_item(&self, index: usize, element: T) -> Result<Self, IndexOutOfRange> {
        self.check_index(index, self.len())?;
        let mut buffer = self.as_slice().to_vec();
        buffer[index] = element;
        Ok(Self {
            items: Some(ReferenceCounter::from(buffer)),
        })
    }

    /// Returns a new array with the contents of both, `self` first.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let left = self.as_slice();
        let right = other.as_slice();
        let mut buffer = Vec::with_capacity(left.len() + right.len());
        buffer.extend_from_slice(left);
        buffer.extend_from_slice(right);
        Self {
            items: Some(ReferenceCounter::from(buffer)),
        }
    }

    /// Returns a new array with the elements in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut buffer = self.as_slice().to_vec();
        buffer.reverse();
        Self {
            items: Some(ReferenceCounter::from(buffer)),
        }
    }

    /// Returns a new array sorted by natural order.
    #[must_use]
    pub fn sorted(&self) -> Self
    where
        T: Ord,
    {
        let mut buffer = self.as_slice().to_vec();
        buffer.sort();
        Self {
            items: Some(ReferenceCounter::from(buffer)),
        }
    }

    /// Returns a new array sorted by the given comparison.
    #[must_use]
    pub fn sorted_by<F>(&self, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        let mut buffer = self.as_slice().to_vec();
        buffer.sort_by(compare);
        Self {
            items: Some(ReferenceCounter::from(buffer)),
        }
    }

    /// Converts this array into a [`TransientArray`] builder seeded
    /// with a copy of the contents.
    #[must_use]
    pub fn to_transient(&self) -> TransientArray<T> {
        TransientArray {
            items: self.as_slice().to_vec(),
        }
    }
}

// =============================================================================
// TransientArray Definition
// =============================================================================

/// A growable staging buffer for building a [`ValueArray`].
///
/// Growth doubles the capacity (or jumps straight to the requested
/// size, whichever is larger). The builder can hand its buffer to a
/// [`ValueArray`] without copying, but only when capacity and count
/// agree exactly; call [`TransientArray::trim_excess`] first.
///
/// # Examples
///
/// ```rust
/// use permafrost::TransientArray;
///
/// let mut builder = TransientArray::new();
/// builder.push(1);
/// builder.push(2);
/// builder.trim_excess();
/// let array = builder.move_to_immutable().unwrap();
/// assert_eq!(array.as_slice(), &[1, 2]);
/// ```
#[derive(Clone)]
pub struct TransientArray<T> {
    items: Vec<T>,
}

impl<T> TransientArray<T> {
    /// Creates an empty builder with no allocation.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates an empty builder with room for exactly `capacity`
    /// elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the builder holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the currently allocated capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Returns the contents as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns a reference to the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Grows the buffer to hold at least `required` elements, doubling
    /// the current capacity when that is larger.
    fn ensure_capacity(&mut self, required: usize) {
        let capacity = self.items.capacity();
        if required > capacity {
            let target = std::cmp::max(capacity * 2, required);
            self.items.reserve_exact(target - self.items.len());
        }
    }

    /// Appends an element.
    pub fn push(&mut self, element: T) {
        self.ensure_capacity(self.items.len() + 1);
        self.items.push(element);
    }

    /// Inserts an element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index > len`.
    pub fn insert(&mut self, index: usize, element: T) -> Result<(), IndexOutOfRange> {
        if index > self.items.len() {
            return Err(IndexOutOfRange {
                index,
                length: self.items.len(),
            });
        }
        self.ensure_capacity(self.items.len() + 1);
        self.items.insert(index, element);
        Ok(())
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, IndexOutOfRange> {
        if index >= self.items.len() {
            return Err(IndexOutOfRange {
                index,
                length: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Replaces the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index >= len`.
    pub fn set_item(&mut self, index: usize, element: T) -> Result<(), IndexOutOfRange> {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = element;
                Ok(())
            }
            None => Err(IndexOutOfRange {
                index,
                length: self.items.len(),
            }),
        }
    }

    /// Removes every element, keeping the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Shrinks the allocation to exactly the current count.
    pub fn trim_excess(&mut self) {
        self.items.shrink_to_fit();
    }

    /// Hands the buffer over to a [`ValueArray`] without copying.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::CapacityMismatch`] when spare capacity
    /// remains; [`Self::trim_excess`] discards it.
    pub fn move_to_immutable(self) -> Result<ValueArray<T>, ArrayError> {
        let capacity = self.items.capacity();
        let count = self.items.len();
        if capacity != count {
            return Err(ArrayError::CapacityMismatch { capacity, count });
        }
        Ok(ValueArray {
            items: Some(ReferenceCounter::from(self.items)),
        })
    }
}

impl<T: Clone> TransientArray<T> {
    /// Copies the current contents into a [`ValueArray`], leaving the
    /// builder usable.
    #[must_use]
    pub fn to_value_array(&self) -> ValueArray<T> {
        ValueArray::from_slice(&self.items)
    }
}

impl<T> Default for TransientArray<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for TransientArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.push(element);
        }
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for ValueArray<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for ValueArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let buffer: Vec<T> = iter.into_iter().collect();
        Self {
            items: Some(ReferenceCounter::from(buffer)),
        }
    }
}

impl<'a, T> IntoIterator for &'a ValueArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Element-wise equality; the default and empty states compare equal.
impl<T: PartialEq> PartialEq for ValueArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for ValueArray<T> {}

impl<T: Hash> Hash for ValueArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueArray<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for ValueArray<T> {
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

impl<T> Sequence for ValueArray<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn fold_left<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.iter()
            .fold(init, |accumulator, element| function(accumulator, element))
    }
}

impl<T> Sortable for ValueArray<T> {
    fn to_sorted_vec(&self) -> Vec<T>
    where
        T: Clone + Ord,
    {
        let mut buffer = self.as_slice().to_vec();
        buffer.sort();
        buffer
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for ValueArray<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_slice().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for ValueArray<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let buffer: Vec<T> = Vec::deserialize(deserializer)?;
        Ok(Self {
            items: Some(ReferenceCounter::from(buffer)),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
