//! Error types for the collection engines.
//!
//! All failures are synchronous and surfaced to the immediate caller.
//! Validation happens before any node is replaced, so a failed operation
//! never leaves a collection partially mutated.

use std::fmt;

/// Represents an index or count argument outside its valid bounds.
///
/// # Examples
///
/// ```rust
/// use permafrost::IndexOutOfRange;
///
/// let error = IndexOutOfRange { index: 5, length: 3 };
/// assert_eq!(format!("{}", error), "index 5 out of range for length 3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfRange {
    /// The offending index.
    pub index: usize,
    /// The length of the collection at the time of the call.
    pub length: usize,
}

impl fmt::Display for IndexOutOfRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "index {} out of range for length {}",
            self.index, self.length
        )
    }
}

impl std::error::Error for IndexOutOfRange {}

/// Represents errors raised by keyed collections.
///
/// The offending key is captured in rendered form so the error stays
/// `'static` and does not constrain the collection's key type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// An insert required uniqueness but the key was already present
    /// (with a different value, for the value-sensitive policy).
    DuplicateKey {
        /// Debug rendering of the duplicated key.
        key: String,
    },
    /// A strict lookup did not find the key.
    KeyNotFound {
        /// Debug rendering of the missing key.
        key: String,
    },
}

impl MapError {
    /// Builds a `DuplicateKey` error from any debuggable key.
    pub fn duplicate_key<K: fmt::Debug>(key: &K) -> Self {
        Self::DuplicateKey {
            key: format!("{key:?}"),
        }
    }

    /// Builds a `KeyNotFound` error from any debuggable key.
    pub fn key_not_found<K: fmt::Debug>(key: &K) -> Self {
        Self::KeyNotFound {
            key: format!("{key:?}"),
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey { key } => {
                write!(formatter, "key {key} is already present")
            }
            Self::KeyNotFound { key } => write!(formatter, "key {key} not found"),
        }
    }
}

impl std::error::Error for MapError {}

/// Represents errors raised by [`TransientArray`](crate::TransientArray).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayError {
    /// `move_to_immutable` was called while the builder still carried
    /// slack capacity. Call `trim_excess` or set the capacity first.
    CapacityMismatch {
        /// Current builder capacity.
        capacity: usize,
        /// Current builder element count.
        count: usize,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityMismatch { capacity, count } => write!(
                formatter,
                "cannot move to immutable: capacity {capacity} != count {count} \
                 (trim_excess first)"
            ),
        }
    }
}

impl std::error::Error for ArrayError {}

/// Represents misuse of a pooled enumeration buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The buffer was accessed after being returned to the pool, or by a
    /// handle that no longer owns it.
    UsedAfterDispose {
        /// The ticket that originally checked the buffer out.
        ticket: u64,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsedAfterDispose { ticket } => write!(
                formatter,
                "pooled traversal buffer (ticket {ticket}) used after disposal"
            ),
        }
    }
}

impl std::error::Error for PoolError {}

/// Represents errors raised by transient (builder) collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// The builder was mutated while an enumeration over it was in
    /// progress. The enumeration is not resumable.
    ConcurrentModification {
        /// Version captured when the enumerator was created.
        expected: u64,
        /// Version observed during the step.
        actual: u64,
    },
}

impl fmt::Display for TransientError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConcurrentModification { expected, actual } => write!(
                formatter,
                "builder was modified during enumeration (version {expected} -> {actual})"
            ),
        }
    }
}

impl std::error::Error for TransientError {}

/// Represents errors raised by [`CollectionCell`](crate::CollectionCell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellError {
    /// The bounded optimistic update loop lost the race on every attempt.
    RetriesExhausted {
        /// How many attempts were made.
        attempts: usize,
    },
}

impl fmt::Display for CellError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted { attempts } => write!(
                formatter,
                "optimistic update lost the race {attempts} times and gave up"
            ),
        }
    }
}

impl std::error::Error for CellError {}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_index_out_of_range_display() {
        let error = IndexOutOfRange {
            index: 7,
            length: 4,
        };
        assert_eq!(format!("{error}"), "index 7 out of range for length 4");
    }

    #[rstest]
    fn test_map_error_carries_rendered_key() {
        let error = MapError::duplicate_key(&"alpha");
        assert_eq!(
            error,
            MapError::DuplicateKey {
                key: "\"alpha\"".to_string()
            }
        );
        assert_eq!(format!("{error}"), "key \"alpha\" is already present");
    }

    #[rstest]
    fn test_capacity_mismatch_display_mentions_trim() {
        let error = ArrayError::CapacityMismatch {
            capacity: 8,
            count: 5,
        };
        assert!(format!("{error}").contains("trim_excess"));
    }

    #[rstest]
    fn test_pool_error_mentions_ticket() {
        let error = PoolError::UsedAfterDispose { ticket: 99 };
        assert!(format!("{error}").contains("99"));
    }
}
