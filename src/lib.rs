//! # permafrost
//!
//! Persistent (immutable) collections for Rust with structural sharing.
//!
//! ## Overview
//!
//! Every mutating operation on a permafrost collection returns a *new*
//! collection value without modifying the original. Old and new versions
//! share all unchanged substructure, so a "mutation" costs O(log n)
//! (O(1) amortized for [`PersistentStack`] and [`PersistentQueue`])
//! instead of a full copy. It includes:
//!
//! - [`PersistentList`]: indexed list backed by a counted AVL tree
//! - [`PersistentHashMap`] / [`PersistentHashSet`]: hash trie with
//!   collision buckets
//! - [`PersistentSortedMap`] / [`PersistentSortedSet`]: ordered AVL
//!   collections
//! - [`PersistentStack`] / [`PersistentQueue`]: linked persistent
//!   stack and two-stack queue
//! - [`ValueArray`]: exact-size immutable array wrapper
//! - `Transient*` builders: mutable staging collections with an
//!   in-place fast path for exclusively owned nodes
//! - [`CollectionCell`]: optimistic compare-and-swap updates over a
//!   shared collection value
//!
//! ## Concurrency
//!
//! A frozen collection value is safe to read from any number of threads
//! without locking (enable the `arc` feature for `Send + Sync` values).
//! Builders are *not* thread-safe; sharing a builder across threads is
//! the caller's responsibility to avoid.
//!
//! ## Feature Flags
//!
//! - `arc`: use `Arc` instead of `Rc` for structural sharing
//! - `serde`: Serialize/Deserialize for all persistent collections
//! - `fxhash` / `ahash`: alternative hashing backends for the hash trie
//!
//! ## Example
//!
//! ```rust
//! use permafrost::PersistentList;
//!
//! let list = PersistentList::new().push_back(1).push_back(2).push_back(3);
//! let updated = list.update(1, 20).unwrap();
//!
//! assert_eq!(list.get(1), Some(&2));     // Original unchanged
//! assert_eq!(updated.get(1), Some(&20)); // New version
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use permafrost::prelude::*;
/// ```
pub mod prelude {
    pub use crate::array::{TransientArray, ValueArray};
    pub use crate::cell::CollectionCell;
    pub use crate::error::*;
    pub use crate::hash_map::{PersistentHashMap, TransientHashMap};
    pub use crate::hash_set::{PersistentHashSet, TransientHashSet};
    pub use crate::list::{PersistentList, TransientList};
    pub use crate::queue::PersistentQueue;
    pub use crate::sorted_map::{PersistentSortedMap, TransientSortedMap};
    pub use crate::sorted_set::{PersistentSortedSet, TransientSortedSet};
    pub use crate::stack::PersistentStack;
    pub use crate::traits::{Keyed, Sequence, Sortable};
}

pub mod array;
pub mod cell;
pub mod error;
pub mod hash_map;
pub mod hash_set;
pub mod list;
pub mod queue;
pub mod sorted_map;
pub mod sorted_set;
pub mod stack;
pub mod traits;

mod avl;
mod pool;
mod shared;
mod trie;

pub use array::{TransientArray, ValueArray};
pub use cell::CollectionCell;
pub use error::{ArrayError, CellError, IndexOutOfRange, MapError, PoolError, TransientError};
pub use hash_map::{PersistentHashMap, TransientHashMap};
pub use hash_set::{PersistentHashSet, TransientHashSet};
pub use list::{PersistentList, TransientList};
pub use queue::PersistentQueue;
pub use sorted_map::{PersistentSortedMap, TransientSortedMap};
pub use sorted_set::{PersistentSortedSet, TransientSortedSet};
pub use stack::PersistentStack;
pub use traits::{Keyed, Sequence, Sortable};
