//! Balanced binary tree engine shared by the tree-backed collections.
//!
//! This module provides the AVL node type used (as distinct
//! instantiations) by [`PersistentList`](crate::PersistentList),
//! [`PersistentSortedMap`](crate::PersistentSortedMap),
//! [`PersistentSortedSet`](crate::PersistentSortedSet) and, through the
//! hash trie, by the hashed collections.
//!
//! Nodes are immutable once wrapped in a [`ReferenceCounter`]; every
//! mutating operation rebuilds only the O(log n) nodes on the path from
//! the root to the mutation site and shares everything else by reference.
//! The transient fast path (`*_mut` operations) mutates a node in place
//! only while it is exclusively owned, via `ReferenceCounter::make_mut`.
//!
//! # Invariants
//!
//! After every public operation, for every node:
//!
//! - `height = 1 + max(left.height, right.height)`
//! - `count = 1 + left.count + right.count`
//! - `right.height - left.height` is in `[-1, 1]`
//!
//! Rebalancing uses the standard AVL rule: the rotation (single or
//! double) is chosen purely by the sign of the taller child's own
//! balance factor.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::error::PoolError;
use crate::pool::PooledStack;
use crate::shared::ReferenceCounter;

/// A shared, possibly absent subtree. `None` is the empty-leaf sentinel
/// (height 0, count 0).
pub(crate) type Link<T> = Option<ReferenceCounter<AvlNode<T>>>;

/// Inline traversal-stack capacity. An AVL tree of height 48 holds more
/// than 2^33 elements, so iteration never spills to the heap in practice.
pub(crate) const MAX_EXPECTED_HEIGHT: usize = 48;

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure for the AVL tree.
#[derive(Clone)]
pub(crate) struct AvlNode<T> {
    element: T,
    height: u8,
    count: usize,
    left: Link<T>,
    right: Link<T>,
}

/// Height of a possibly-absent subtree.
#[inline]
pub(crate) fn height<T>(link: &Link<T>) -> u8 {
    link.as_ref().map_or(0, |node| node.height)
}

/// Element count of a possibly-absent subtree.
#[inline]
pub(crate) fn count<T>(link: &Link<T>) -> usize {
    link.as_ref().map_or(0, |node| node.count)
}

impl<T> AvlNode<T> {
    /// Creates a leaf node.
    pub(crate) const fn leaf(element: T) -> Self {
        Self {
            element,
            height: 1,
            count: 1,
            left: None,
            right: None,
        }
    }

    /// Creates a branch node, computing height and count from the children.
    pub(crate) fn branch(element: T, left: Link<T>, right: Link<T>) -> Self {
        let mut node = Self {
            element,
            height: 0,
            count: 0,
            left,
            right,
        };
        node.refresh();
        node
    }

    pub(crate) const fn element(&self) -> &T {
        &self.element
    }

    pub(crate) const fn left(&self) -> &Link<T> {
        &self.left
    }

    pub(crate) const fn right(&self) -> &Link<T> {
        &self.right
    }

    /// Recomputes height and count after a child change.
    fn refresh(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
        self.count = 1 + count(&self.left) + count(&self.right);
    }

    /// `right.height - left.height`.
    fn balance_factor(&self) -> i16 {
        i16::from(height(&self.right)) - i16::from(height(&self.left))
    }
}

impl<T: Clone> AvlNode<T> {
    /// Creates a copy of this node with new children.
    fn with_children(&self, left: Link<T>, right: Link<T>) -> Self {
        Self::branch(self.element.clone(), left, right)
    }

    /// Creates a copy of this node with a new element and the same children.
    /// The shape is untouched, so no rebalancing is required.
    fn with_element(&self, element: T) -> Self {
        Self {
            element,
            height: self.height,
            count: self.count,
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

// =============================================================================
// Rotations and Rebalancing
// =============================================================================

/// Rotates the tree to the left around the given node.
fn rotate_left<T: Clone>(node: AvlNode<T>) -> AvlNode<T> {
    match node.right {
        Some(right) => {
            let new_left = AvlNode::branch(node.element, node.left, right.left.clone());
            AvlNode::branch(
                right.element.clone(),
                Some(ReferenceCounter::new(new_left)),
                right.right.clone(),
            )
        }
        None => node,
    }
}

/// Rotates the tree to the right around the given node.
fn rotate_right<T: Clone>(node: AvlNode<T>) -> AvlNode<T> {
    match node.left {
        Some(left) => {
            let new_right = AvlNode::branch(node.element, left.right.clone(), node.right);
            AvlNode::branch(
                left.element.clone(),
                left.left.clone(),
                Some(ReferenceCounter::new(new_right)),
            )
        }
        None => node,
    }
}

/// Restores the AVL invariant at `node` after a single insert or remove.
///
/// The double-rotation cases are selected by the sign of the taller
/// child's balance factor (the standard AVL tie-break).
fn rebalance<T: Clone>(node: AvlNode<T>) -> AvlNode<T> {
    match node.balance_factor() {
        2 => {
            let right_leans_left = node
                .right
                .as_ref()
                .is_some_and(|right| right.balance_factor() < 0);
            if right_leans_left {
                // Right-Left: rotate the right child right, then this node left
                let right = node
                    .right
                    .as_ref()
                    .map(|right| ReferenceCounter::new(rotate_right((**right).clone())));
                rotate_left(AvlNode::branch(node.element, node.left, right))
            } else {
                // Right-Right
                rotate_left(node)
            }
        }
        -2 => {
            let left_leans_right = node
                .left
                .as_ref()
                .is_some_and(|left| left.balance_factor() > 0);
            if left_leans_right {
                // Left-Right: rotate the left child left, then this node right
                let left = node
                    .left
                    .as_ref()
                    .map(|left| ReferenceCounter::new(rotate_left((**left).clone())));
                rotate_right(AvlNode::branch(node.element, left, node.right))
            } else {
                // Left-Left
                rotate_right(node)
            }
        }
        _ => node,
    }
}

/// Wraps a rebalanced branch in a fresh reference.
fn share<T: Clone>(node: AvlNode<T>) -> Link<T> {
    Some(ReferenceCounter::new(rebalance(node)))
}

/// Rebuilds `node` with new children, rebalancing if needed. Used by the
/// hash trie, whose recursion lives outside this module.
pub(crate) fn with_new_children<T: Clone>(
    node: &AvlNode<T>,
    left: Link<T>,
    right: Link<T>,
) -> Link<T> {
    share(node.with_children(left, right))
}

/// Rebuilds `node` with a replacement element. The shape is untouched,
/// so no rebalancing happens.
pub(crate) fn with_new_element<T: Clone>(node: &AvlNode<T>, element: T) -> Link<T> {
    Some(ReferenceCounter::new(node.with_element(element)))
}

// =============================================================================
// Index-Addressed Operations
// =============================================================================

/// Returns the element at `index`, descending by left-subtree counts.
pub(crate) fn get_at<T>(link: &Link<T>, index: usize) -> Option<&T> {
    let node = link.as_ref()?;
    let left_count = count(&node.left);
    match index.cmp(&left_count) {
        Ordering::Less => get_at(&node.left, index),
        Ordering::Equal => Some(&node.element),
        Ordering::Greater => get_at(&node.right, index - left_count - 1),
    }
}

/// Inserts `element` so that it ends up at `index`.
///
/// Callers validate `index <= count(link)` beforehand.
pub(crate) fn insert_at<T: Clone>(link: &Link<T>, index: usize, element: T) -> Link<T> {
    let Some(node) = link.as_ref() else {
        debug_assert_eq!(index, 0);
        return Some(ReferenceCounter::new(AvlNode::leaf(element)));
    };
    let left_count = count(&node.left);
    let new_node = if index <= left_count {
        let new_left = insert_at(&node.left, index, element);
        node.with_children(new_left, node.right.clone())
    } else {
        let new_right = insert_at(&node.right, index - left_count - 1, element);
        node.with_children(node.left.clone(), new_right)
    };
    share(new_node)
}

/// Removes the element at `index`, returning the new subtree and the
/// removed element. Callers validate `index < count(link)` beforehand.
pub(crate) fn remove_at<T: Clone>(link: &Link<T>, index: usize) -> (Link<T>, T) {
    let node = link
        .as_ref()
        .unwrap_or_else(|| unreachable!("index validated by caller"));
    let left_count = count(&node.left);
    match index.cmp(&left_count) {
        Ordering::Less => {
            let (new_left, removed) = remove_at(&node.left, index);
            (share(node.with_children(new_left, node.right.clone())), removed)
        }
        Ordering::Greater => {
            let (new_right, removed) = remove_at(&node.right, index - left_count - 1);
            (share(node.with_children(node.left.clone(), new_right)), removed)
        }
        Ordering::Equal => {
            let removed = node.element.clone();
            (remove_root(node), removed)
        }
    }
}

/// Removes the root of the given node, merging its children.
fn remove_root<T: Clone>(node: &AvlNode<T>) -> Link<T> {
    match (&node.left, &node.right) {
        (None, None) => None,
        (Some(left), None) => Some(left.clone()),
        (None, Some(right)) => Some(right.clone()),
        (Some(_), Some(right)) => {
            // Replace with the in-order successor (leftmost of the right subtree)
            let (new_right, successor) = remove_leftmost(right);
            share(AvlNode::branch(successor, node.left.clone(), new_right))
        }
    }
}

/// Removes and returns the leftmost element of a non-empty subtree.
fn remove_leftmost<T: Clone>(node: &ReferenceCounter<AvlNode<T>>) -> (Link<T>, T) {
    match &node.left {
        None => (node.right.clone(), node.element.clone()),
        Some(left) => {
            let (new_left, leftmost) = remove_leftmost(left);
            (
                share(node.with_children(new_left, node.right.clone())),
                leftmost,
            )
        }
    }
}

/// Replaces the element at `index` without changing the tree shape.
/// Callers validate `index < count(link)` beforehand.
pub(crate) fn replace_at<T: Clone>(link: &Link<T>, index: usize, element: T) -> Link<T> {
    let node = link
        .as_ref()
        .unwrap_or_else(|| unreachable!("index validated by caller"));
    let left_count = count(&node.left);
    let new_node = match index.cmp(&left_count) {
        Ordering::Less => {
            node.with_children(replace_at(&node.left, index, element), node.right.clone())
        }
        Ordering::Equal => node.with_element(element),
        Ordering::Greater => node.with_children(
            node.left.clone(),
            replace_at(&node.right, index - left_count - 1, element),
        ),
    };
    Some(ReferenceCounter::new(new_node))
}

// =============================================================================
// Comparator-Addressed Operations
// =============================================================================

/// The result of a comparator-addressed insertion.
pub(crate) enum Insertion<T> {
    /// An equal element was present and the merge declined to replace it.
    /// The caller keeps the original root (reference identity preserved).
    Unchanged,
    /// A new element was added; the subtree count grew by one.
    Added(Link<T>),
    /// An equal element was replaced; the subtree count is unchanged.
    Updated(Link<T>),
}

/// Finds the element for which `locate` answers `Equal`.
///
/// `locate` answers the ordering of the *target* relative to the probed
/// element: `Less` descends left, `Greater` descends right.
pub(crate) fn find_by<'a, T, F>(link: &'a Link<T>, locate: &F) -> Option<&'a T>
where
    F: Fn(&T) -> Ordering,
{
    let node = link.as_ref()?;
    match locate(&node.element) {
        Ordering::Less => find_by(&node.left, locate),
        Ordering::Equal => Some(&node.element),
        Ordering::Greater => find_by(&node.right, locate),
    }
}

/// Inserts `element` at its ordered position.
///
/// When an element compares equal, `merge(existing, new)` decides the
/// outcome: `Some(replacement)` replaces it, `None` keeps the tree
/// untouched so the caller can return the input root unchanged.
pub(crate) fn insert_by<T, C, M>(
    link: &Link<T>,
    element: T,
    compare: &C,
    merge: &M,
) -> Insertion<T>
where
    T: Clone,
    C: Fn(&T, &T) -> Ordering,
    M: Fn(&T, T) -> Option<T>,
{
    let Some(node) = link.as_ref() else {
        return Insertion::Added(Some(ReferenceCounter::new(AvlNode::leaf(element))));
    };
    match compare(&element, &node.element) {
        Ordering::Less => match insert_by(&node.left, element, compare, merge) {
            Insertion::Unchanged => Insertion::Unchanged,
            Insertion::Added(new_left) => {
                Insertion::Added(share(node.with_children(new_left, node.right.clone())))
            }
            Insertion::Updated(new_left) => Insertion::Updated(Some(ReferenceCounter::new(
                node.with_children(new_left, node.right.clone()),
            ))),
        },
        Ordering::Greater => match insert_by(&node.right, element, compare, merge) {
            Insertion::Unchanged => Insertion::Unchanged,
            Insertion::Added(new_right) => {
                Insertion::Added(share(node.with_children(node.left.clone(), new_right)))
            }
            Insertion::Updated(new_right) => Insertion::Updated(Some(ReferenceCounter::new(
                node.with_children(node.left.clone(), new_right),
            ))),
        },
        Ordering::Equal => merge(&node.element, element).map_or(Insertion::Unchanged, |merged| {
            Insertion::Updated(Some(ReferenceCounter::new(node.with_element(merged))))
        }),
    }
}

/// Removes the element for which `locate` answers `Equal`.
///
/// Returns `None` when no element matched (the caller keeps the original
/// root), otherwise the new subtree and the removed element.
pub(crate) fn remove_by<T, F>(link: &Link<T>, locate: &F) -> Option<(Link<T>, T)>
where
    T: Clone,
    F: Fn(&T) -> Ordering,
{
    let node = link.as_ref()?;
    match locate(&node.element) {
        Ordering::Less => {
            let (new_left, removed) = remove_by(&node.left, locate)?;
            Some((
                share(node.with_children(new_left, node.right.clone())),
                removed,
            ))
        }
        Ordering::Greater => {
            let (new_right, removed) = remove_by(&node.right, locate)?;
            Some((
                share(node.with_children(node.left.clone(), new_right)),
                removed,
            ))
        }
        Ordering::Equal => Some((remove_root(node), node.element.clone())),
    }
}

/// Returns the leftmost (minimum) element.
pub(crate) fn leftmost<T>(link: &Link<T>) -> Option<&T> {
    let node = link.as_ref()?;
    node.left
        .as_ref()
        .map_or(Some(&node.element), |_| leftmost(&node.left))
}

/// Returns the rightmost (maximum) element.
pub(crate) fn rightmost<T>(link: &Link<T>) -> Option<&T> {
    let node = link.as_ref()?;
    node.right
        .as_ref()
        .map_or(Some(&node.element), |_| rightmost(&node.right))
}

// =============================================================================
// Bulk Construction
// =============================================================================

/// Builds a minimal-height tree from already-sorted elements in O(n) by
/// recursive midpoint selection, bypassing incremental insertion.
///
/// The nodes are mutated freely while being built and frozen the moment
/// they are wrapped for sharing; nothing observes them before that.
pub(crate) fn from_sorted_slice<T: Clone>(items: &[T]) -> Link<T> {
    if items.is_empty() {
        return None;
    }
    let middle = items.len() / 2;
    Some(ReferenceCounter::new(AvlNode::branch(
        items[middle].clone(),
        from_sorted_slice(&items[..middle]),
        from_sorted_slice(&items[middle + 1..]),
    )))
}

// =============================================================================
// Transient (exclusively owned) Fast Path
// =============================================================================

/// Recomputes height/count and restores balance in place.
///
/// `make_mut` only copies a node that is still shared with a frozen
/// collection; a node owned solely by the builder is mutated directly.
fn rebalance_mut<T: Clone>(link: &mut Link<T>) {
    let Some(node_ref) = link.as_mut() else {
        return;
    };
    let factor = {
        let node = ReferenceCounter::make_mut(node_ref);
        node.refresh();
        node.balance_factor()
    };
    if factor > 1 {
        let node = ReferenceCounter::make_mut(node_ref);
        let rotate_child_first = node
            .right
            .as_ref()
            .is_some_and(|right| right.balance_factor() < 0);
        if rotate_child_first {
            rotate_right_mut(&mut node.right);
        }
        rotate_left_mut(link);
    } else if factor < -1 {
        let node = ReferenceCounter::make_mut(node_ref);
        let rotate_child_first = node
            .left
            .as_ref()
            .is_some_and(|left| left.balance_factor() > 0);
        if rotate_child_first {
            rotate_left_mut(&mut node.left);
        }
        rotate_right_mut(link);
    }
}

/// In-place left rotation of a non-empty link with a non-empty right child.
fn rotate_left_mut<T: Clone>(link: &mut Link<T>) {
    let Some(mut node_ref) = link.take() else {
        return;
    };
    let pivot = {
        let node = ReferenceCounter::make_mut(&mut node_ref);
        node.right.take()
    };
    let Some(mut pivot_ref) = pivot else {
        *link = Some(node_ref);
        return;
    };
    {
        let pivot_node = ReferenceCounter::make_mut(&mut pivot_ref);
        let orphan = pivot_node.left.take();
        let node = ReferenceCounter::make_mut(&mut node_ref);
        node.right = orphan;
        node.refresh();
        pivot_node.left = Some(node_ref);
        pivot_node.refresh();
    }
    *link = Some(pivot_ref);
}

/// In-place right rotation of a non-empty link with a non-empty left child.
fn rotate_right_mut<T: Clone>(link: &mut Link<T>) {
    let Some(mut node_ref) = link.take() else {
        return;
    };
    let pivot = {
        let node = ReferenceCounter::make_mut(&mut node_ref);
        node.left.take()
    };
    let Some(mut pivot_ref) = pivot else {
        *link = Some(node_ref);
        return;
    };
    {
        let pivot_node = ReferenceCounter::make_mut(&mut pivot_ref);
        let orphan = pivot_node.right.take();
        let node = ReferenceCounter::make_mut(&mut node_ref);
        node.left = orphan;
        node.refresh();
        pivot_node.right = Some(node_ref);
        pivot_node.refresh();
    }
    *link = Some(pivot_ref);
}

/// Transient insert-at. Callers validate `index <= count(link)`.
pub(crate) fn insert_at_mut<T: Clone>(link: &mut Link<T>, index: usize, element: T) {
    match link {
        None => {
            debug_assert_eq!(index, 0);
            *link = Some(ReferenceCounter::new(AvlNode::leaf(element)));
        }
        Some(node_ref) => {
            {
                let node = ReferenceCounter::make_mut(node_ref);
                let left_count = count(&node.left);
                if index <= left_count {
                    insert_at_mut(&mut node.left, index, element);
                } else {
                    insert_at_mut(&mut node.right, index - left_count - 1, element);
                }
            }
            rebalance_mut(link);
        }
    }
}

/// Transient remove-at. Callers validate `index < count(link)`.
pub(crate) fn remove_at_mut<T: Clone>(link: &mut Link<T>, index: usize) -> T {
    let mut node_ref = link
        .take()
        .unwrap_or_else(|| unreachable!("index validated by caller"));
    let node = ReferenceCounter::make_mut(&mut node_ref);
    let left_count = count(&node.left);
    let removed = match index.cmp(&left_count) {
        Ordering::Less => remove_at_mut(&mut node.left, index),
        Ordering::Greater => remove_at_mut(&mut node.right, index - left_count - 1),
        Ordering::Equal => {
            let removed = node.element.clone();
            *link = remove_root(node);
            return removed;
        }
    };
    *link = Some(node_ref);
    rebalance_mut(link);
    removed
}

/// Transient replace-at. Callers validate `index < count(link)`.
pub(crate) fn replace_at_mut<T: Clone>(link: &mut Link<T>, index: usize, element: T) {
    let node_ref = link
        .as_mut()
        .unwrap_or_else(|| unreachable!("index validated by caller"));
    let node = ReferenceCounter::make_mut(node_ref);
    let left_count = count(&node.left);
    match index.cmp(&left_count) {
        Ordering::Less => replace_at_mut(&mut node.left, index, element),
        Ordering::Equal => node.element = element,
        Ordering::Greater => replace_at_mut(&mut node.right, index - left_count - 1, element),
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// In-order traversal over borrowed nodes.
///
/// Parent-less trees need an explicit stack of "nodes whose right subtree
/// is still unvisited"; the stack lives inline (no heap allocation) for
/// any realistic tree height.
pub(crate) struct InOrderIter<'a, T> {
    stack: SmallVec<[&'a AvlNode<T>; MAX_EXPECTED_HEIGHT]>,
    remaining: usize,
}

impl<'a, T> InOrderIter<'a, T> {
    pub(crate) fn new(root: &'a Link<T>) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            remaining: count(root),
        };
        iterator.push_leftmost(root);
        iterator
    }

    fn push_leftmost(&mut self, mut link: &'a Link<T>) {
        while let Some(node) = link.as_deref() {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, T> Iterator for InOrderIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_leftmost(&node.right);
        self.remaining -= 1;
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for InOrderIter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

/// Reverse in-order traversal over borrowed nodes.
pub(crate) struct ReverseOrderIter<'a, T> {
    stack: SmallVec<[&'a AvlNode<T>; MAX_EXPECTED_HEIGHT]>,
    remaining: usize,
}

impl<'a, T> ReverseOrderIter<'a, T> {
    pub(crate) fn new(root: &'a Link<T>) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            remaining: count(root),
        };
        iterator.push_rightmost(root);
        iterator
    }

    fn push_rightmost(&mut self, mut link: &'a Link<T>) {
        while let Some(node) = link.as_deref() {
            self.stack.push(node);
            link = &node.right;
        }
    }
}

impl<'a, T> Iterator for ReverseOrderIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_rightmost(&node.left);
        self.remaining -= 1;
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for ReverseOrderIter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

/// Owning in-order traversal backed by a pooled stack buffer.
///
/// The buffer is checked out of the thread-local enumerator pool under a
/// fresh ticket and returned (cleared) when the iterator is dropped.
pub(crate) struct OwnedInOrderIter<T: 'static> {
    stack: PooledStack<ReferenceCounter<AvlNode<T>>>,
    remaining: usize,
}

impl<T: Clone + 'static> OwnedInOrderIter<T> {
    pub(crate) fn new(root: Link<T>) -> Self {
        let mut iterator = Self {
            stack: PooledStack::acquire(),
            remaining: count(&root),
        };
        iterator.push_leftmost(root);
        iterator
    }

    fn push_leftmost(&mut self, mut link: Link<T>) {
        while let Some(node) = link {
            let next = node.left.clone();
            self.guarded(|stack| stack.push(node));
            link = next;
        }
    }

    /// Runs a pool operation; misuse of the pooled buffer is a programmer
    /// error and is signaled immediately rather than silently ignored.
    fn guarded<R>(
        &mut self,
        operation: impl FnOnce(&mut PooledStack<ReferenceCounter<AvlNode<T>>>) -> Result<R, PoolError>,
    ) -> R {
        match operation(&mut self.stack) {
            Ok(result) => result,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T: Clone + 'static> Iterator for OwnedInOrderIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.guarded(|stack| stack.pop())?;
        self.push_leftmost(node.right.clone());
        self.remaining -= 1;
        Some(node.element.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Clone + 'static> ExactSizeIterator for OwnedInOrderIter<T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    /// Recursively checks the height, count and balance invariants.
    pub(crate) fn assert_invariants<T>(link: &Link<T>) -> u8 {
        let Some(node) = link.as_ref() else {
            return 0;
        };
        let left_height = assert_invariants(&node.left);
        let right_height = assert_invariants(&node.right);
        assert_eq!(node.height, 1 + left_height.max(right_height));
        assert_eq!(node.count, 1 + count(&node.left) + count(&node.right));
        let factor = i16::from(right_height) - i16::from(left_height);
        assert!(
            (-1..=1).contains(&factor),
            "balance factor {factor} violates the AVL invariant"
        );
        node.height
    }

    fn collect(link: &Link<i32>) -> Vec<i32> {
        InOrderIter::new(link).copied().collect()
    }

    #[rstest]
    fn test_insert_at_keeps_order_and_balance() {
        let mut root: Link<i32> = None;
        for value in 0..100 {
            root = insert_at(&root, count(&root), value);
        }
        assert_invariants(&root);
        assert_eq!(collect(&root), (0..100).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_insert_at_front_rebalances() {
        let mut root: Link<i32> = None;
        for value in (0..100).rev() {
            root = insert_at(&root, 0, value);
        }
        assert_invariants(&root);
        assert!(height(&root) <= 9); // 1.44 * log2(100) + margin
        assert_eq!(collect(&root), (0..100).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_remove_at_returns_removed_element() {
        let mut root: Link<i32> = None;
        for value in 0..10 {
            root = insert_at(&root, count(&root), value);
        }
        let (after, removed) = remove_at(&root, 4);
        assert_eq!(removed, 4);
        assert_invariants(&after);
        assert_eq!(collect(&after), vec![0, 1, 2, 3, 5, 6, 7, 8, 9]);
        // original tree untouched
        assert_eq!(collect(&root), (0..10).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_structural_sharing_on_replace() {
        let mut root: Link<i32> = None;
        for value in 0..64 {
            root = insert_at(&root, count(&root), value);
        }
        let replaced = replace_at(&root, 63, 999);
        // The untouched left spine is shared by reference
        let original_left = root.as_ref().and_then(|node| node.left.clone());
        let replaced_left = replaced.as_ref().and_then(|node| node.left.clone());
        match (original_left, replaced_left) {
            (Some(a), Some(b)) => assert!(ReferenceCounter::ptr_eq(&a, &b)),
            _ => panic!("expected shared left subtrees"),
        }
    }

    #[rstest]
    fn test_from_sorted_slice_is_minimal_height() {
        let items: Vec<i32> = (0..1000).collect();
        let root = from_sorted_slice(&items);
        assert_invariants(&root);
        assert!(height(&root) <= 10); // ceil(log2(1001))
        assert_eq!(collect(&root), items);
    }

    #[rstest]
    fn test_insert_by_unchanged_keeps_merge_semantics() {
        let compare = |a: &i32, b: &i32| a.cmp(b);
        let keep = |_existing: &i32, _new: i32| None;
        let mut root: Link<i32> = None;
        for value in [5, 3, 8] {
            match insert_by(&root, value, &compare, &keep) {
                Insertion::Added(new_root) => root = new_root,
                _ => panic!("fresh values must be added"),
            }
        }
        assert!(matches!(
            insert_by(&root, 5, &compare, &keep),
            Insertion::Unchanged
        ));
    }

    #[rstest]
    fn test_transient_mutations_preserve_invariants() {
        let mut root: Link<i32> = None;
        for value in 0..200 {
            let length = count(&root);
            insert_at_mut(&mut root, length, value);
        }
        assert_invariants(&root);
        for _ in 0..50 {
            remove_at_mut(&mut root, 0);
        }
        assert_invariants(&root);
        replace_at_mut(&mut root, 0, -1);
        assert_eq!(get_at(&root, 0), Some(&-1));
        assert_eq!(collect(&root)[1..], (51..200).collect::<Vec<_>>()[..]);
    }

    #[rstest]
    fn test_transient_mutation_never_touches_shared_nodes() {
        let mut root: Link<i32> = None;
        for value in 0..32 {
            let length = count(&root);
            insert_at_mut(&mut root, length, value);
        }
        let frozen = root.clone();
        for index in 0..32 {
            replace_at_mut(&mut root, index, -1);
        }
        assert_eq!(collect(&frozen), (0..32).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn prop_avl_invariant_under_random_edits(
            operations in prop::collection::vec((any::<bool>(), any::<u16>(), any::<i32>()), 0..300)
        ) {
            let mut root: Link<i32> = None;
            for (is_insert, position, value) in operations {
                let length = count(&root);
                if is_insert || length == 0 {
                    let index = (position as usize) % (length + 1);
                    root = insert_at(&root, index, value);
                } else {
                    let index = (position as usize) % length;
                    root = remove_at(&root, index).0;
                }
                assert_invariants(&root);
            }
        }

        #[test]
        fn prop_in_order_matches_reverse_mirrored(values in prop::collection::vec(any::<i32>(), 0..200)) {
            let mut root: Link<i32> = None;
            for value in &values {
                root = insert_at(&root, count(&root), *value);
            }
            let forward: Vec<i32> = InOrderIter::new(&root).copied().collect();
            let mut backward: Vec<i32> = ReverseOrderIter::new(&root).copied().collect();
            backward.reverse();
            prop_assert_eq!(forward, backward);
        }
    }
}
