use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use tracing::{debug, trace};

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{CursorFault, Error, Result};
use crate::raw::{Handle, InsertResult, RawTree};

mod capacity;
mod cursor;
mod shape;

pub use cursor::Cursor;
pub use shape::Shape;

/// What [`BalancedTree::add`] does with an element equal to one already stored.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum DuplicatePolicy {
    /// Keep the stored element and fail with [`Error::DuplicateKey`].
    #[default]
    Reject,
    /// Overwrite the stored element in place. The tree's shape does not change, so
    /// outstanding cursors stay valid.
    Replace,
}

/// An AVL-balanced binary search tree.
///
/// Elements are kept sorted under the tree's [`Comparator`] (by default their [`Ord`]
/// order) and every node's subtrees differ in height by at most one, so insertion,
/// removal and lookup are all O(log n).
///
/// Nodes live in a single arena and link to their children and parent by index, which
/// gives O(1) amortized in-order stepping in both directions without any `unsafe`.
///
/// Besides the borrowing [`Iter`], the tree hands out detached [`Cursor`]s
/// ([`begin`](Self::begin), [`end`](Self::end), [`rbegin`](Self::rbegin),
/// [`rend`](Self::rend), [`root`](Self::root), [`search`](Self::search)). A cursor does
/// not borrow the tree; instead it remembers which tree made it and that tree's
/// structural version, and is refused with [`Error::InvalidIterator`] once a node has
/// been added or removed, or when it is handed to any other tree.
///
/// It is a logic error for an element to be modified in such a way that its ordering
/// relative to any other element changes while it is in the tree. The behavior resulting
/// from such a logic error is not specified, but will be encapsulated to the
/// `BalancedTree` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use avlmap::{BalancedTree, Error};
///
/// let mut tree = BalancedTree::new();
/// for i in [5, 10, 15, 20, 25] {
///     tree.add(i)?;
/// }
///
/// assert_eq!(tree.shape().to_string(), "(10,(5,,),(20,(15,,),(25,,)))");
/// assert_eq!(tree.add(15), Err(Error::DuplicateKey));
///
/// assert_eq!(tree.remove(&10), Some(10));
/// assert!(!tree.contains(&10));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [5, 15, 20, 25]);
/// # Ok::<(), avlmap::Error>(())
/// ```
pub struct BalancedTree<T, C = NaturalOrder> {
    raw: RawTree<T>,
    comparator: C,
    policy: DuplicatePolicy,
}

/// An iterator over the elements of a `BalancedTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`BalancedTree`]. See its
/// documentation for more.
///
/// [`iter`]: BalancedTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    tree: &'a RawTree<T>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An owning iterator over the elements of a `BalancedTree`, in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`BalancedTree`]
/// (provided by the [`IntoIterator`] trait). See its documentation for more.
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<T>,
}

impl<T> BalancedTree<T> {
    /// Makes a new, empty `BalancedTree` ordered by [`Ord`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let mut tree = BalancedTree::new();
    /// tree.add(1).unwrap();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T, C> BalancedTree<T, C> {
    /// Makes a new, empty `BalancedTree` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    /// use avlmap::comparator::{NaturalOrder, ReverseOrder};
    ///
    /// let mut tree = BalancedTree::with_comparator(ReverseOrder(NaturalOrder));
    /// tree.extend([1, 2, 3]);
    /// assert_eq!(tree.min(), Some(&3));
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            raw: RawTree::new(),
            comparator,
            policy: DuplicatePolicy::Reject,
        }
    }

    /// Sets what [`add`](Self::add) does with duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::{BalancedTree, DuplicatePolicy};
    /// use avlmap::comparator::FnComparator;
    ///
    /// // Order pairs by their first field only.
    /// let by_first = FnComparator::new(|a: &(u8, char), b: &(u8, char)| a.0.cmp(&b.0));
    /// let mut tree = BalancedTree::with_comparator(by_first).with_duplicate_policy(DuplicatePolicy::Replace);
    /// tree.add((1, 'a')).unwrap();
    /// tree.add((1, 'b')).unwrap();
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree.min(), Some(&(1, 'b')));
    /// ```
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the duplicate policy in effect.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Returns the tree's comparator.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let mut tree = BalancedTree::new();
    /// assert_eq!(tree.len(), 0);
    /// tree.add(1).unwrap();
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels in the tree; 0 when empty.
    ///
    /// For `n` elements this never exceeds about `1.44 * log2(n + 2)`.
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every element.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        debug!(len = self.raw.len(), "clearing tree");
        self.raw.clear();
    }

    /// Returns the smallest element, found by descending left from the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree = BalancedTree::from([3, 1, 2]);
    /// assert_eq!(tree.min(), Some(&1));
    /// assert_eq!(BalancedTree::<i32>::new().min(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.raw.first().map(|handle| self.raw.value(handle))
    }

    /// Returns the largest element, found by descending right from the root.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.raw.last().map(|handle| self.raw.value(handle))
    }

    /// Finds the element for which `f` returns [`Ordering::Equal`].
    ///
    /// `f` reports how the sought element orders relative to the one passed in, which
    /// lets a tree be searched by something other than a whole element.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree = BalancedTree::from([("a", 1), ("b", 2), ("c", 3)]);
    /// assert_eq!(tree.get_by(|probe| "b".cmp(probe.0)), Some(&("b", 2)));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_by<F>(&self, f: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.raw.find(f).map(|handle| self.raw.value(handle))
    }

    /// Like [`get_by`](Self::get_by), but returns a cursor positioned on the match.
    pub fn search_by<F>(&self, f: F) -> Option<Cursor>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.raw.find(f).map(|handle| self.cursor_at(handle))
    }

    /// Like [`get_by`](Self::get_by), but removes the match and returns it.
    pub fn remove_by<F>(&mut self, f: F) -> Option<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let handle = self.raw.find(f)?;
        Some(self.raw.remove(handle))
    }

    /// Removes the element under `cursor` and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIterator`] if the cursor is stale, sits on a sentinel, or does not
    /// belong to this tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let mut tree = BalancedTree::from([1, 2, 3]);
    /// let cursor = tree.begin();
    /// assert_eq!(tree.remove_at(cursor), Ok(1));
    ///
    /// // The removal invalidated every cursor, including the one just used.
    /// assert!(tree.remove_at(cursor).is_err());
    /// ```
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<T> {
        let handle = cursor.handle(&self.raw)?.ok_or(Error::InvalidIterator(CursorFault::Sentinel))?;
        Ok(self.raw.remove(handle))
    }

    /// Gets an iterator over the elements of the tree, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree = BalancedTree::from([3, 1, 2]);
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next_back(), Some(&3));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Returns a copy of every element, in ascending order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> alloc::vec::Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Returns a cursor on the smallest element, or the end sentinel if the tree is
    /// empty.
    pub fn begin(&self) -> Cursor {
        self.raw.first().map_or_else(|| self.end(), |handle| self.cursor_at(handle))
    }

    /// Returns a cursor on the end sentinel, one step past the largest element.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree = BalancedTree::from([1, 2, 3]);
    /// let mut cursor = tree.end();
    /// cursor.move_prev(&tree)?;
    /// assert_eq!(cursor.get(&tree), Ok(&3));
    /// # Ok::<(), avlmap::Error>(())
    /// ```
    pub fn end(&self) -> Cursor {
        Cursor::end(self.raw.id(), self.raw.version())
    }

    /// Returns a cursor on the largest element, or the pre-begin sentinel if the tree is
    /// empty.
    pub fn rbegin(&self) -> Cursor {
        self.raw.last().map_or_else(|| self.rend(), |handle| self.cursor_at(handle))
    }

    /// Returns a cursor on the pre-begin sentinel, one step before the smallest element.
    pub fn rend(&self) -> Cursor {
        Cursor::pre_begin(self.raw.id(), self.raw.version())
    }

    /// Returns a cursor on the root node for structural walks, or `None` if the tree is
    /// empty.
    pub fn root(&self) -> Option<Cursor> {
        self.raw.root().map(|handle| self.cursor_at(handle))
    }

    /// Returns a [`Display`](fmt::Display)able rendering of the tree's physical layout.
    ///
    /// Each node prints as `(value,left,right)` with empty subtrees left blank, e.g.
    /// `(2,(1,,),(3,,))`. An empty tree prints as an empty string.
    pub fn shape(&self) -> Shape<'_, T, C> {
        Shape::new(self)
    }

    fn cursor_at(&self, handle: Handle) -> Cursor {
        Cursor::at(handle, self.raw.id(), self.raw.version())
    }

    pub(crate) fn raw(&self) -> &RawTree<T> {
        &self.raw
    }

    /// Splits the tree for the map layer, which edits pages in place while comparing
    /// keys.
    pub(crate) fn parts_mut(&mut self) -> (&mut RawTree<T>, &C) {
        (&mut self.raw, &self.comparator)
    }
}

impl<T, C: Comparator<T>> BalancedTree<T, C> {
    /// Adds `value` to the tree and returns a cursor on it.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] if an equal element is already stored and the tree's
    /// [`DuplicatePolicy`] is `Reject`. The stored element is left untouched.
    ///
    /// # Complexity
    ///
    /// O(log n) comparisons and at most one (single or double) rotation.
    pub fn add(&mut self, value: T) -> Result<Cursor> {
        let comparator = &self.comparator;
        match self.raw.insert(value, |new, existing| comparator.compare(new, existing)) {
            InsertResult::Inserted(handle) => Ok(self.cursor_at(handle)),
            InsertResult::Occupied { handle, value } => match self.policy {
                DuplicatePolicy::Reject => {
                    debug!(len = self.raw.len(), "rejected duplicate element");
                    Err(Error::DuplicateKey)
                }
                DuplicatePolicy::Replace => {
                    *self.raw.value_mut(handle) = value;
                    trace!(node = handle.to_index(), "replaced duplicate element in place");
                    Ok(self.cursor_at(handle))
                }
            },
        }
    }

    /// Removes the element equal to `value` and returns it. Removing an absent element
    /// is a no-op that returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let mut tree = BalancedTree::from([1, 2, 3]);
    /// assert_eq!(tree.remove(&2), Some(2));
    /// assert_eq!(tree.remove(&2), None);
    /// assert_eq!(tree.to_sorted_vec(), [1, 3]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n); rebalancing may rotate at every level on the way back to the root.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let comparator = &self.comparator;
        let handle = self.raw.find(|probe| comparator.compare(value, probe))?;
        Some(self.raw.remove(handle))
    }

    /// Returns `true` if the tree holds an element equal to `value`.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Returns the stored element equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.get_by(|probe| self.comparator.compare(value, probe))
    }

    /// Returns a cursor on the element equal to `value`, or `None` if there is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree = BalancedTree::from([10, 20, 30]);
    /// let mut cursor = tree.search(&20).unwrap();
    /// cursor.move_next(&tree)?;
    /// assert_eq!(cursor.get(&tree), Ok(&30));
    /// assert!(tree.search(&25).is_none());
    /// # Ok::<(), avlmap::Error>(())
    /// ```
    pub fn search(&self, value: &T) -> Option<Cursor> {
        self.search_by(|probe| self.comparator.compare(value, probe))
    }
}

impl<T: Clone, C: Clone> Clone for BalancedTree<T, C> {
    /// Copies the tree node for node, so the copy has the same shape. The copy is a
    /// different tree to cursors: those made by `self` are refused by the copy.
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            comparator: self.comparator.clone(),
            policy: self.policy,
        }
    }
}

impl<T: PartialEq, C> PartialEq for BalancedTree<T, C> {
    /// Trees are equal when they hold equal elements in the same order, whatever their
    /// shape.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for BalancedTree<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for BalancedTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default> Default for BalancedTree<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C: Comparator<T>> Extend<T> for BalancedTree<T, C> {
    /// Adds every element; duplicates are handled by the tree's [`DuplicatePolicy`], with
    /// rejected ones dropped.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            let _ = self.add(value);
        }
    }
}

impl<T, C: Comparator<T> + Default> FromIterator<T> for BalancedTree<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for BalancedTree<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T, C> IntoIterator for &'a BalancedTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for BalancedTree<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an owning iterator over the elements, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree = BalancedTree::from([2, 3, 1]);
    /// assert_eq!(tree.into_iter().collect::<Vec<_>>(), [1, 2, 3]);
    /// ```
    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            inner: self.raw.into_sorted_vec().into_iter(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.front?;
        self.remaining -= 1;
        self.front = self.tree.successor(handle);
        Some(self.tree.value(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.back?;
        self.remaining -= 1;
        self.back = self.tree.predecessor(handle);
        Some(self.tree.value(handle))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::{FnComparator, ReverseOrder};
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    fn tree_of(values: &[i32]) -> BalancedTree<i32> {
        let mut tree = BalancedTree::new();
        for &value in values {
            tree.add(value).expect("values are distinct");
            tree.raw().validate_invariants();
        }
        tree
    }

    #[test]
    fn insertion_shapes() {
        let mut tree = tree_of(&[5, 10, 15, 20, 25]);
        assert_eq!(tree.shape().to_string(), "(10,(5,,),(20,(15,,),(25,,)))");

        tree.add(2).unwrap();
        tree.add(1).unwrap();
        assert_eq!(tree.shape().to_string(), "(10,(2,(1,,),(5,,)),(20,(15,,),(25,,)))");

        assert_eq!(tree_of(&[5, 10, 9]).shape().to_string(), "(9,(5,,),(10,,))");
        assert_eq!(tree_of(&[5, 3, 4]).shape().to_string(), "(4,(3,,),(5,,))");
        assert_eq!(BalancedTree::<i32>::new().shape().to_string(), "");
    }

    #[test]
    fn duplicate_policies() {
        let mut tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.add(2), Err(Error::DuplicateKey));
        assert_eq!(tree.len(), 3);

        let mut tree = tree.with_duplicate_policy(DuplicatePolicy::Replace);
        assert_eq!(tree.duplicate_policy(), DuplicatePolicy::Replace);
        let before = tree.begin();
        let cursor = tree.add(2).expect("replace never fails");
        assert_eq!(cursor.get(&tree), Ok(&2));
        // Replacing in place is not a structural change.
        assert_eq!(before.get(&tree), Ok(&1));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.remove(&2), Some(2));
        tree.raw().validate_invariants();
        assert!(!tree.contains(&2));
        assert_eq!(tree.remove(&2), None);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.to_sorted_vec(), vec![1, 3]);
    }

    #[test]
    fn empty_tree_lookups() {
        let mut tree: BalancedTree<i32> = BalancedTree::new();
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert!(tree.search(&1).is_none());
        assert_eq!(tree.remove(&1), None);
        assert!(tree.root().is_none());
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.begin(), tree.end());
        assert_eq!(tree.rbegin(), tree.rend());
    }

    #[test]
    fn remove_at_sentinel_fails() {
        let mut tree = tree_of(&[1]);
        let end = tree.end();
        assert_eq!(tree.remove_at(end), Err(Error::InvalidIterator(CursorFault::Sentinel)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn reverse_comparator_orders_descending() {
        let mut tree = BalancedTree::with_comparator(ReverseOrder(NaturalOrder));
        tree.extend(1..10);
        assert_eq!(tree.to_sorted_vec(), (1..10).rev().collect::<Vec<_>>());
        assert_eq!(tree.min(), Some(&9));
        assert_eq!(tree.max(), Some(&1));
        assert!(tree.contains(&4));
    }

    #[test]
    fn search_by_projection() {
        let mut tree = BalancedTree::with_comparator(FnComparator::new(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0)));
        tree.extend([(3, 'c'), (1, 'a'), (2, 'b')]);
        assert_eq!(tree.get_by(|probe| 2.cmp(&probe.0)), Some(&(2, 'b')));
        assert_eq!(tree.remove_by(|probe| 1.cmp(&probe.0)), Some((1, 'a')));
        assert!(tree.search_by(|probe| 1.cmp(&probe.0)).is_none());
    }

    #[test]
    fn iterators_meet_in_the_middle() {
        let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&7));
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.clone().collect::<Vec<_>>(), vec![&2, &3, &4, &5, &6]);
        assert_eq!(iter.rev().collect::<Vec<_>>(), vec![&6, &5, &4, &3, &2]);
    }

    #[test]
    fn clone_keeps_shape_and_equality_ignores_it() {
        let tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
        let copy = tree.clone();
        assert_eq!(copy.shape().to_string(), tree.shape().to_string());
        assert_eq!(copy, tree);

        let reordered = tree_of(&[7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(reordered, tree);
    }

    #[test]
    fn clear_resets_everything() {
        let mut tree = tree_of(&[1, 2, 3]);
        let cursor = tree.begin();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(cursor.get(&tree), Err(Error::InvalidIterator(CursorFault::Stale)));
    }

    #[test]
    fn debug_lists_in_order() {
        let tree = tree_of(&[2, 1, 3]);
        assert_eq!(alloc::format!("{tree:?}"), "{1, 2, 3}");
    }
}
