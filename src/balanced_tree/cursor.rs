use super::BalancedTree;
use crate::error::{CursorFault, Result};
use crate::raw::{Handle, RawTree};

/// A detached position in a [`BalancedTree`].
///
/// A cursor sits either on an element or on one of two sentinels: *pre-begin*, one step
/// before the smallest element, and *end*, one step past the largest. Stepping works in
/// both directions and wraps between a sentinel and the nearest element, so moving back
/// from [`end`](BalancedTree::end) lands on the maximum and moving forward from
/// [`rend`](BalancedTree::rend) lands on the minimum.
///
/// Cursors also expose the tree's physical layout: [`descend_left`](Self::descend_left),
/// [`descend_right`](Self::descend_right) and [`ascend`](Self::ascend) follow child and
/// parent links without regard to order.
///
/// A cursor does not borrow its tree; every method takes the tree as an argument. Adding
/// or removing a node (or clearing) makes every existing cursor stale, and a stale cursor
/// answers with [`Error::InvalidIterator`](crate::Error::InvalidIterator) instead of
/// reading reused storage.
///
/// Two cursors compare equal when they designate the same position.
///
/// # Examples
///
/// ```
/// use avlmap::BalancedTree;
///
/// let tree = BalancedTree::from([1, 2, 3]);
/// let mut cursor = tree.begin();
/// let mut seen = Vec::new();
/// while cursor != tree.end() {
///     seen.push(*cursor.get(&tree)?);
///     cursor.move_next(&tree)?;
/// }
/// assert_eq!(seen, [1, 2, 3]);
/// # Ok::<(), avlmap::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    position: Position,
    tree: u64,
    version: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
enum Position {
    PreBegin,
    Node(Handle),
    End,
}

impl Cursor {
    pub(super) const fn at(handle: Handle, tree: u64, version: u64) -> Self {
        Self {
            position: Position::Node(handle),
            tree,
            version,
        }
    }

    pub(super) const fn end(tree: u64, version: u64) -> Self {
        Self {
            position: Position::End,
            tree,
            version,
        }
    }

    pub(super) const fn pre_begin(tree: u64, version: u64) -> Self {
        Self {
            position: Position::PreBegin,
            tree,
            version,
        }
    }

    /// Returns `true` if the cursor sits on the end sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position == Position::End
    }

    /// Returns `true` if the cursor sits on the pre-begin sentinel.
    #[must_use]
    pub fn is_pre_begin(&self) -> bool {
        self.position == Position::PreBegin
    }

    /// Returns `true` if the cursor sits on either sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        !matches!(self.position, Position::Node(_))
    }

    /// Returns `false` once `tree` has been structurally modified since the cursor was
    /// made, or if the cursor was made by another tree.
    pub fn is_valid_for<T, C>(&self, tree: &BalancedTree<T, C>) -> bool {
        self.handle(tree.raw()).is_ok()
    }

    /// Returns the element under the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIterator`](crate::Error::InvalidIterator) if the cursor is stale or
    /// sits on a sentinel.
    pub fn get<'t, T, C>(&self, tree: &'t BalancedTree<T, C>) -> Result<&'t T> {
        let raw = tree.raw();
        let handle = self.handle(raw)?.ok_or(CursorFault::Sentinel)?;
        Ok(raw.value(handle))
    }

    /// Steps to the in-order successor; from the largest element this reaches the end
    /// sentinel, and from pre-begin it reaches the smallest element.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIterator`](crate::Error::InvalidIterator) if the cursor is stale or
    /// already on the end sentinel. The cursor does not move on error.
    pub fn move_next<T, C>(&mut self, tree: &BalancedTree<T, C>) -> Result<()> {
        let raw = tree.raw();
        let next = match (self.position, self.handle(raw)?) {
            (Position::End, _) => return Err(CursorFault::Sentinel.into()),
            (_, Some(handle)) => raw.successor(handle),
            (_, None) => raw.first(),
        };
        self.position = next.map_or(Position::End, Position::Node);
        Ok(())
    }

    /// Steps to the in-order predecessor; from the smallest element this reaches the
    /// pre-begin sentinel, and from end it reaches the largest element.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIterator`](crate::Error::InvalidIterator) if the cursor is stale or
    /// already on the pre-begin sentinel. The cursor does not move on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree = BalancedTree::from([1, 2]);
    /// let mut cursor = tree.begin();
    /// cursor.move_prev(&tree)?;
    /// assert!(cursor.is_pre_begin());
    /// assert!(cursor.move_prev(&tree).is_err());
    /// cursor.move_next(&tree)?;
    /// assert_eq!(cursor.get(&tree), Ok(&1));
    /// # Ok::<(), avlmap::Error>(())
    /// ```
    pub fn move_prev<T, C>(&mut self, tree: &BalancedTree<T, C>) -> Result<()> {
        let raw = tree.raw();
        let prev = match (self.position, self.handle(raw)?) {
            (Position::PreBegin, _) => return Err(CursorFault::Sentinel.into()),
            (_, Some(handle)) => raw.predecessor(handle),
            (_, None) => raw.last(),
        };
        self.position = prev.map_or(Position::PreBegin, Position::Node);
        Ok(())
    }

    /// Returns `true` if the node under the cursor has a left child.
    pub fn can_descend_left<T, C>(&self, tree: &BalancedTree<T, C>) -> bool {
        self.link(tree.raw(), |raw, handle| raw.node(handle).left()).is_ok_and(|link| link.is_some())
    }

    /// Returns `true` if the node under the cursor has a right child.
    pub fn can_descend_right<T, C>(&self, tree: &BalancedTree<T, C>) -> bool {
        self.link(tree.raw(), |raw, handle| raw.node(handle).right()).is_ok_and(|link| link.is_some())
    }

    /// Returns `true` if the node under the cursor has a parent.
    pub fn can_ascend<T, C>(&self, tree: &BalancedTree<T, C>) -> bool {
        self.link(tree.raw(), |raw, handle| raw.node(handle).parent()).is_ok_and(|link| link.is_some())
    }

    /// Moves to the left child. Returns `Ok(false)` and stays put if there is none.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIterator`](crate::Error::InvalidIterator) if the cursor is stale or
    /// sits on a sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree = BalancedTree::from([1, 2, 3]);
    /// let mut cursor = tree.root().unwrap();
    /// assert_eq!(cursor.get(&tree), Ok(&2));
    /// assert_eq!(cursor.descend_left(&tree), Ok(true));
    /// assert_eq!(cursor.get(&tree), Ok(&1));
    /// assert_eq!(cursor.descend_left(&tree), Ok(false));
    /// assert_eq!(cursor.ascend(&tree), Ok(true));
    /// assert_eq!(cursor.ascend(&tree), Ok(false));
    /// # Ok::<(), avlmap::Error>(())
    /// ```
    pub fn descend_left<T, C>(&mut self, tree: &BalancedTree<T, C>) -> Result<bool> {
        self.follow(tree.raw(), |raw, handle| raw.node(handle).left())
    }

    /// Moves to the right child. Returns `Ok(false)` and stays put if there is none.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIterator`](crate::Error::InvalidIterator) if the cursor is stale or
    /// sits on a sentinel.
    pub fn descend_right<T, C>(&mut self, tree: &BalancedTree<T, C>) -> Result<bool> {
        self.follow(tree.raw(), |raw, handle| raw.node(handle).right())
    }

    /// Moves to the parent. Returns `Ok(false)` and stays put at the root.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIterator`](crate::Error::InvalidIterator) if the cursor is stale or
    /// sits on a sentinel.
    pub fn ascend<T, C>(&mut self, tree: &BalancedTree<T, C>) -> Result<bool> {
        self.follow(tree.raw(), |raw, handle| raw.node(handle).parent())
    }

    fn follow<T>(&mut self, raw: &RawTree<T>, step: fn(&RawTree<T>, Handle) -> Option<Handle>) -> Result<bool> {
        match self.link(raw, step)? {
            Some(target) => {
                self.position = Position::Node(target);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn link<T>(&self, raw: &RawTree<T>, step: fn(&RawTree<T>, Handle) -> Option<Handle>) -> Result<Option<Handle>> {
        let handle = self.handle(raw)?.ok_or(CursorFault::Sentinel)?;
        Ok(step(raw, handle))
    }

    /// Checks the cursor against `raw` and resolves its node; sentinels yield `None`.
    ///
    /// A cursor stamped with identity 0 comes from a tree that was never modified, which
    /// can only have handed out sentinels, so the version check alone covers it.
    pub(super) fn handle<T>(&self, raw: &RawTree<T>) -> Result<Option<Handle>> {
        if self.tree != 0 && self.tree != raw.id() {
            return Err(CursorFault::Detached.into());
        }
        if self.version != raw.version() {
            return Err(CursorFault::Stale.into());
        }

        match self.position {
            Position::Node(handle) => match raw.try_node(handle) {
                Some(_) => Ok(Some(handle)),
                None => Err(CursorFault::Detached.into()),
            },
            Position::PreBegin | Position::End => Ok(None),
        }
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Cursor {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::Error;
    use alloc::vec;
    use alloc::vec::Vec;

    fn tree_of(values: &[i32]) -> BalancedTree<i32> {
        let mut tree = BalancedTree::new();
        tree.extend(values.iter().copied());
        tree
    }

    fn walk_forward(tree: &BalancedTree<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut cursor = tree.begin();
        while !cursor.is_end() {
            out.push(*cursor.get(tree).unwrap());
            cursor.move_next(tree).unwrap();
        }
        out
    }

    fn walk_backward(tree: &BalancedTree<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut cursor = tree.rbegin();
        while !cursor.is_pre_begin() {
            out.push(*cursor.get(tree).unwrap());
            cursor.move_prev(tree).unwrap();
        }
        out
    }

    #[test]
    fn walks_both_directions() {
        let tree = tree_of(&[50, 20, 80, 10, 30, 70, 90, 25]);
        assert_eq!(walk_forward(&tree), vec![10, 20, 25, 30, 50, 70, 80, 90]);
        assert_eq!(walk_backward(&tree), vec![90, 80, 70, 50, 30, 25, 20, 10]);
    }

    #[test]
    fn sentinels_wrap_to_extremes() {
        let tree = tree_of(&[3, 1, 2]);

        let mut cursor = tree.end();
        cursor.move_prev(&tree).unwrap();
        assert_eq!(cursor.get(&tree), Ok(&3));

        let mut cursor = tree.rend();
        cursor.move_next(&tree).unwrap();
        assert_eq!(cursor.get(&tree), Ok(&1));
        assert_eq!(cursor, tree.begin());
    }

    #[test]
    fn stepping_past_a_sentinel_fails_without_moving() {
        let tree = tree_of(&[1]);
        let mut cursor = tree.end();
        assert_eq!(cursor.move_next(&tree), Err(Error::InvalidIterator(CursorFault::Sentinel)));
        assert!(cursor.is_end());
        assert_eq!(cursor.get(&tree), Err(Error::InvalidIterator(CursorFault::Sentinel)));

        let mut cursor = tree.rend();
        assert_eq!(cursor.move_prev(&tree), Err(Error::InvalidIterator(CursorFault::Sentinel)));
        assert!(cursor.is_pre_begin());
    }

    #[test]
    fn empty_tree_sentinels_meet() {
        let tree = tree_of(&[]);
        let mut cursor = tree.end();
        cursor.move_prev(&tree).unwrap();
        assert!(cursor.is_pre_begin());
        cursor.move_next(&tree).unwrap();
        assert!(cursor.is_end());
    }

    #[test]
    fn structural_navigation() {
        let tree = tree_of(&[5, 10, 15, 20, 25]);
        let mut cursor = tree.root().unwrap();
        assert_eq!(cursor.get(&tree), Ok(&10));
        assert!(!cursor.can_ascend(&tree));
        assert!(cursor.can_descend_left(&tree) && cursor.can_descend_right(&tree));

        assert_eq!(cursor.descend_right(&tree), Ok(true));
        assert_eq!(cursor.descend_left(&tree), Ok(true));
        assert_eq!(cursor.get(&tree), Ok(&15));
        assert!(!cursor.can_descend_left(&tree) && !cursor.can_descend_right(&tree));
        assert_eq!(cursor.descend_right(&tree), Ok(false));
        assert_eq!(cursor.get(&tree), Ok(&15));

        assert_eq!(cursor.ascend(&tree), Ok(true));
        assert_eq!(cursor.get(&tree), Ok(&20));
        assert_eq!(cursor.ascend(&tree), Ok(true));
        assert_eq!(cursor, tree.root().unwrap());
    }

    #[test]
    fn structural_moves_on_sentinel_fail() {
        let tree = tree_of(&[1, 2]);
        let mut cursor = tree.end();
        assert!(!cursor.can_ascend(&tree));
        assert_eq!(cursor.ascend(&tree), Err(Error::InvalidIterator(CursorFault::Sentinel)));
        assert_eq!(cursor.descend_left(&tree), Err(Error::InvalidIterator(CursorFault::Sentinel)));
    }

    #[test]
    fn structural_change_invalidates() {
        let mut tree = tree_of(&[1, 2, 3]);
        let mut cursor = tree.search(&2).unwrap();
        assert!(cursor.is_valid_for(&tree));

        tree.add(4).unwrap();
        assert!(!cursor.is_valid_for(&tree));
        assert_eq!(cursor.get(&tree), Err(Error::InvalidIterator(CursorFault::Stale)));
        assert_eq!(cursor.move_next(&tree), Err(Error::InvalidIterator(CursorFault::Stale)));
        assert!(!cursor.can_descend_left(&tree));

        let fresh = tree.search(&2).unwrap();
        tree.remove(&4);
        assert_eq!(fresh.get(&tree), Err(Error::InvalidIterator(CursorFault::Stale)));
    }

    #[test]
    fn failed_add_keeps_cursors_valid() {
        let mut tree = tree_of(&[1, 2, 3]);
        let cursor = tree.begin();
        assert_eq!(tree.add(2), Err(Error::DuplicateKey));
        assert_eq!(tree.remove(&9), None);
        assert_eq!(cursor.get(&tree), Ok(&1));
    }

    #[test]
    fn foreign_cursor_is_detached() {
        let big = tree_of(&[1, 2, 3, 4, 5]);
        let mut small = tree_of(&[1]);
        while small.raw().version() != big.raw().version() {
            small.add(0).unwrap();
            small.remove(&0);
        }
        let cursor = big.rbegin();
        assert_eq!(cursor.get(&small), Err(Error::InvalidIterator(CursorFault::Detached)));
        assert!(!cursor.is_valid_for(&small));
    }

    #[test]
    fn cursor_from_a_twin_tree_is_detached() {
        let a = tree_of(&[1, 2, 3]);
        let mut b = tree_of(&[7, 8, 9]);
        assert_eq!(a.raw().version(), b.raw().version());

        let root = a.root().unwrap();
        assert_eq!(root.get(&b), Err(Error::InvalidIterator(CursorFault::Detached)));
        assert_eq!(b.remove_at(root), Err(Error::InvalidIterator(CursorFault::Detached)));
        assert_eq!(b.to_sorted_vec(), vec![7, 8, 9]);
        assert_eq!(a.end().move_prev(&b), Err(Error::InvalidIterator(CursorFault::Detached)));
    }

    #[test]
    fn clone_does_not_accept_cursors_of_the_original() {
        let tree = tree_of(&[1, 2, 3]);
        let copy = tree.clone();
        let cursor = tree.begin();
        assert_eq!(cursor.get(&tree), Ok(&1));
        assert_eq!(cursor.get(&copy), Err(Error::InvalidIterator(CursorFault::Detached)));
        assert_eq!(copy.begin().get(&copy), Ok(&1));
    }

    #[test]
    fn sentinels_of_an_untouched_tree_still_go_stale() {
        let mut tree: BalancedTree<i32> = BalancedTree::new();
        let end = tree.end();
        tree.add(1).unwrap();
        assert_eq!(end.get(&tree), Err(Error::InvalidIterator(CursorFault::Stale)));
    }
}
