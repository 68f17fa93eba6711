use core::cmp::Ordering;
use core::mem;
use core::sync::atomic::{self, AtomicU64};

use alloc::vec::Vec;
use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Removal, Side};

/// Source of tree identities. Zero is reserved for trees that were never modified.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_id() -> u64 {
    NEXT_ID.fetch_add(1, atomic::Ordering::Relaxed)
}

/// The arena-backed AVL core behind `BalancedTree`.
///
/// The raw tree knows nothing about comparators: every operation that needs an order
/// takes a closure, so the public layer decides how elements (or probe keys) compare.
pub(crate) struct RawTree<T> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<T>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Identity stamped into cursors; drawn on the first structural mutation and
    /// redrawn by `clone`.
    id: u64,
    /// Bumped on every structural mutation so detached cursors can detect staleness.
    version: u64,
}

/// Result of an insertion attempt.
pub(crate) enum InsertResult<T> {
    /// A new leaf was linked in.
    Inserted(Handle),
    /// An equal element already exists; the rejected value is handed back.
    Occupied { handle: Handle, value: T },
}

/// Where a descent ended.
enum Probe {
    Found(Handle),
    Vacant { parent: Option<Handle>, side: Side },
}

impl<T: Clone> Clone for RawTree<T> {
    /// Copies the nodes slot for slot. A copy of a modified tree gets its own identity,
    /// so cursors into the original do not resolve against it.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            id: if self.id == 0 { 0 } else { fresh_id() },
            version: self.version,
        }
    }
}

impl<T> RawTree<T> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            id: 0,
            version: 0,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            id: 0,
            version: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn version(&self) -> u64 {
        self.version
    }

    /// This tree's identity; 0 until the first structural mutation.
    pub(crate) const fn id(&self) -> u64 {
        self.id
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Height of the whole tree; 0 when empty.
    pub(crate) fn height(&self) -> usize {
        usize::from(self.child_height(self.root))
    }

    /// Removes every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.bump_version();
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<T> {
        self.nodes.get(handle)
    }

    /// Resolves a handle that may have outlived its node.
    #[inline]
    pub(crate) fn try_node(&self, handle: Handle) -> Option<&Node<T>> {
        self.nodes.try_get(handle)
    }

    #[inline]
    pub(crate) fn value(&self, handle: Handle) -> &T {
        self.nodes.get(handle).value()
    }

    /// Mutable access to a payload. Callers must not change its position in the order.
    #[inline]
    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut T {
        self.nodes.get_mut(handle).value_mut()
    }

    /// Finds the node for which `cmp` returns `Equal`.
    ///
    /// `cmp` reports how the sought element orders relative to the visited one.
    pub(crate) fn find<F>(&self, mut cmp: F) -> Option<Handle>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match cmp(node.value()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some(handle),
            }
        }
        None
    }

    fn probe<F>(&self, mut cmp: F) -> Probe
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            side = match cmp(node.value()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Probe::Found(handle),
            };
            parent = Some(handle);
            current = node.child(side);
        }

        Probe::Vacant { parent, side }
    }

    /// Inserts `value` as a new leaf and restores balance on the way up.
    ///
    /// `cmp(new, existing)` orders the incoming value against stored ones.
    pub(crate) fn insert<F>(&mut self, value: T, mut cmp: F) -> InsertResult<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let (parent, side) = match self.probe(|existing| cmp(&value, existing)) {
            Probe::Found(handle) => return InsertResult::Occupied { handle, value },
            Probe::Vacant { parent, side } => (parent, side),
        };

        let handle = self.nodes.alloc(Node::new(value, parent));
        match parent {
            None => self.root = Some(handle),
            Some(parent) => self.nodes.get_mut(parent).set_child(side, Some(handle)),
        }
        self.bump_version();
        self.rebalance_after_insert(parent);

        InsertResult::Inserted(handle)
    }

    /// Walks up from the new leaf's parent. A single (or double) rotation at the first
    /// unbalanced ancestor restores that subtree's pre-insert height, so nothing above
    /// it can be out of balance.
    fn rebalance_after_insert(&mut self, start: Option<Handle>) {
        let mut current = start;
        while let Some(handle) = current {
            let before = self.nodes.get(handle).height();
            self.update_height(handle);

            if self.balance_factor(handle).abs() > 1 {
                self.rebalance(handle);
                return;
            }
            if self.nodes.get(handle).height() == before {
                return;
            }

            current = self.nodes.get(handle).parent();
        }
    }

    /// Unlinks `target` and returns its payload.
    pub(crate) fn remove(&mut self, target: Handle) -> T {
        let (parent, child) = match Removal::classify(self.nodes.get(target)) {
            Removal::TwoChildren { successor_subtree } => {
                let successor = self.leftmost(successor_subtree);
                let (target_node, successor_node) = self.nodes.get_pair_mut(target, successor);
                mem::swap(target_node.value_mut(), successor_node.value_mut());
                // The successor has no left child, so this recursion bottoms out at once.
                return self.remove(successor);
            }
            Removal::OneChild(child) => (self.nodes.get(target).parent(), Some(child)),
            Removal::Leaf => (self.nodes.get(target).parent(), None),
        };

        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(parent);
        }
        self.replace_child(parent, target, child);
        let node = self.nodes.take(target);
        self.bump_version();
        self.rebalance_after_remove(parent);

        node.into_value()
    }

    /// Unlike insertion, a rotation after removal can shrink the subtree, so every
    /// ancestor up to the root is checked.
    fn rebalance_after_remove(&mut self, start: Option<Handle>) {
        let mut current = start;
        while let Some(handle) = current {
            self.update_height(handle);
            let top = if self.balance_factor(handle).abs() > 1 {
                self.rebalance(handle)
            } else {
                handle
            };
            current = self.nodes.get(top).parent();
        }
    }

    /// Applies the LL/LR/RR/RL fix-up to an unbalanced node and returns the new root of
    /// its subtree.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        let factor = self.balance_factor(handle);
        if factor > 1 {
            let left = self.nodes.get(handle).left().expect("`RawTree::rebalance()` - left-heavy node has no left child!");
            if self.balance_factor(left) < 0 {
                self.rotate_left(left);
            }
            self.rotate_right(handle)
        } else if factor < -1 {
            let right =
                self.nodes.get(handle).right().expect("`RawTree::rebalance()` - right-heavy node has no right child!");
            if self.balance_factor(right) > 0 {
                self.rotate_right(right);
            }
            self.rotate_left(handle)
        } else {
            handle
        }
    }

    /// Lifts the right child of `pivot` into its place. Returns the lifted node.
    fn rotate_left(&mut self, pivot: Handle) -> Handle {
        let lifted = self.nodes.get(pivot).right().expect("`RawTree::rotate_left()` - pivot has no right child!");
        let parent = self.nodes.get(pivot).parent();
        let inner = self.nodes.get(lifted).left();

        self.nodes.get_mut(pivot).set_child(Side::Right, inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(pivot));
        }

        self.replace_child(parent, pivot, Some(lifted));
        let lifted_node = self.nodes.get_mut(lifted);
        lifted_node.set_parent(parent);
        lifted_node.set_child(Side::Left, Some(pivot));
        self.nodes.get_mut(pivot).set_parent(Some(lifted));

        self.update_height(pivot);
        self.update_height(lifted);
        trace!(pivot = pivot.to_index(), lifted = lifted.to_index(), "rotate left");
        lifted
    }

    /// Lifts the left child of `pivot` into its place. Returns the lifted node.
    fn rotate_right(&mut self, pivot: Handle) -> Handle {
        let lifted = self.nodes.get(pivot).left().expect("`RawTree::rotate_right()` - pivot has no left child!");
        let parent = self.nodes.get(pivot).parent();
        let inner = self.nodes.get(lifted).right();

        self.nodes.get_mut(pivot).set_child(Side::Left, inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(pivot));
        }

        self.replace_child(parent, pivot, Some(lifted));
        let lifted_node = self.nodes.get_mut(lifted);
        lifted_node.set_parent(parent);
        lifted_node.set_child(Side::Right, Some(pivot));
        self.nodes.get_mut(pivot).set_parent(Some(lifted));

        self.update_height(pivot);
        self.update_height(lifted);
        trace!(pivot = pivot.to_index(), lifted = lifted.to_index(), "rotate right");
        lifted
    }

    /// Points whichever slot held `old` (a child of `parent`, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(parent, old);
                self.nodes.get_mut(parent).set_child(side, new);
            }
        }
    }

    fn side_of(&self, parent: Handle, child: Handle) -> Side {
        let node = self.nodes.get(parent);
        if node.left() == Some(child) {
            Side::Left
        } else {
            debug_assert_eq!(node.right(), Some(child), "`RawTree::side_of()` - not a child of `parent`!");
            Side::Right
        }
    }

    fn child_height(&self, child: Option<Handle>) -> u8 {
        child.map_or(0, |handle| self.nodes.get(handle).height())
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.child_height(node.left()).max(self.child_height(node.right()));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// `height(left) - height(right)`.
    pub(crate) fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.child_height(node.left())) - i16::from(self.child_height(node.right()))
    }

    fn bump_version(&mut self) {
        if self.id == 0 {
            self.id = fresh_id();
        }
        self.version = self.version.wrapping_add(1);
    }

    /// The minimum of the subtree rooted at `handle`.
    pub(crate) fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left() {
            handle = left;
        }
        handle
    }

    /// The maximum of the subtree rooted at `handle`.
    pub(crate) fn rightmost(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.nodes.get(handle).right() {
            handle = right;
        }
        handle
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost(root))
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.rightmost(root))
    }

    /// The in-order successor: the leftmost node of the right subtree, or else the first
    /// ancestor reached from a left child.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.nodes.get(handle).right() {
            return Some(self.leftmost(right));
        }
        self.ascend_until(handle, Side::Left)
    }

    /// Mirror of [`RawTree::successor`].
    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        if let Some(left) = self.nodes.get(handle).left() {
            return Some(self.rightmost(left));
        }
        self.ascend_until(handle, Side::Right)
    }

    /// Climbs until the step up is taken from a `from`-side child and returns that parent.
    fn ascend_until(&self, mut child: Handle, from: Side) -> Option<Handle> {
        while let Some(parent) = self.nodes.get(child).parent() {
            if self.nodes.get(parent).child(from) == Some(child) {
                return Some(parent);
            }
            child = parent;
        }
        None
    }

    /// Moves every payload out in ascending order.
    pub(crate) fn into_sorted_vec(mut self) -> Vec<T> {
        let mut order = Vec::with_capacity(self.len());
        let mut current = self.first();
        while let Some(handle) = current {
            order.push(handle);
            current = self.successor(handle);
        }

        // Taking leaves the links dangling, so only start once the walk is done.
        order.into_iter().map(|handle| self.nodes.take(handle).into_value()).collect()
    }
}
