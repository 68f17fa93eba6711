use super::handle::Handle;

/// Which child slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A single AVL node.
///
/// Children are owned through the arena; `parent` is a plain back-link and carries no
/// ownership.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    value: T,
    left: Option<Handle>,
    right: Option<Handle>,
    parent: Option<Handle>,
    // Leaves have height 1 and an absent child counts as 0. AVL height stays below
    // 1.45 * log2(n + 2), so `Handle::MAX` nodes need well under 64 levels.
    height: u8,
}

impl<T> Node<T> {
    /// Creates a detached leaf.
    pub(crate) fn new(value: T, parent: Option<Handle>) -> Self {
        Self {
            value,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }

    #[inline]
    pub(crate) fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub(crate) fn into_value(self) -> T {
        self.value
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: u8) {
        self.height = height;
    }
}

/// How a node is unlinked by removal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Removal {
    /// No children; the node is cut from its parent.
    Leaf,
    /// Exactly one child, which takes over the node's slot.
    OneChild(Handle),
    /// Both children; the in-order successor's payload moves up and the successor is
    /// unlinked instead.
    TwoChildren { successor_subtree: Handle },
}

impl Removal {
    pub(crate) fn classify<T>(node: &Node<T>) -> Self {
        match (node.left, node.right) {
            (None, None) => Removal::Leaf,
            (Some(child), None) | (None, Some(child)) => Removal::OneChild(child),
            (Some(_), Some(right)) => Removal::TwoChildren {
                successor_subtree: right,
            },
        }
    }
}
