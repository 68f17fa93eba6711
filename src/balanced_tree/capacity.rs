use super::{BalancedTree, DuplicatePolicy};
use crate::comparator::NaturalOrder;
use crate::raw::RawTree;

impl<T> BalancedTree<T> {
    /// Creates an empty tree with room for at least `capacity` nodes before the arena
    /// reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::BalancedTree;
    ///
    /// let tree: BalancedTree<i32> = BalancedTree::with_capacity(16);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<T, C> BalancedTree<T, C> {
    /// Creates an empty tree ordered by `comparator` with room for at least `capacity`
    /// nodes.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        BalancedTree {
            raw: RawTree::with_capacity(capacity),
            comparator,
            policy: DuplicatePolicy::Reject,
        }
    }

    /// Returns the number of nodes the tree can hold without reallocating.
    ///
    /// Slots freed by removal are reused before the arena grows.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
