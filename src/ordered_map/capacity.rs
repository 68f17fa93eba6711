use super::{OrderedMap, Page};
use crate::balanced_tree::BalancedTree;
use crate::comparator::{NaturalOrder, Projected};

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map with room for at least `capacity` keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::OrderedMap;
    ///
    /// let map: OrderedMap<u32, &str> = OrderedMap::with_capacity(8);
    /// assert!(map.capacity() >= 8);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap {
            tree: BalancedTree::with_capacity_and_comparator(capacity, Projected::new(Page::key, NaturalOrder)),
        }
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Returns the number of keys the map can hold without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }
}
