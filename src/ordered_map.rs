use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use alloc::vec::Vec;
use tracing::trace;

use crate::balanced_tree::{BalancedTree, IntoIter, Iter};
use crate::comparator::{Comparator, NaturalOrder, Projected};
use crate::error::{Error, Result};
use crate::raw::{Handle, InsertResult};

mod capacity;
mod page;

pub use page::Page;

/// The comparator an [`OrderedMap`] orders its pages by: `C` applied to [`Page::key`].
pub type PageOrder<K, V, C = NaturalOrder> = Projected<Page<K, V>, K, C>;

/// An ordered map from keys to one or more values, backed by a [`BalancedTree`] of
/// [`Page`]s.
///
/// Each distinct key owns one page holding its values in insertion order.
/// [`insert`](Self::insert) overwrites whatever was stored under a key, while
/// [`insert_multi`](Self::insert_multi) appends, so the same type serves as a plain
/// dictionary and as a multimap. Single-value reads ([`at`](Self::at),
/// [`get`](Self::get), indexing) see the most recently inserted value.
///
/// Keys are ordered by the map's [`Comparator`]; iteration yields pages in ascending key
/// order.
///
/// # Examples
///
/// ```
/// use avlmap::OrderedMap;
///
/// let mut settings = OrderedMap::new();
/// settings.insert_multi("path", "/usr/bin");
/// settings.insert_multi("path", "/bin");
/// settings.insert("shell", "zsh");
///
/// assert_eq!(settings.values(&"path"), Some(&["/usr/bin", "/bin"][..]));
/// assert_eq!(settings.at(&"path"), Ok(&"/bin"));
/// assert_eq!(settings[&"shell"], "zsh");
/// assert_eq!(settings.len(), 2);
///
/// settings.insert("path", "/opt/bin");
/// assert_eq!(settings.values(&"path"), Some(&["/opt/bin"][..]));
/// assert!(settings.at(&"editor").is_err());
/// ```
pub struct OrderedMap<K, V, C = NaturalOrder> {
    tree: BalancedTree<Page<K, V>, PageOrder<K, V, C>>,
}

/// An iterator over the keys of an `OrderedMap`, in ascending order.
///
/// This `struct` is created by the [`keys`] method on [`OrderedMap`]. See its
/// documentation for more.
///
/// [`keys`]: OrderedMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, Page<K, V>>,
}

impl<K, V> OrderedMap<K, V> {
    /// Makes a new, empty `OrderedMap` ordered by [`Ord`] on the keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    /// Makes a new, empty `OrderedMap` whose keys are ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            tree: BalancedTree::with_comparator(Projected::new(Page::key, comparator)),
        }
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the total number of values across all keys.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.tree.iter().map(Page::len).sum()
    }

    /// Removes every key and value.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Gets an iterator over the keys, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::OrderedMap;
    ///
    /// let map = OrderedMap::from([(3, 'c'), (1, 'a'), (2, 'b')]);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.tree.iter() }
    }

    /// Gets an iterator over the pages, in ascending key order.
    pub fn iter(&self) -> Iter<'_, Page<K, V>> {
        self.tree.iter()
    }

    /// Returns the page with the smallest key.
    pub fn first(&self) -> Option<&Page<K, V>> {
        self.tree.min()
    }

    /// Returns the page with the largest key.
    pub fn last(&self) -> Option<&Page<K, V>> {
        self.tree.max()
    }

    /// Returns the underlying tree, e.g. to walk it with a
    /// [`Cursor`](crate::balanced_tree::Cursor).
    pub fn tree(&self) -> &BalancedTree<Page<K, V>, PageOrder<K, V, C>> {
        &self.tree
    }
}

impl<K, V, C: Comparator<K>> OrderedMap<K, V, C> {
    /// Stores `value` as the only value under `key` and returns the values it displaced,
    /// if the key was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.insert("a", 1), None);
    /// map.insert_multi("a", 2);
    /// assert_eq!(map.insert("a", 3), Some(vec![1, 2]));
    /// assert_eq!(map.values(&"a"), Some(&[3][..]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<Vec<V>> {
        let (raw, order) = self.tree.parts_mut();
        match raw.insert(Page::new(key, value), |new, existing| order.compare(new, existing)) {
            InsertResult::Inserted(handle) => {
                trace!(node = handle.to_index(), "created page");
                None
            }
            InsertResult::Occupied { handle, value: page } => Some(raw.value_mut(handle).replace_values(page).into_vec()),
        }
    }

    /// Appends `value` after any values already stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_multi(&mut self, key: K, value: V) {
        let (raw, order) = self.tree.parts_mut();
        match raw.insert(Page::new(key, value), |new, existing| order.compare(new, existing)) {
            InsertResult::Inserted(handle) => trace!(node = handle.to_index(), "created page"),
            InsertResult::Occupied { handle, value: page } => raw.value_mut(handle).append(page),
        }
    }

    /// Returns the most recently inserted value under `key`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `key` is absent. Use [`get`](Self::get) when a miss
    /// is expected.
    pub fn at(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::IndexOutOfRange)
    }

    /// Mutable counterpart of [`at`](Self::at).
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `key` is absent.
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V> {
        self.get_mut(key).ok_or(Error::IndexOutOfRange)
    }

    /// Returns the most recently inserted value under `key`, or `None`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.page(key).map(Page::value)
    }

    /// Returns a mutable reference to the most recently inserted value under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let handle = self.locate(key)?;
        let (raw, _) = self.tree.parts_mut();
        Some(raw.value_mut(handle).value_mut())
    }

    /// Returns the most recently inserted value under `key`, first inserting
    /// `V::default()` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::OrderedMap;
    ///
    /// let mut counts: OrderedMap<&str, u32> = OrderedMap::new();
    /// for word in ["to", "be", "or", "not", "to", "be"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts[&"to"], 2);
    /// assert_eq!(counts[&"not"], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (raw, order) = self.tree.parts_mut();
        let handle = match raw.find(|page| order.inner().compare(&key, page.key())) {
            Some(handle) => handle,
            None => match raw.insert(Page::new(key, V::default()), |new, existing| order.compare(new, existing)) {
                InsertResult::Inserted(handle) | InsertResult::Occupied { handle, .. } => {
                    trace!(node = handle.to_index(), "created page");
                    handle
                }
            },
        };
        raw.value_mut(handle).value_mut()
    }

    /// Returns every value under `key` in insertion order, or `None` if the key is
    /// absent.
    pub fn values(&self, key: &K) -> Option<&[V]> {
        self.page(key).map(Page::values)
    }

    /// Returns the page for `key`.
    pub fn page(&self, key: &K) -> Option<&Page<K, V>> {
        let order = self.tree.comparator();
        self.tree.get_by(|page| order.inner().compare(key, page.key()))
    }

    /// Returns `true` if `key` has at least one value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// Removes `key` and every value under it.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, key: &K) -> Option<Vec<V>> {
        let handle = self.locate(key)?;
        let (raw, _) = self.tree.parts_mut();
        trace!(node = handle.to_index(), "removed page");
        Some(raw.remove(handle).into_parts().1)
    }

    /// Removes every value equal to `value` stored under `key` and returns how many were
    /// removed. A key left without values is removed as well.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlmap::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert_multi(1, "x");
    /// map.insert_multi(1, "y");
    /// assert_eq!(map.remove_value(&1, &"x"), 1);
    /// assert_eq!(map.values(&1), Some(&["y"][..]));
    /// assert_eq!(map.remove_value(&1, &"y"), 1);
    /// assert!(!map.contains_key(&1));
    /// ```
    pub fn remove_value(&mut self, key: &K, value: &V) -> usize
    where
        V: PartialEq,
    {
        let Some(handle) = self.locate(key) else { return 0 };
        let (raw, _) = self.tree.parts_mut();
        let removed = raw.value_mut(handle).remove_value(value);
        if raw.value(handle).is_drained() {
            trace!(node = handle.to_index(), "removed page");
            raw.remove(handle);
        }
        removed
    }

    /// Links in a whole page; `false` if its key is already present.
    #[cfg(feature = "serde")]
    pub(crate) fn insert_page(&mut self, page: Page<K, V>) -> bool {
        let (raw, order) = self.tree.parts_mut();
        match raw.insert(page, |new, existing| order.compare(new, existing)) {
            InsertResult::Inserted(handle) => {
                trace!(node = handle.to_index(), "created page");
                true
            }
            InsertResult::Occupied { .. } => false,
        }
    }

    fn locate(&self, key: &K) -> Option<Handle> {
        let order = self.tree.comparator();
        self.tree.raw().find(|page| order.inner().compare(key, page.key()))
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for OrderedMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for OrderedMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<K: Eq, V: Eq, C> Eq for OrderedMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OrderedMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|page| (page.key(), page.values()))).finish()
    }
}

impl<K, V, C: Default> Default for OrderedMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C: Comparator<K>> Index<&K> for OrderedMap<K, V, C> {
    type Output = V;

    /// Returns the most recently inserted value under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for OrderedMap<K, V, C> {
    /// Inserts every pair with overwrite semantics; see
    /// [`insert_multi`](OrderedMap::insert_multi) for appending.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for OrderedMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C> {
    type Item = &'a Page<K, V>;
    type IntoIter = Iter<'a, Page<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for OrderedMap<K, V, C> {
    type Item = Page<K, V>;
    type IntoIter = IntoIter<Page<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(Page::key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a K> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Page::key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::ReverseOrder;
    use crate::error::CursorFault;
    use alloc::string::{String, ToString};
    use alloc::vec;

    #[test]
    fn overwrite_then_multi() {
        let mut map = OrderedMap::new();
        map.insert_multi(1, "a");
        map.insert_multi(1, "b");
        assert_eq!(map.values(&1), Some(&["a", "b"][..]));
        assert_eq!(map.at(&1), Ok(&"b"));

        assert_eq!(map.insert(1, "c"), Some(vec!["a", "b"]));
        assert_eq!(map.values(&1), Some(&["c"][..]));
        assert_eq!(map.len(), 1);
        assert_eq!(map.value_count(), 1);
    }

    #[test]
    fn misses() {
        let mut map: OrderedMap<i32, String> = OrderedMap::new();
        assert_eq!(map.at(&1), Err(Error::IndexOutOfRange));
        assert_eq!(map.at_mut(&1), Err(Error::IndexOutOfRange));
        assert_eq!(map.get(&1), None);
        assert_eq!(map.values(&1), None);
        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove_value(&1, &String::new()), 0);
        assert!(map.first().is_none());
    }

    #[test]
    fn default_on_index() {
        let mut map: OrderedMap<&str, String> = OrderedMap::new();
        assert!(map.get_or_insert_default("k").is_empty());
        assert!(map.contains_key(&"k"));

        map.get_or_insert_default("k").push_str("hi");
        assert_eq!(map[&"k"], "hi");
        assert_eq!(map.len(), 1);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_missing_panics() {
        let map: OrderedMap<i32, i32> = OrderedMap::new();
        let _ = map[&0];
    }

    #[test]
    fn mutate_in_place() {
        let mut map = OrderedMap::from([(1, 10), (2, 20)]);
        let cursor = map.tree().begin();
        *map.get_mut(&1).unwrap() += 1;
        *map.at_mut(&2).unwrap() += 2;
        map.insert(2, 0);
        assert_eq!(map.get(&1), Some(&11));
        assert_eq!(map.get(&2), Some(&0));
        // None of the above added or removed a key.
        assert_eq!(cursor.get(map.tree()).map(|page| *page.key()), Ok(1));

        map.insert(3, 30);
        assert_eq!(cursor.get(map.tree()).err(), Some(Error::InvalidIterator(CursorFault::Stale)));
    }

    #[test]
    fn remove_value_drops_empty_page() {
        let mut map = OrderedMap::new();
        map.insert_multi("k", 1);
        map.insert_multi("k", 2);
        map.insert_multi("k", 1);
        assert_eq!(map.value_count(), 3);
        assert_eq!(map.remove_value(&"k", &1), 2);
        assert_eq!(map.values(&"k"), Some(&[2][..]));
        assert_eq!(map.remove_value(&"k", &2), 1);
        assert!(map.is_empty());
    }

    #[test]
    fn keys_follow_comparator() {
        let mut map = OrderedMap::with_comparator(ReverseOrder(NaturalOrder));
        map.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(map.keys().len(), 3);
        assert_eq!(map.keys().next_back(), Some(&1));
        assert_eq!(map.first().map(Page::value), Some(&'c'));
        assert_eq!(map.last().map(Page::value), Some(&'a'));
    }

    #[test]
    fn debug_and_equality() {
        let mut a = OrderedMap::new();
        a.insert_multi(2, 'x');
        a.insert_multi(2, 'y');
        a.insert(1, 'z');
        assert_eq!(alloc::format!("{a:?}"), "{1: ['z'], 2: ['x', 'y']}");

        let b = a.clone();
        assert_eq!(a, b);
        a.insert(2, 'x');
        assert_ne!(a, b);
    }

    #[test]
    fn owned_iteration_yields_pages() {
        let map = OrderedMap::from([(2, "b"), (1, "a")]);
        let parts: Vec<_> = map.into_iter().map(Page::into_parts).collect();
        assert_eq!(parts, vec![(1, vec!["a"]), (2, vec!["b"])]);
    }

    #[test]
    fn clear_empties() {
        let mut map = OrderedMap::from([(1, 1), (2, 2)]);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.keys().count(), 0);
        assert_eq!(map.tree().shape().to_string(), "");
    }

    #[test]
    fn shape_renders_pages() {
        let mut map = OrderedMap::new();
        for key in [1, 2, 3] {
            map.insert(key, key * 10);
        }
        map.insert_multi(2, 21);
        assert_eq!(map.tree().shape().to_string(), "(2:[20,21],(1:[10],,),(3:[30],,))");
    }
}
