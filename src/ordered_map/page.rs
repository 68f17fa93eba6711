use core::fmt;

use smallvec::SmallVec;

/// One key of an [`OrderedMap`](crate::OrderedMap) together with every value stored
/// under it, oldest first.
///
/// A page is never empty: the map drops it together with its last value. Most keys hold
/// a single value, which lives inline without a separate allocation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Page<K, V> {
    key: K,
    values: SmallVec<[V; 1]>,
}

impl<K, V> Page<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        let mut values = SmallVec::new();
        values.push(value);
        Self { key, values }
    }

    /// Builds a page from a key and its values; `None` if `values` is empty.
    #[cfg(feature = "serde")]
    pub(crate) fn from_parts(key: K, values: alloc::vec::Vec<V>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            key,
            values: SmallVec::from_vec(values),
        })
    }

    /// The page's key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The most recently inserted value.
    #[inline]
    pub fn value(&self) -> &V {
        self.values.last().expect("`Page::value()` - page is empty!")
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        self.values.last_mut().expect("`Page::value_mut()` - page is empty!")
    }

    /// Every value under the key, in insertion order.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Number of values under the key; at least 1.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Splits the page into its key and values.
    pub fn into_parts(self) -> (K, alloc::vec::Vec<V>) {
        (self.key, self.values.into_vec())
    }

    /// Swaps in the values of `other`, a fresh page for the same key, and returns the old
    /// ones.
    pub(crate) fn replace_values(&mut self, other: Self) -> SmallVec<[V; 1]> {
        core::mem::replace(&mut self.values, other.values)
    }

    /// Appends the values of `other`, a fresh page for the same key.
    pub(crate) fn append(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Drops every value equal to `value`; returns how many went. May leave the page empty,
    /// in which case the caller must unlink it.
    pub(crate) fn remove_value(&mut self, value: &V) -> usize
    where
        V: PartialEq,
    {
        let before = self.values.len();
        self.values.retain(|stored| stored != value);
        before - self.values.len()
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Page<K, V> {
    /// Renders the page as `key:[v1,v2]`, oldest value first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:[", self.key)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn last_value_wins() {
        let mut page = Page::new("k", 1);
        page.append(Page::new("k", 2));
        page.append(Page::new("k", 3));
        assert_eq!(page.values(), &[1, 2, 3]);
        assert_eq!(*page.value(), 3);
        assert_eq!(page.len(), 3);

        *page.value_mut() = 30;
        let old = page.replace_values(Page::new("k", 9));
        assert_eq!(old.into_vec(), vec![1, 2, 30]);
        assert_eq!(page.into_parts(), ("k", vec![9]));
    }

    #[test]
    fn remove_every_equal_value() {
        let mut page = Page::new(0, 'a');
        page.append(Page::new(0, 'b'));
        page.append(Page::new(0, 'a'));
        assert_eq!(page.remove_value(&'a'), 2);
        assert_eq!(page.values(), &['b']);
        assert_eq!(page.remove_value(&'z'), 0);
        assert_eq!(page.remove_value(&'b'), 1);
        assert!(page.is_drained());
    }

    #[test]
    fn displays_key_and_values() {
        let mut page = Page::new(7, 'x');
        assert_eq!(page.to_string(), "7:[x]");
        page.append(Page::new(7, 'y'));
        assert_eq!(page.to_string(), "7:[x,y]");
    }
}
