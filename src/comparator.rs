//! Pluggable orderings for [`BalancedTree`](crate::BalancedTree) and
//! [`OrderedMap`](crate::OrderedMap).
//!
//! A tree is generic over its comparator, so the common cases compile down to a direct
//! `Ord::cmp` call. Comparators must implement a total order: returning inconsistent
//! results is a logic error that can corrupt the tree's ordering (but never memory), and
//! a comparator that panics unwinds straight out of the tree operation that called it.
//!
//! # Examples
//!
//! ```
//! use avlmap::BalancedTree;
//! use avlmap::comparator::{NaturalOrder, ReverseOrder};
//!
//! let mut tree = BalancedTree::with_comparator(ReverseOrder(NaturalOrder));
//! for i in 1..=5 {
//!     tree.add(i).unwrap();
//! }
//! assert_eq!(tree.to_sorted_vec(), [5, 4, 3, 2, 1]);
//! ```

use core::cmp::Ordering;
use core::fmt;

/// A total order over `T`.
pub trait Comparator<T: ?Sized> {
    /// Compares two elements. `Equal` means the tree treats them as the same key.
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering;
}

/// The natural order given by [`Ord`]. This is the default comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Inverts another comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ReverseOrder<C = NaturalOrder>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for ReverseOrder<C> {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        self.0.compare(rhs, lhs)
    }
}

/// Adapts a closure `Fn(&T, &T) -> Ordering` into a [`Comparator`].
///
/// ```
/// use avlmap::BalancedTree;
/// use avlmap::comparator::FnComparator;
///
/// // Case-insensitive ordering.
/// let mut tree = BalancedTree::with_comparator(FnComparator::new(|a: &&str, b: &&str| {
///     a.to_lowercase().cmp(&b.to_lowercase())
/// }));
/// tree.add("beta").unwrap();
/// tree.add("Alpha").unwrap();
/// assert!(tree.contains(&"ALPHA"));
/// ```
#[derive(Clone, Copy)]
pub struct FnComparator<F>(F);

impl<F> FnComparator<F> {
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T: ?Sized, F> Comparator<T> for FnComparator<F>
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        (self.0)(lhs, rhs)
    }
}

impl<F> fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparator")
    }
}

/// Builds a comparator from a C-style three-way function returning a negative number,
/// zero, or a positive number.
///
/// ```
/// use avlmap::BalancedTree;
/// use avlmap::comparator::from_sign_fn;
///
/// fn backwards(lhs: &i32, rhs: &i32) -> i32 {
///     rhs - lhs
/// }
///
/// let mut tree = BalancedTree::with_comparator(from_sign_fn(backwards));
/// tree.extend([1, 2, 3]);
/// assert_eq!(tree.to_sorted_vec(), [3, 2, 1]);
/// ```
pub fn from_sign_fn<T: ?Sized>(f: fn(&T, &T) -> i32) -> FnComparator<impl Fn(&T, &T) -> Ordering + Copy> {
    FnComparator(move |lhs: &T, rhs: &T| f(lhs, rhs).cmp(&0))
}

/// Orders elements by a projected key, compared with an inner comparator.
///
/// This is how a tree of records can be indexed by one field of each record. The
/// projection is a plain function pointer so the comparator stays `Copy`.
///
/// ```
/// use avlmap::BalancedTree;
/// use avlmap::comparator::{NaturalOrder, Projected};
///
/// struct User {
///     id: u32,
///     name: &'static str,
/// }
///
/// fn id(user: &User) -> &u32 {
///     &user.id
/// }
///
/// let mut users = BalancedTree::with_comparator(Projected::new(id, NaturalOrder));
/// users.add(User { id: 7, name: "grace" }).unwrap();
/// users.add(User { id: 3, name: "ada" }).unwrap();
///
/// assert_eq!(users.min().map(|u| u.name), Some("ada"));
/// assert_eq!(users.get_by(|u| 7.cmp(&u.id)).map(|u| u.name), Some("grace"));
/// ```
pub struct Projected<T: ?Sized, K: ?Sized, C = NaturalOrder> {
    project: fn(&T) -> &K,
    inner: C,
}

impl<T: ?Sized, K: ?Sized, C> Projected<T, K, C> {
    /// Compares `project(element)` with `inner`.
    pub const fn new(project: fn(&T) -> &K, inner: C) -> Self {
        Self { project, inner }
    }

    /// Returns the projected key of `element`.
    #[inline]
    pub fn key_of<'a>(&self, element: &'a T) -> &'a K {
        (self.project)(element)
    }

    /// Returns the comparator applied to projected keys.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<T: ?Sized, K: ?Sized, C: Comparator<K>> Comparator<T> for Projected<T, K, C> {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        self.inner.compare(self.key_of(lhs), self.key_of(rhs))
    }
}

impl<T: ?Sized, K: ?Sized, C: Clone> Clone for Projected<T, K, C> {
    fn clone(&self) -> Self {
        Self {
            project: self.project,
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized, K: ?Sized, C: Copy> Copy for Projected<T, K, C> {}

impl<T: ?Sized, K: ?Sized, C: fmt::Debug> fmt::Debug for Projected<T, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projected").field("inner", &self.inner).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn sorted_by<C: Comparator<i32>>(cmp: &C, mut values: Vec<i32>) -> Vec<i32> {
        values.sort_by(|a, b| cmp.compare(a, b));
        values
    }

    #[test]
    fn natural_and_reverse() {
        assert_eq!(sorted_by(&NaturalOrder, vec![3, 1, 2]), vec![1, 2, 3]);
        assert_eq!(sorted_by(&ReverseOrder(NaturalOrder), vec![3, 1, 2]), vec![3, 2, 1]);
        assert_eq!(sorted_by(&ReverseOrder(ReverseOrder(NaturalOrder)), vec![3, 1, 2]), vec![1, 2, 3]);
    }

    #[test]
    fn closure_comparator() {
        let by_abs = FnComparator::new(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
        assert_eq!(sorted_by(&by_abs, vec![-3, 1, -2]), vec![1, -2, -3]);
        assert_eq!(by_abs.compare(&-4, &4), Ordering::Equal);
    }

    #[test]
    fn sign_function() {
        let cmp = from_sign_fn(|a: &i32, b: &i32| if a < b { -7 } else { i32::from(a > b) * 42 });
        assert_eq!(cmp.compare(&1, &2), Ordering::Less);
        assert_eq!(cmp.compare(&2, &2), Ordering::Equal);
        assert_eq!(cmp.compare(&3, &2), Ordering::Greater);
    }

    #[test]
    fn projection_ignores_other_fields() {
        fn first(pair: &(u8, char)) -> &u8 {
            &pair.0
        }

        let cmp = Projected::new(first, NaturalOrder);
        assert_eq!(cmp.compare(&(1, 'z'), &(2, 'a')), Ordering::Less);
        assert_eq!(cmp.compare(&(2, 'z'), &(2, 'a')), Ordering::Equal);
        assert_eq!(*cmp.key_of(&(9, 'q')), 9);
    }
}
