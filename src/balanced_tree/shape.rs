use core::fmt;

use super::{BalancedTree, Cursor};

/// Renders the physical layout of a [`BalancedTree`].
///
/// Created by [`BalancedTree::shape`]. Every node prints as `(value,left,right)`, with an
/// absent subtree left blank, so a root `2` with leaf children `1` and `3` prints as
/// `(2,(1,,),(3,,))`. The walk uses a root [`Cursor`] and its structural moves only.
pub struct Shape<'a, T, C> {
    tree: &'a BalancedTree<T, C>,
}

impl<'a, T, C> Shape<'a, T, C> {
    pub(super) fn new(tree: &'a BalancedTree<T, C>) -> Self {
        Self { tree }
    }

    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, cursor: &mut Cursor) -> fmt::Result
    where
        T: fmt::Display,
    {
        let value = cursor.get(self.tree).map_err(|_| fmt::Error)?;
        write!(f, "({value},")?;

        if cursor.descend_left(self.tree).map_err(|_| fmt::Error)? {
            self.write_subtree(f, cursor)?;
            cursor.ascend(self.tree).map_err(|_| fmt::Error)?;
        }
        f.write_str(",")?;

        if cursor.descend_right(self.tree).map_err(|_| fmt::Error)? {
            self.write_subtree(f, cursor)?;
            cursor.ascend(self.tree).map_err(|_| fmt::Error)?;
        }
        f.write_str(")")
    }
}

impl<T: fmt::Display, C> fmt::Display for Shape<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.root() {
            Some(mut cursor) => self.write_subtree(f, &mut cursor),
            None => Ok(()),
        }
    }
}

impl<T: fmt::Display, C> fmt::Debug for Shape<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::BalancedTree;
    use alloc::string::ToString;

    #[test]
    fn removal_shapes() {
        let mut tree = BalancedTree::from([5, 10, 15, 20, 25, 2, 1]);
        assert_eq!(tree.shape().to_string(), "(10,(2,(1,,),(5,,)),(20,(15,,),(25,,)))");

        // Two children: the successor 15 takes the root's place.
        tree.remove(&10);
        assert_eq!(tree.shape().to_string(), "(15,(2,(1,,),(5,,)),(20,,(25,,)))");

        // Leaf removal that leaves the right side two levels short.
        tree.remove(&25);
        assert_eq!(tree.shape().to_string(), "(15,(2,(1,,),(5,,)),(20,,))");
        tree.remove(&20);
        assert_eq!(tree.shape().to_string(), "(2,(1,,),(15,(5,,),))");
    }

    #[test]
    fn renders_non_numeric_values() {
        let tree = BalancedTree::from(["b", "a", "c"]);
        assert_eq!(tree.shape().to_string(), "(b,(a,,),(c,,))");
        assert_eq!(alloc::format!("{:?}", tree.shape()), "(b,(a,,),(c,,))");
    }
}
