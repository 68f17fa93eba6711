//! Error types shared by [`BalancedTree`](crate::BalancedTree) and
//! [`OrderedMap`](crate::OrderedMap).
//!
//! Lookups that simply miss are not errors; they return `None`. The variants here are
//! reserved for calls whose contract was broken by the caller.

use thiserror::Error;

/// Result alias using the crate [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by tree and map operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
#[non_exhaustive]
pub enum Error {
    /// A keyed access (e.g. [`OrderedMap::at`](crate::OrderedMap::at)) named a key that
    /// is not present.
    #[error("index out of range: no entry for the requested key")]
    IndexOutOfRange,

    /// [`BalancedTree::add`](crate::BalancedTree::add) was given an element equal to one
    /// already stored while the tree rejects duplicates.
    #[error("duplicate key rejected by the tree's duplicate policy")]
    DuplicateKey,

    /// A [`Cursor`](crate::balanced_tree::Cursor) could not be used.
    #[error("invalid iterator: {0}")]
    InvalidIterator(#[from] CursorFault),
}

/// Why a cursor was refused.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum CursorFault {
    /// The tree changed shape after the cursor was created.
    #[error("the tree was structurally modified after the cursor was created")]
    Stale,

    /// The cursor sits on the pre-begin or end sentinel and has no element, or was
    /// stepped past the sentinel it sits on.
    #[error("the cursor is positioned on a sentinel")]
    Sentinel,

    /// The cursor refers to a node this tree does not hold.
    #[error("the cursor does not refer to a node of this tree")]
    Detached,
}
