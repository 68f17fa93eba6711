//! AVL-balanced ordered collections for Rust.
//!
//! This crate provides two collections:
//!
//! - [`BalancedTree`] - a self-balancing binary search tree with a pluggable
//!   [`Comparator`](comparator::Comparator), bidirectional [`Cursor`]s and structural
//!   navigation for diagnostics
//! - [`OrderedMap`] - an ordered dictionary on top of it that stores one or more values per
//!   key, with overwrite ([`insert`](OrderedMap::insert)) and append
//!   ([`insert_multi`](OrderedMap::insert_multi)) semantics
//!
//! # Example
//!
//! ```
//! use avlmap::{BalancedTree, OrderedMap};
//!
//! let mut tree = BalancedTree::new();
//! for i in [5, 10, 15, 20, 25] {
//!     tree.add(i)?;
//! }
//! assert_eq!(tree.min(), Some(&5));
//! assert_eq!(tree.shape().to_string(), "(10,(5,,),(20,(15,,),(25,,)))");
//!
//! // Cursors step in order and wrap at the sentinels.
//! let mut cursor = tree.end();
//! cursor.move_prev(&tree)?;
//! assert_eq!(cursor.get(&tree)?, &25);
//!
//! let mut index = OrderedMap::new();
//! index.insert_multi("rust", 1);
//! index.insert_multi("rust", 7);
//! index.insert("avl", 3);
//! assert_eq!(index.values(&"rust"), Some(&[1, 7][..]));
//! assert_eq!(index.keys().copied().collect::<Vec<_>>(), ["avl", "rust"]);
//! # Ok::<(), avlmap::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **No `unsafe`** - Nodes live in an arena and link to each other by index
//! - **Guaranteed O(log n)** - Height never exceeds about 1.44 log2(n + 2)
//! - **Checked cursors** - A cursor used after the tree changed shape reports
//!   [`Error::InvalidIterator`] instead of reading stale nodes
//! - **`serde`** (optional) - Serialize trees as sequences and maps as key to value-list maps
//!
//! # Implementation
//!
//! Every node caches its height, from which the balance factor is derived. Insertion
//! walks back up from the new leaf and performs at most one single or double rotation;
//! removal replaces a node that has two children by its in-order successor and then
//! rebalances every ancestor up to the root.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;
#[cfg(feature = "serde")]
mod serde;

pub mod balanced_tree;
pub mod comparator;
pub mod ordered_map;

pub use balanced_tree::{BalancedTree, Cursor, DuplicatePolicy};
pub use error::{CursorFault, Error, Result};
pub use ordered_map::{OrderedMap, Page};
