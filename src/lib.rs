//! An ordered map and set backed by a red black tree.
//!
//! Nodes are allocated in an [`Arena`](arena/struct.Arena.html) and link to their children and
//! their parent by handle, which lets cursors walk the tree in either direction without any
//! auxiliary stack.
//!
//! # Examples
//!
//! ```
//! use rb_collections::red_black_tree::RedBlackMap;
//! use rb_collections::Enumerable;
//!
//! let mut map = RedBlackMap::new();
//! map.insert(3, "c");
//! map.insert(1, "a");
//! map.insert(2, "b");
//!
//! assert_eq!(map.keys().collect::<Vec<_>>(), vec![&1, &2, &3]);
//! assert!(map.all(|key, _| *key > 0));
//!
//! let mut cursor = map.cursor();
//! assert!(cursor.move_last());
//! assert_eq!(cursor.value(), &"c");
//! ```
#![cfg_attr(feature = "clippy", feature(plugin))]
#![cfg_attr(feature = "clippy", plugin(clippy))]

pub mod arena;
mod enumerable;
pub mod red_black_tree;

pub use crate::enumerable::Enumerable;
pub use compare::{natural, Compare, Natural};
