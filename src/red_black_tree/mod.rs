//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.

mod cursor;
mod map;
mod node;
mod set;
mod tree;

pub use self::cursor::Cursor;
pub use self::map::{
    RedBlackMap, RedBlackMapIntoIter, RedBlackMapIter, RedBlackMapKeys, RedBlackMapValues,
};
pub use self::set::{RedBlackSet, RedBlackSetIntoIter, RedBlackSetIter};

use std::error;
use std::fmt;
use std::result;

/// A broken red black tree invariant, as reported by `RedBlackMap::validate`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The root node is red.
    RedRoot,
    /// A red node has a red child.
    AdjacentRed,
    /// Two paths from the root to an absent child pass through different numbers of black nodes.
    BlackHeightMismatch,
    /// The in-order sequence of keys is not strictly ascending under the comparator.
    OrderViolation,
    /// A child's parent link does not point back at its parent, or the root has a parent.
    BrokenParentLink,
    /// The recorded length does not match the number of reachable nodes.
    LenMismatch { expected: usize, actual: usize },
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::RedRoot => write!(f, "root node is red"),
            Error::AdjacentRed => write!(f, "red node has a red child"),
            Error::BlackHeightMismatch => write!(f, "black height differs between paths"),
            Error::OrderViolation => write!(f, "keys are not in strictly ascending order"),
            Error::BrokenParentLink => write!(f, "parent link does not match child link"),
            Error::LenMismatch { expected, actual } => write!(
                f,
                "recorded length {} does not match {} reachable nodes",
                expected, actual,
            ),
        }
    }
}

/// Convenience `Result` type for red black tree validation.
pub type Result<T> = result::Result<T, Error>;
