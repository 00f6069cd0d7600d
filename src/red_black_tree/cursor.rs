use crate::arena::Handle;
use crate::red_black_tree::node::Side;
use crate::red_black_tree::tree::Tree;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Position {
    BeforeFirst,
    At(Handle),
    AfterLast,
}

/// A bidirectional cursor over the entries of a `RedBlackMap<K, V>` in ascending key order.
///
/// A cursor is either before the first entry, on an entry, or after the last entry. It starts
/// before the first entry. Every movement returns `true` if the cursor ended up on an entry. The
/// cursor borrows the map, so the map cannot be modified while a cursor is alive.
///
/// # Examples
///
/// ```
/// use rb_collections::red_black_tree::RedBlackMap;
///
/// let mut map = RedBlackMap::new();
/// map.insert(2, "b");
/// map.insert(1, "a");
///
/// let mut cursor = map.cursor();
/// assert!(cursor.move_next());
/// assert_eq!((cursor.key(), cursor.value()), (&1, &"a"));
/// assert!(cursor.move_next());
/// assert_eq!(cursor.key(), &2);
/// assert!(!cursor.move_next());
/// assert!(cursor.move_prev());
/// assert_eq!(cursor.key(), &2);
/// ```
pub struct Cursor<'a, K: 'a, V: 'a> {
    tree: &'a Tree<K, V>,
    position: Position,
}

impl<'a, K: 'a, V: 'a> Cursor<'a, K, V> {
    pub(crate) fn new(tree: &'a Tree<K, V>) -> Self {
        Cursor {
            tree,
            position: Position::BeforeFirst,
        }
    }

    fn settle(&mut self, link: Option<Handle>, otherwise: Position) -> bool {
        match link {
            Some(handle) => {
                self.position = Position::At(handle);
                true
            },
            None => {
                self.position = otherwise;
                false
            },
        }
    }

    /// Moves the cursor to the entry with the smallest key. Returns `false` if the map is empty.
    pub fn move_first(&mut self) -> bool {
        let first = self.tree.root.map(|root| self.tree.min(root));
        self.settle(first, Position::BeforeFirst)
    }

    /// Moves the cursor to the entry with the largest key. Returns `false` if the map is empty.
    pub fn move_last(&mut self) -> bool {
        let last = self.tree.root.map(|root| self.tree.max(root));
        self.settle(last, Position::AfterLast)
    }

    /// Moves the cursor to the next entry. From before the first entry this moves to the first
    /// entry; from the last entry it moves past the end and returns `false`.
    pub fn move_next(&mut self) -> bool {
        match self.position {
            Position::BeforeFirst => {
                let first = self.tree.root.map(|root| self.tree.min(root));
                self.settle(first, Position::AfterLast)
            },
            Position::At(handle) => {
                let next = self.tree.step(handle, Side::Right);
                self.settle(next, Position::AfterLast)
            },
            Position::AfterLast => false,
        }
    }

    /// Moves the cursor to the previous entry. From after the last entry this moves to the last
    /// entry; from the first entry it moves before the start and returns `false`.
    pub fn move_prev(&mut self) -> bool {
        match self.position {
            Position::AfterLast => {
                let last = self.tree.root.map(|root| self.tree.max(root));
                self.settle(last, Position::BeforeFirst)
            },
            Position::At(handle) => {
                let prev = self.tree.step(handle, Side::Left);
                self.settle(prev, Position::BeforeFirst)
            },
            Position::BeforeFirst => false,
        }
    }

    /// Moves the cursor before the first entry.
    pub fn reset(&mut self) {
        self.position = Position::BeforeFirst;
    }

    /// Moves the cursor after the last entry.
    pub fn reset_to_end(&mut self) {
        self.position = Position::AfterLast;
    }

    /// Returns `true` if the cursor is on an entry.
    pub fn is_on_entry(&self) -> bool {
        match self.position {
            Position::At(_) => true,
            _ => false,
        }
    }

    /// Returns the entry under the cursor, or `None` if the cursor is before the first or after
    /// the last entry.
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        match self.position {
            Position::At(handle) => {
                let tree: &'a Tree<K, V> = self.tree;
                let node = tree.node(handle);
                Some((&node.key, &node.value))
            },
            _ => None,
        }
    }

    /// Returns the key under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is not on an entry.
    pub fn key(&self) -> &'a K {
        self.entry().expect("Expected cursor to be on an entry.").0
    }

    /// Returns the value under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is not on an entry.
    pub fn value(&self) -> &'a V {
        self.entry().expect("Expected cursor to be on an entry.").1
    }
}

impl<'a, K: 'a, V: 'a> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        Cursor {
            tree: self.tree,
            position: self.position,
        }
    }
}
