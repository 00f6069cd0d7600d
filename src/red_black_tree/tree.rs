use crate::arena::{Arena, Handle};
use crate::red_black_tree::node::{Color, Link, Node, Side};
use crate::red_black_tree::{Error, Result};
use compare::Compare;
use log::{debug, trace};
use std::cmp::Ordering;
use std::mem;

/// The arena-backed red black tree shared by `RedBlackMap` and `RedBlackSet`.
///
/// The comparator is not stored here; every operation that orders keys receives it from the
/// owning container.
#[derive(Clone)]
pub struct Tree<K, V> {
    arena: Arena<Node<K, V>>,
    pub root: Link,
    pub len: usize,
}

impl<K, V> Tree<K, V> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: Arena::new(chunk_size),
            root: None,
            len: 0,
        }
    }

    pub fn node(&self, handle: Handle) -> &Node<K, V> {
        &self.arena[handle]
    }

    pub fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        &mut self.arena[handle]
    }

    // absent links count as black
    fn color(&self, link: Link) -> Color {
        link.map_or(Color::Black, |handle| self.arena[handle].color)
    }

    fn set_color(&mut self, handle: Handle, color: Color) {
        self.arena[handle].color = color;
    }

    fn parent(&self, handle: Handle) -> Link {
        self.arena[handle].parent
    }

    fn child(&self, handle: Handle, side: Side) -> Link {
        self.arena[handle].child(side)
    }

    // precondition: `handle` has a parent
    fn side(&self, handle: Handle) -> Side {
        let parent = self.parent(handle).expect("Expected node to have a parent.");
        if self.arena[parent].left == Some(handle) {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn lookup<C>(&self, cmp: &C, key: &K) -> Link
    where
        C: Compare<K>,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match cmp.compare(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Inserts a key-value pair. Returns the previous value if the key was already present, in
    /// which case the stored key is kept and the shape of the tree does not change.
    pub fn insert<C>(&mut self, cmp: &C, key: K, value: V) -> Option<V>
    where
        C: Compare<K>,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &mut self.arena[handle];
            side = match cmp.compare(&key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
            };
            parent = Some(handle);
            curr = node.child(side);
        }

        let handle = self.arena.insert(Node::new(key, value, parent));
        match parent {
            Some(parent) => self.arena[parent].set_child(side, Some(handle)),
            None => self.root = Some(handle),
        }
        self.len += 1;
        self.insert_fixup(handle);
        None
    }

    /// Removes a key and returns its entry, or `None` if the key is absent.
    pub fn remove<C>(&mut self, cmp: &C, key: &K) -> Option<(K, V)>
    where
        C: Compare<K>,
    {
        let mut handle = self.lookup(cmp, key)?;

        if let (Some(left), Some(_)) = (self.arena[handle].left, self.arena[handle].right) {
            let pred = self.max(left);
            let (target, source) = self
                .arena
                .get_pair_mut(handle, pred)
                .expect("Expected predecessor to be a distinct live node.");
            mem::swap(&mut target.key, &mut source.key);
            mem::swap(&mut target.value, &mut source.value);
            handle = pred;
        }

        let child = {
            let node = &self.arena[handle];
            node.left.or(node.right)
        };
        if self.arena[handle].color == Color::Black {
            self.remove_fixup(handle);
        }
        self.replace(handle, child);
        if self.parent(handle).is_none() {
            if let Some(child) = child {
                self.set_color(child, Color::Black);
            }
        }

        self.len -= 1;
        let Node { key, value, .. } = self.arena.remove(handle);
        Some((key, value))
    }

    pub fn clear(&mut self) {
        if self.len > 0 {
            debug!("Clearing red black tree with {} nodes.", self.len);
        }
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    pub fn min(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.arena[handle].left {
            handle = left;
        }
        handle
    }

    pub fn max(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.arena[handle].right {
            handle = right;
        }
        handle
    }

    /// Returns the in-order neighbour of `handle` on the given side: `Side::Right` yields the
    /// successor and `Side::Left` the predecessor.
    pub fn step(&self, handle: Handle, side: Side) -> Link {
        if let Some(child) = self.child(handle, side) {
            return Some(match side {
                Side::Left => self.max(child),
                Side::Right => self.min(child),
            });
        }
        let mut curr = handle;
        while let Some(parent) = self.parent(curr) {
            if self.child(parent, side.opposite()) == Some(curr) {
                return Some(parent);
            }
            curr = parent;
        }
        None
    }

    pub fn floor<C>(&self, cmp: &C, key: &K) -> Link
    where
        C: Compare<K>,
    {
        let mut best = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match cmp.compare(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => {
                    best = Some(handle);
                    node.right
                },
                Ordering::Equal => return Some(handle),
            };
        }
        best
    }

    pub fn ceil<C>(&self, cmp: &C, key: &K) -> Link
    where
        C: Compare<K>,
    {
        let mut best = None;
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match cmp.compare(key, &node.key) {
                Ordering::Less => {
                    best = Some(handle);
                    node.left
                },
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        best
    }

    /// Returns the handles of every node in ascending key order.
    pub fn in_order(&self) -> Vec<Handle> {
        let mut handles = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut curr = self.root;
        loop {
            while let Some(handle) = curr {
                stack.push(handle);
                curr = self.arena[handle].left;
            }
            match stack.pop() {
                Some(handle) => {
                    handles.push(handle);
                    curr = self.arena[handle].right;
                },
                None => return handles,
            }
        }
    }

    /// Consumes the tree and returns its nodes' entries in ascending key order.
    pub fn into_entries(mut self) -> Vec<(K, V)> {
        self.in_order()
            .into_iter()
            .map(|handle| {
                let Node { key, value, .. } = self.arena.remove(handle);
                (key, value)
            })
            .collect()
    }

    // Puts `new` where `old` hangs from its parent (or at the root). `old` keeps its own links.
    fn replace(&mut self, old: Handle, new: Link) {
        let parent = self.parent(old);
        match parent {
            Some(parent) => {
                let side = self.side(old);
                self.arena[parent].set_child(side, new);
            },
            None => self.root = new,
        }
        if let Some(new) = new {
            self.arena[new].parent = parent;
        }
    }

    // Rotates `handle` down towards `side`; its child on the other side takes its place.
    fn rotate(&mut self, handle: Handle, side: Side) {
        let pivot = self
            .child(handle, side.opposite())
            .expect("Expected pivot child to be `Some`.");
        self.replace(handle, Some(pivot));

        let inner = self.child(pivot, side);
        self.arena[handle].set_child(side.opposite(), inner);
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(handle);
        }

        self.arena[pivot].set_child(side, Some(handle));
        self.arena[handle].parent = Some(pivot);
    }

    fn insert_fixup(&mut self, mut handle: Handle) {
        loop {
            let parent = match self.parent(handle) {
                Some(parent) => parent,
                None => {
                    self.set_color(handle, Color::Black);
                    return;
                },
            };
            if self.arena[parent].color == Color::Black {
                return;
            }

            // a red parent is never the root
            let grandparent = self
                .parent(parent)
                .expect("Expected red node to have a parent.");
            let parent_side = self.side(parent);
            let uncle = self.child(grandparent, parent_side.opposite());

            if let Some(uncle) = uncle.filter(|&uncle| self.arena[uncle].color == Color::Red) {
                trace!("Insert fixup: pushing red violation up past a red uncle.");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                handle = grandparent;
                continue;
            }

            if self.side(handle) != parent_side {
                trace!("Insert fixup: rotating inner grandchild outward.");
                self.rotate(parent, parent_side);
                handle = parent;
            }

            trace!("Insert fixup: rotating grandparent.");
            let parent = self.parent(handle).expect("Expected node to have a parent.");
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, parent_side.opposite());
            return;
        }
    }

    // Restores the black height around `handle`, a black node that is about to be spliced out.
    fn remove_fixup(&mut self, mut handle: Handle) {
        loop {
            let parent = match self.parent(handle) {
                Some(parent) => parent,
                None => return,
            };
            let side = self.side(handle);
            let mut sibling = self
                .child(parent, side.opposite())
                .expect("Expected black non-root node to have a sibling.");

            if self.arena[sibling].color == Color::Red {
                trace!("Remove fixup: rotating a red sibling above the parent.");
                self.set_color(parent, Color::Red);
                self.set_color(sibling, Color::Black);
                self.rotate(parent, side);
                sibling = self
                    .child(parent, side.opposite())
                    .expect("Expected black non-root node to have a sibling.");
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.opposite());
            if self.color(near) == Color::Black && self.color(far) == Color::Black {
                self.set_color(sibling, Color::Red);
                if self.arena[parent].color == Color::Black {
                    trace!("Remove fixup: pushing black deficiency up to the parent.");
                    handle = parent;
                    continue;
                }
                self.set_color(parent, Color::Black);
                return;
            }

            if self.color(far) == Color::Black {
                trace!("Remove fixup: rotating the red near nephew outward.");
                let near = near.expect("Expected red near nephew to be `Some`.");
                self.set_color(sibling, Color::Red);
                self.set_color(near, Color::Black);
                self.rotate(sibling, side.opposite());
                sibling = near;
            }

            trace!("Remove fixup: rotating the parent towards the deficient side.");
            let parent_color = self.arena[parent].color;
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            if let Some(far) = self.child(sibling, side.opposite()) {
                self.set_color(far, Color::Black);
            }
            self.rotate(parent, side);
            return;
        }
    }

    /// Checks every structural invariant of the tree and reports the first one that is broken.
    pub fn validate<C>(&self, cmp: &C) -> Result<()>
    where
        C: Compare<K>,
    {
        let root = match self.root {
            Some(root) => root,
            None if self.len == 0 && self.arena.is_empty() => return Ok(()),
            None => {
                return Err(Error::LenMismatch {
                    expected: self.len,
                    actual: 0,
                })
            },
        };
        if self.arena[root].parent.is_some() {
            return Err(Error::BrokenParentLink);
        }
        if self.arena[root].color == Color::Red {
            return Err(Error::RedRoot);
        }

        let mut count = 0;
        let mut black_height = None;
        let mut stack = vec![(root, 0)];
        while let Some((handle, blacks_above)) = stack.pop() {
            count += 1;
            let node = &self.arena[handle];
            let blacks = match node.color {
                Color::Black => blacks_above + 1,
                Color::Red => blacks_above,
            };

            for &side in &[Side::Left, Side::Right] {
                match node.child(side) {
                    Some(child) => {
                        let child_node = &self.arena[child];
                        if child_node.parent != Some(handle) {
                            return Err(Error::BrokenParentLink);
                        }
                        if node.color == Color::Red && child_node.color == Color::Red {
                            return Err(Error::AdjacentRed);
                        }
                        stack.push((child, blacks));
                    },
                    None => match black_height {
                        None => black_height = Some(blacks),
                        Some(height) if height != blacks => {
                            return Err(Error::BlackHeightMismatch)
                        },
                        Some(_) => {},
                    },
                }
            }
        }

        if count != self.len || self.arena.len() != self.len {
            return Err(Error::LenMismatch {
                expected: self.len,
                actual: count,
            });
        }

        let handles = self.in_order();
        for pair in handles.windows(2) {
            let prev = &self.arena[pair[0]].key;
            let next = &self.arena[pair[1]].key;
            if cmp.compare(prev, next) != Ordering::Less {
                return Err(Error::OrderViolation);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;
    use crate::red_black_tree::node::{Color, Side};
    use crate::red_black_tree::Error;
    use compare::{natural, Natural};

    fn build(keys: &[u32]) -> (Tree<u32, u32>, Natural<u32>) {
        let cmp = natural();
        let mut tree = Tree::new(4);
        for &key in keys {
            tree.insert(&cmp, key, key * 10);
            assert_eq!(tree.validate(&cmp), Ok(()));
        }
        (tree, cmp)
    }

    fn keys(tree: &Tree<u32, u32>) -> Vec<u32> {
        tree.in_order()
            .into_iter()
            .map(|handle| tree.node(handle).key)
            .collect()
    }

    #[test]
    fn test_insert_single_node_is_black_root() {
        let (tree, _) = build(&[1]);
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).color, Color::Black);
        assert_eq!(tree.len, 1);
    }

    #[test]
    fn test_insert_outer_grandchild_rotates() {
        let (tree, _) = build(&[1, 2, 3]);
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).key, 2);
        assert_eq!(tree.node(root).color, Color::Black);
        let left = tree.node(root).left.unwrap();
        let right = tree.node(root).right.unwrap();
        assert_eq!((tree.node(left).key, tree.node(left).color), (1, Color::Red));
        assert_eq!((tree.node(right).key, tree.node(right).color), (3, Color::Red));
    }

    #[test]
    fn test_insert_inner_grandchild_rotates_twice() {
        let (tree, _) = build(&[3, 1, 2]);
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).key, 2);
        assert_eq!(keys(&tree), vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_red_uncle_recolors() {
        let (tree, _) = build(&[2, 1, 3, 4]);
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).key, 2);
        let left = tree.node(root).left.unwrap();
        let right = tree.node(root).right.unwrap();
        assert_eq!(tree.node(left).color, Color::Black);
        assert_eq!(tree.node(right).color, Color::Black);
        let leaf = tree.node(right).right.unwrap();
        assert_eq!((tree.node(leaf).key, tree.node(leaf).color), (4, Color::Red));
    }

    #[test]
    fn test_insert_replace_keeps_shape() {
        let (mut tree, cmp) = build(&[5, 3, 7]);
        let root = tree.root;
        assert_eq!(tree.insert(&cmp, 3, 0), Some(30));
        assert_eq!(tree.root, root);
        assert_eq!(tree.len, 3);
        let handle = tree.lookup(&cmp, &3).unwrap();
        assert_eq!(tree.node(handle).value, 0);
    }

    #[test]
    fn test_remove_root_of_single_node_tree() {
        let (mut tree, cmp) = build(&[1]);
        assert_eq!(tree.remove(&cmp, &1), Some((1, 10)));
        assert_eq!(tree.root, None);
        assert_eq!(tree.len, 0);
        assert_eq!(tree.validate(&cmp), Ok(()));
    }

    #[test]
    fn test_remove_root_with_one_child_promotes_black_child() {
        let (mut tree, cmp) = build(&[1, 2]);
        assert_eq!(tree.remove(&cmp, &1), Some((1, 10)));
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).key, 2);
        assert_eq!(tree.node(root).color, Color::Black);
        assert_eq!(tree.node(root).parent, None);
        assert_eq!(tree.validate(&cmp), Ok(()));
    }

    #[test]
    fn test_remove_black_node_with_red_child() {
        let (mut tree, cmp) = build(&[10, 5, 20, 7]);
        assert_eq!(tree.remove(&cmp, &5), Some((5, 50)));
        assert_eq!(keys(&tree), vec![7, 10, 20]);
        assert_eq!(tree.validate(&cmp), Ok(()));
    }

    #[test]
    fn test_remove_two_children_uses_predecessor() {
        let (mut tree, cmp) = build(&[10, 5, 20, 3, 7, 15, 25]);
        assert_eq!(tree.remove(&cmp, &10), Some((10, 100)));
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).key, 7);
        assert_eq!(tree.node(root).value, 70);
        assert_eq!(keys(&tree), vec![3, 5, 7, 15, 20, 25]);
        assert_eq!(tree.validate(&cmp), Ok(()));
    }

    #[test]
    fn test_remove_missing_key() {
        let (mut tree, cmp) = build(&[1, 2, 3]);
        assert_eq!(tree.remove(&cmp, &4), None);
        assert_eq!(tree.len, 3);
        assert_eq!(keys(&tree), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_every_order() {
        let inserted = [8, 4, 12, 2, 6, 10, 14, 1, 3, 5, 7, 9, 11, 13, 15];
        for &first in &inserted {
            let (mut tree, cmp) = build(&inserted);
            assert!(tree.remove(&cmp, &first).is_some());
            assert_eq!(tree.validate(&cmp), Ok(()));
            for &key in &inserted {
                tree.remove(&cmp, &key);
                assert_eq!(tree.validate(&cmp), Ok(()));
            }
            assert_eq!(tree.len, 0);
        }
    }

    #[test]
    fn test_step() {
        let (tree, cmp) = build(&[4, 2, 6, 1, 3, 5, 7]);
        let mut curr = tree.lookup(&cmp, &1);
        let mut forward = Vec::new();
        while let Some(handle) = curr {
            forward.push(tree.node(handle).key);
            curr = tree.step(handle, Side::Right);
        }
        assert_eq!(forward, vec![1, 2, 3, 4, 5, 6, 7]);

        let mut curr = tree.lookup(&cmp, &7);
        let mut backward = Vec::new();
        while let Some(handle) = curr {
            backward.push(tree.node(handle).key);
            curr = tree.step(handle, Side::Left);
        }
        assert_eq!(backward, vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_floor_ceil() {
        let (tree, cmp) = build(&[1, 3, 5]);
        let key_of = |link: Option<_>| link.map(|handle| tree.node(handle).key);
        assert_eq!(key_of(tree.floor(&cmp, &0)), None);
        assert_eq!(key_of(tree.floor(&cmp, &4)), Some(3));
        assert_eq!(key_of(tree.floor(&cmp, &5)), Some(5));
        assert_eq!(key_of(tree.ceil(&cmp, &0)), Some(1));
        assert_eq!(key_of(tree.ceil(&cmp, &4)), Some(5));
        assert_eq!(key_of(tree.ceil(&cmp, &6)), None);
    }

    #[test]
    fn test_validate_detects_red_root() {
        let (mut tree, cmp) = build(&[1]);
        let root = tree.root.unwrap();
        tree.node_mut(root).color = Color::Red;
        assert_eq!(tree.validate(&cmp), Err(Error::RedRoot));
    }

    #[test]
    fn test_validate_detects_black_height_mismatch() {
        let (mut tree, cmp) = build(&[2, 1, 3]);
        let root = tree.root.unwrap();
        let left = tree.node(root).left.unwrap();
        tree.node_mut(left).color = Color::Black;
        assert_eq!(tree.validate(&cmp), Err(Error::BlackHeightMismatch));
    }

    #[test]
    fn test_validate_detects_order_violation() {
        let (mut tree, cmp) = build(&[2, 1, 3]);
        let root = tree.root.unwrap();
        let left = tree.node(root).left.unwrap();
        tree.node_mut(left).key = 4;
        assert_eq!(tree.validate(&cmp), Err(Error::OrderViolation));
    }

    #[test]
    fn test_clear() {
        let (mut tree, cmp) = build(&[1, 2, 3]);
        tree.clear();
        assert_eq!(tree.root, None);
        assert_eq!(tree.len, 0);
        assert_eq!(tree.validate(&cmp), Ok(()));
        tree.insert(&cmp, 4, 40);
        assert_eq!(keys(&tree), vec![4]);
    }

    #[test]
    fn test_into_entries() {
        let (tree, _) = build(&[3, 1, 2]);
        assert_eq!(tree.into_entries(), vec![(1, 10), (2, 20), (3, 30)]);
    }
}
