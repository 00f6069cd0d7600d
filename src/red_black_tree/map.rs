use crate::arena::{Handle, DEFAULT_CHUNK_SIZE};
use crate::enumerable::Enumerable;
use crate::red_black_tree::cursor::Cursor;
use crate::red_black_tree::node::Link;
use crate::red_black_tree::tree::Tree;
use crate::red_black_tree::Result;
use compare::{natural, Compare, Natural};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::ops::Index;
use std::vec;

/// An ordered map implemented using a red black tree.
///
/// A red black tree is a self-balancing binary search tree where every node is colored red or
/// black. The root is black, a red node never has a red child, and every path from a node down to
/// an absent child passes through the same number of black nodes. Together these bound the height
/// of the tree by twice the logarithm of its size.
///
/// Keys are ordered by a comparator of type `C`, which defaults to the natural order of `K`. Nodes
/// live in an arena and refer to their children and parent by handle.
///
/// # Examples
///
/// ```
/// use rb_collections::red_black_tree::RedBlackMap;
///
/// let mut map = RedBlackMap::new();
/// map.insert(0, 1);
/// map.insert(3, 4);
///
/// assert_eq!(map[&0], 1);
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.min(), Some((&0, &1)));
/// assert_eq!(map.ceil(&2), Some(&3));
///
/// *map.get_mut(&0).unwrap() = 2;
/// assert_eq!(map.remove(&0), Some((0, 2)));
/// assert_eq!(map.remove(&1), None);
/// ```
pub struct RedBlackMap<K, V, C = Natural<K>>
where
    C: Compare<K>,
{
    tree: Tree<K, V>,
    cmp: C,
}

impl<K, V> RedBlackMap<K, V>
where
    K: Ord,
{
    /// Constructs a new, empty `RedBlackMap<K, V>` ordered by the natural order of its keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let map: RedBlackMap<u32, u32> = RedBlackMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_cmp(natural())
    }

    /// Constructs a new, empty `RedBlackMap<K, V>` ordered by the natural order of its keys that
    /// allocates nodes `chunk_size` at a time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self::with_cmp_and_chunk_size(natural(), chunk_size)
    }
}

impl<K, V, C> RedBlackMap<K, V, C>
where
    C: Compare<K>,
{
    /// Constructs a new, empty map ordered by the given comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::with_cmp(|a: &u32, b: &u32| b.cmp(a));
    /// map.insert(1, 'a');
    /// map.insert(2, 'b');
    /// assert_eq!(map.keys().collect::<Vec<&u32>>(), vec![&2, &1]);
    /// ```
    pub fn with_cmp(cmp: C) -> Self {
        Self::with_cmp_and_chunk_size(cmp, DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty map ordered by the given comparator that allocates nodes
    /// `chunk_size` at a time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn with_cmp_and_chunk_size(cmp: C, chunk_size: usize) -> Self {
        RedBlackMap {
            tree: Tree::new(chunk_size),
            cmp,
        }
    }

    /// Returns a reference to the map's comparator.
    pub fn cmp(&self) -> &C {
        &self.cmp
    }

    /// Inserts a key-value pair into the map. If the key already exists in the map, its value is
    /// replaced and the old value is returned; the stored key is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// assert_eq!(map.insert(1, 1), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.insert(1, 2), Some(1));
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree.insert(&self.cmp, key, value)
    }

    /// Removes a key-value pair from the map. If the key exists in the map, it will return the
    /// associated key-value pair. Otherwise it will return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.remove(&1), Some((1, 1)));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        self.tree.remove(&self.cmp, key)
    }

    /// Checks if a key exists in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.lookup(&self.cmp, key).is_some()
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree
            .lookup(&self.cmp, key)
            .map(|handle| &self.tree.node(handle).value)
    }

    /// Returns a mutable reference to the value associated with a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// *map.get_mut(&1).unwrap() = 2;
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.tree.lookup(&self.cmp, key) {
            Some(handle) => Some(&mut self.tree.node_mut(handle).value),
            None => None,
        }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.tree.len
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let map: RedBlackMap<u32, u32> = RedBlackMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.tree.len == 0
    }

    /// Clears the map, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.clear();
    /// assert_eq!(map.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    fn entry_at(&self, link: Link) -> Option<(&K, &V)> {
        link.map(|handle| {
            let node = self.tree.node(handle);
            (&node.key, &node.value)
        })
    }

    /// Returns a key in the map that is less than or equal to a particular key. Returns `None` if
    /// such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.floor(&0), None);
    /// assert_eq!(map.floor(&2), Some(&1));
    /// ```
    pub fn floor(&self, key: &K) -> Option<&K> {
        self.entry_at(self.tree.floor(&self.cmp, key))
            .map(|(key, _)| key)
    }

    /// Returns a key in the map that is greater than or equal to a particular key. Returns `None`
    /// if such a key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.ceil(&0), Some(&1));
    /// assert_eq!(map.ceil(&2), None);
    /// ```
    pub fn ceil(&self, key: &K) -> Option<&K> {
        self.entry_at(self.tree.ceil(&self.cmp, key))
            .map(|(key, _)| key)
    }

    /// Returns the entry with the minimum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.min(), Some((&1, &1)));
    /// ```
    pub fn min(&self) -> Option<(&K, &V)> {
        self.entry_at(self.tree.root.map(|root| self.tree.min(root)))
    }

    /// Returns the entry with the maximum key of the map. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.max(), Some((&3, &3)));
    /// ```
    pub fn max(&self) -> Option<(&K, &V)> {
        self.entry_at(self.tree.root.map(|root| self.tree.max(root)))
    }

    /// Returns a cursor positioned before the first entry of the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    ///
    /// let mut cursor = map.cursor();
    /// assert!(cursor.move_last());
    /// assert_eq!(cursor.entry(), Some((&3, &3)));
    /// ```
    pub fn cursor(&self) -> Cursor<K, V> {
        Cursor::new(&self.tree)
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&3, &3)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> RedBlackMapIter<K, V> {
        RedBlackMapIter {
            tree: &self.tree,
            front: self.tree.root,
            front_stack: Vec::new(),
            back: self.tree.root,
            back_stack: Vec::new(),
            remaining: self.tree.len,
        }
    }

    /// Returns an iterator over the keys of the map in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(5, "e");
    /// map.insert(3, "c");
    /// map.insert(7, "g");
    /// assert_eq!(map.keys().collect::<Vec<&u32>>(), vec![&3, &5, &7]);
    /// ```
    pub fn keys(&self) -> RedBlackMapKeys<K, V> {
        RedBlackMapKeys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map, ordered by their keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(5, "e");
    /// map.insert(3, "c");
    /// map.insert(7, "g");
    /// assert_eq!(map.values().collect::<Vec<&&str>>(), vec![&"c", &"e", &"g"]);
    /// ```
    pub fn values(&self) -> RedBlackMapValues<K, V> {
        RedBlackMapValues { inner: self.iter() }
    }

    /// Returns a new map containing clones of the entries for which `predicate` holds. The new
    /// map uses a clone of this map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert("c", 3);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// let selected = map.select(|key, _| *key <= "b");
    /// assert_eq!(selected.keys().collect::<Vec<_>>(), vec![&"a", &"b"]);
    /// ```
    pub fn select<F>(&self, mut predicate: F) -> Self
    where
        K: Clone,
        V: Clone,
        C: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        let mut selected = RedBlackMap::with_cmp(self.cmp.clone());
        self.each(|key, value| {
            if predicate(key, value) {
                selected.insert(key.clone(), value.clone());
            }
        });
        selected
    }

    /// Returns a new map built from the entries returned by `f`, called on every entry in
    /// ascending key order. If two returned keys compare equal, the entry produced later wins.
    /// The new map uses a clone of this map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.insert(3, 3);
    ///
    /// let mapped = map.map(|key, value| (key % 2, value * 10));
    /// assert_eq!(mapped.iter().collect::<Vec<_>>(), vec![(&0, &20), (&1, &30)]);
    /// ```
    pub fn map<W, F>(&self, mut f: F) -> RedBlackMap<K, W, C>
    where
        C: Clone,
        F: FnMut(&K, &V) -> (K, W),
    {
        let mut mapped = RedBlackMap::with_cmp(self.cmp.clone());
        self.each(|key, value| {
            let (key, value) = f(key, value);
            mapped.insert(key, value);
        });
        mapped
    }

    /// Checks that the map satisfies every red black tree invariant: a black root, no red node
    /// with a red child, a uniform black height, strictly ascending keys, consistent parent links
    /// and an accurate length.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::red_black_tree::RedBlackMap;
    ///
    /// let mut map = RedBlackMap::new();
    /// for key in 0..100 {
    ///     map.insert(key, key);
    /// }
    /// assert!(map.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<()> {
        self.tree.validate(&self.cmp)
    }
}

impl<K, V, C> Enumerable<K, V> for RedBlackMap<K, V, C>
where
    C: Compare<K>,
{
    fn walk<'a, F>(&'a self, mut f: F)
    where
        K: 'a,
        V: 'a,
        F: FnMut(&'a K, &'a V) -> bool,
    {
        let mut cursor = self.cursor();
        while cursor.move_next() {
            if !f(cursor.key(), cursor.value()) {
                break;
            }
        }
    }
}

impl<K, V, C> IntoIterator for RedBlackMap<K, V, C>
where
    C: Compare<K>,
{
    type Item = (K, V);
    type IntoIter = RedBlackMapIntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        RedBlackMapIntoIter {
            entries: self.tree.into_entries().into_iter(),
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a RedBlackMap<K, V, C>
where
    K: 'a,
    V: 'a,
    C: Compare<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = RedBlackMapIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `RedBlackMap<K, V>`.
///
/// This iterator yields the entries of the map in ascending key order.
pub struct RedBlackMapIntoIter<K, V> {
    entries: vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for RedBlackMapIntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for RedBlackMapIntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for RedBlackMapIntoIter<K, V> {}

/// An iterator for `RedBlackMap<K, V>`.
///
/// This iterator traverses the elements of the map in-order and yields immutable references. It
/// keeps an explicit stack for each end, so it can also be walked backwards.
pub struct RedBlackMapIter<'a, K: 'a, V: 'a> {
    tree: &'a Tree<K, V>,
    front: Link,
    front_stack: Vec<Handle>,
    back: Link,
    back_stack: Vec<Handle>,
    remaining: usize,
}

impl<'a, K: 'a, V: 'a> Iterator for RedBlackMapIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        while let Some(handle) = self.front {
            self.front_stack.push(handle);
            self.front = tree.node(handle).left;
        }
        self.front_stack.pop().map(|handle| {
            let node = tree.node(handle);
            self.front = node.right;
            self.remaining -= 1;
            (&node.key, &node.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for RedBlackMapIter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        while let Some(handle) = self.back {
            self.back_stack.push(handle);
            self.back = tree.node(handle).right;
        }
        self.back_stack.pop().map(|handle| {
            let node = tree.node(handle);
            self.back = node.left;
            self.remaining -= 1;
            (&node.key, &node.value)
        })
    }
}

impl<'a, K: 'a, V: 'a> ExactSizeIterator for RedBlackMapIter<'a, K, V> {}

/// An iterator over the keys of a `RedBlackMap<K, V>` in ascending order.
pub struct RedBlackMapKeys<'a, K: 'a, V: 'a> {
    inner: RedBlackMapIter<'a, K, V>,
}

impl<'a, K: 'a, V: 'a> Iterator for RedBlackMapKeys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for RedBlackMapKeys<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

/// An iterator over the values of a `RedBlackMap<K, V>`, ordered by their keys.
pub struct RedBlackMapValues<'a, K: 'a, V: 'a> {
    inner: RedBlackMapIter<'a, K, V>,
}

impl<'a, K: 'a, V: 'a> Iterator for RedBlackMapValues<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for RedBlackMapValues<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, C> Default for RedBlackMap<K, V, C>
where
    C: Compare<K> + Default,
{
    fn default() -> Self {
        Self::with_cmp(C::default())
    }
}

impl<K, V, C> Clone for RedBlackMap<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Compare<K> + Clone,
{
    fn clone(&self) -> Self {
        RedBlackMap {
            tree: self.tree.clone(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K, V, C> PartialEq for RedBlackMap<K, V, C>
where
    K: PartialEq,
    V: PartialEq,
    C: Compare<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, C> Eq for RedBlackMap<K, V, C>
where
    K: Eq,
    V: Eq,
    C: Compare<K>,
{
}

impl<K, V, C> fmt::Debug for RedBlackMap<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Compare<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

fn write_subtree<K, V>(
    f: &mut fmt::Formatter,
    tree: &Tree<K, V>,
    handle: Handle,
    prefix: &str,
    is_tail: bool,
) -> fmt::Result
where
    K: fmt::Display,
{
    let node = tree.node(handle);
    if let Some(right) = node.right {
        let branch = if is_tail { "│   " } else { "    " };
        write_subtree(f, tree, right, &format!("{}{}", prefix, branch), false)?;
    }
    let connector = if is_tail { "└── " } else { "┌── " };
    writeln!(f, "{}{}{}", prefix, connector, node.key)?;
    if let Some(left) = node.left {
        let branch = if is_tail { "    " } else { "│   " };
        write_subtree(f, tree, left, &format!("{}{}", prefix, branch), true)?;
    }
    Ok(())
}

/// Draws the tree sideways: the right subtree above each node and the left subtree below it. The
/// layout is meant for debugging and may change.
impl<K, V, C> fmt::Display for RedBlackMap<K, V, C>
where
    K: fmt::Display,
    C: Compare<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "RedBlackMap")?;
        match self.tree.root {
            Some(root) => write_subtree(f, &self.tree, root, "", true),
            None => Ok(()),
        }
    }
}

impl<'a, K, V, C> Index<&'a K> for RedBlackMap<K, V, C>
where
    C: Compare<K>,
{
    type Output = V;

    fn index(&self, key: &'a K) -> &Self::Output {
        self.get(key).expect("Key does not exist.")
    }
}

impl<K, V, C> FromIterator<(K, V)> for RedBlackMap<K, V, C>
where
    C: Compare<K> + Default,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = RedBlackMap::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C> Extend<(K, V)> for RedBlackMap<K, V, C>
where
    C: Compare<K>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, C> Serialize for RedBlackMap<K, V, C>
where
    K: Serialize,
    V: Serialize,
    C: Compare<K>,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            state.serialize_entry(key, value)?;
        }
        state.end()
    }
}

struct RedBlackMapVisitor<K, V, C>
where
    C: Compare<K>,
{
    marker: PhantomData<fn() -> RedBlackMap<K, V, C>>,
}

impl<'de, K, V, C> Visitor<'de> for RedBlackMapVisitor<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Compare<K> + Default,
{
    type Value = RedBlackMap<K, V, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = RedBlackMap::default();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V, C> Deserialize<'de> for RedBlackMap<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Compare<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RedBlackMapVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RedBlackMap;
    use crate::enumerable::Enumerable;
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    fn sample() -> RedBlackMap<u32, &'static str> {
        let mut map = RedBlackMap::new();
        map.insert(5, "e");
        map.insert(6, "f");
        map.insert(7, "g");
        map.insert(3, "c");
        map.insert(4, "d");
        map.insert(1, "x");
        map.insert(2, "b");
        map.insert(1, "a");
        map
    }

    fn letters() -> RedBlackMap<&'static str, u32> {
        let mut map = RedBlackMap::new();
        map.insert("c", 3);
        map.insert("a", 1);
        map.insert("b", 2);
        map
    }

    #[test]
    fn test_len_empty() {
        let map: RedBlackMap<u32, u32> = RedBlackMap::new();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let map: RedBlackMap<u32, u32> = RedBlackMap::new();
        assert_eq!(map.min(), None);
        assert_eq!(map.max(), None);
    }

    #[test]
    fn test_insert() {
        let mut map = RedBlackMap::new();
        map.insert(5, "e");
        map.insert(3, "c");
        map.insert(7, "g");
        assert_eq!(map.keys().collect::<Vec<&u32>>(), vec![&3, &5, &7]);
        assert_eq!(map.values().collect::<Vec<&&str>>(), vec![&"c", &"e", &"g"]);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_insert_replace() {
        let mut map = RedBlackMap::new();
        assert_eq!(map.insert(1, "x"), None);
        assert_eq!(map.insert(1, "a"), Some("x"));
        assert_eq!(map.get(&1), Some(&"a"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_get() {
        let map = sample();
        assert_eq!(map.len(), 7);
        assert_eq!(
            map.keys().cloned().collect::<Vec<u32>>(),
            vec![1, 2, 3, 4, 5, 6, 7],
        );
        assert_eq!(
            map.values().cloned().collect::<Vec<&str>>(),
            vec!["a", "b", "c", "d", "e", "f", "g"],
        );
        assert_eq!(map.get(&8), None);
        assert_eq!(map[&4], "d");
    }

    #[test]
    #[should_panic]
    fn test_index_missing() {
        let map = sample();
        let _ = map[&8];
    }

    #[test]
    fn test_remove() {
        let mut map = sample();
        assert_eq!(map.remove(&5), Some((5, "e")));
        assert_eq!(map.remove(&6), Some((6, "f")));
        assert_eq!(map.remove(&7), Some((7, "g")));
        assert_eq!(map.remove(&8), None);
        assert_eq!(map.remove(&5), None);
        assert_eq!(map.keys().cloned().collect::<Vec<u32>>(), vec![1, 2, 3, 4]);
        assert_eq!(map.len(), 4);
        assert!(map.validate().is_ok());

        for &key in &[1, 4, 2, 3, 2, 2] {
            map.remove(&key);
            assert!(map.validate().is_ok());
        }
        assert_eq!(map.keys().count(), 0);
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_missing_keeps_keys() {
        let mut map = RedBlackMap::new();
        map.insert(5, "e");
        map.insert(3, "c");
        map.insert(7, "g");
        assert_eq!(map.remove(&100), None);
        assert_eq!(map.len(), 3);
        assert_eq!(map.keys().cloned().collect::<Vec<u32>>(), vec![3, 5, 7]);
    }

    #[test]
    fn test_clear() {
        let mut map = sample();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.iter().next(), None);
        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn test_get_mut() {
        let mut map = RedBlackMap::new();
        map.insert(1, 1);
        {
            let value = map.get_mut(&1);
            *value.unwrap() = 3;
        }
        assert_eq!(map.get(&1), Some(&3));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_floor_ceil() {
        let mut map = RedBlackMap::new();
        map.insert(1, 1);
        map.insert(3, 3);
        map.insert(5, 5);

        assert_eq!(map.floor(&0), None);
        assert_eq!(map.floor(&2), Some(&1));
        assert_eq!(map.floor(&4), Some(&3));
        assert_eq!(map.floor(&6), Some(&5));

        assert_eq!(map.ceil(&0), Some(&1));
        assert_eq!(map.ceil(&2), Some(&3));
        assert_eq!(map.ceil(&4), Some(&5));
        assert_eq!(map.ceil(&6), None);
    }

    #[test]
    fn test_min_max() {
        let map = sample();
        assert_eq!(map.min(), Some((&1, &"a")));
        assert_eq!(map.max(), Some((&7, &"g")));
    }

    #[test]
    fn test_custom_comparator() {
        let mut map = RedBlackMap::with_cmp(|a: &String, b: &String| {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        });
        for word in &["pear", "fig", "banana", "kiwi"] {
            map.insert(word.to_string(), word.len());
        }
        assert_eq!(
            map.keys().map(|key| key.as_str()).collect::<Vec<&str>>(),
            vec!["fig", "kiwi", "pear", "banana"],
        );
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_chunk_size() {
        let mut map = RedBlackMap::with_chunk_size(1);
        for key in 0..10 {
            map.insert(key, key);
        }
        for key in 0..5 {
            map.remove(&key);
        }
        for key in 10..15 {
            map.insert(key, key);
        }
        assert_eq!(map.keys().cloned().collect::<Vec<u32>>(), (5..15).collect::<Vec<u32>>());
        assert!(map.validate().is_ok());
    }

    #[test]
    fn test_iter() {
        let mut map = RedBlackMap::new();
        for &key in &[10, 20, 30, 15, 25, 5] {
            map.insert(key, key * 2);
        }
        assert_eq!(
            map.iter().collect::<Vec<(&u32, &u32)>>(),
            vec![(&5, &10), (&10, &20), (&15, &30), (&20, &40), (&25, &50), (&30, &60)],
        );
        assert_eq!(
            map.iter().rev().map(|(key, _)| *key).collect::<Vec<u32>>(),
            vec![30, 25, 20, 15, 10, 5],
        );
        assert_eq!(map.iter().len(), 6);
    }

    #[test]
    fn test_iter_both_ends() {
        let map: RedBlackMap<u32, u32> = (0..7).map(|key| (key, key)).collect();
        let mut iter = map.iter();
        assert_eq!(iter.next(), Some((&0, &0)));
        assert_eq!(iter.next_back(), Some((&6, &6)));
        assert_eq!(iter.next(), Some((&1, &1)));
        assert_eq!(iter.next_back(), Some((&5, &5)));
        assert_eq!(iter.len(), 3);
        assert_eq!(
            iter.map(|(key, _)| *key).collect::<Vec<u32>>(),
            vec![2, 3, 4],
        );
    }

    #[test]
    fn test_into_iter() {
        let mut map = RedBlackMap::new();
        map.insert(1, 2);
        map.insert(5, 6);
        map.insert(3, 4);

        assert_eq!(
            map.into_iter().collect::<Vec<(u32, u32)>>(),
            vec![(1, 2), (3, 4), (5, 6)],
        );
    }

    #[test]
    fn test_eq_clone_debug() {
        let map = sample();
        let mut other = map.clone();
        assert_eq!(map, other);
        other.insert(8, "h");
        assert_ne!(map, other);
        assert_eq!(
            format!("{:?}", letters()),
            r#"{"a": 1, "b": 2, "c": 3}"#,
        );
    }

    #[test]
    fn test_display() {
        let map: RedBlackMap<u32, ()> = (1..4).map(|key| (key, ())).collect();
        assert_eq!(
            format!("{}", map),
            "RedBlackMap\n│   ┌── 3\n└── 2\n    └── 1\n",
        );
        let empty: RedBlackMap<u32, ()> = RedBlackMap::new();
        assert_eq!(format!("{}", empty), "RedBlackMap\n");
    }

    #[test]
    fn test_each() {
        let map = letters();
        let mut count = 0;
        map.each(|key, value| {
            count += 1;
            assert_eq!(*value, count);
            assert_eq!(*key, ["a", "b", "c"][count as usize - 1]);
        });
        assert_eq!(count, 3);
    }

    #[test]
    fn test_map() {
        let map = letters();
        let mapped = map.map(|key, _| (*key, format!("mapped: {}", key)));
        assert_eq!(mapped.get(&"a"), Some(&"mapped: a".to_string()));
        assert_eq!(mapped.get(&"b"), Some(&"mapped: b".to_string()));
        assert_eq!(mapped.get(&"c"), Some(&"mapped: c".to_string()));
        assert_eq!(mapped.len(), 3);
    }

    #[test]
    fn test_map_colliding_keys() {
        let map: RedBlackMap<u32, u32> = (1..6).map(|key| (key, key)).collect();
        let mapped = map.map(|key, value| (key / 2, *value));
        assert_eq!(
            mapped.iter().collect::<Vec<(&u32, &u32)>>(),
            vec![(&0, &1), (&1, &3), (&2, &5)],
        );
    }

    #[test]
    fn test_select() {
        let map = letters();
        let selected = map.select(|key, _| *key >= "a" && *key <= "b");
        assert_eq!(selected.get(&"a"), Some(&1));
        assert_eq!(selected.get(&"b"), Some(&2));
        assert_eq!(selected.get(&"c"), None);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_any_all() {
        let map = letters();
        assert!(map.any(|_, value| *value == 3));
        assert!(!map.any(|_, value| *value == 4));
        assert!(map.all(|key, _| *key >= "a" && *key <= "c"));
        assert!(!map.all(|key, _| *key >= "a" && *key <= "b"));

        let empty: RedBlackMap<u32, u32> = RedBlackMap::new();
        assert!(!empty.any(|_, _| true));
        assert!(empty.all(|_, _| false));
    }

    #[test]
    fn test_any_short_circuits() {
        let map: RedBlackMap<u32, u32> = (0..10).map(|key| (key, key)).collect();
        let mut visited = Vec::new();
        assert!(map.any(|key, _| {
            visited.push(*key);
            *key == 2
        }));
        assert_eq!(visited, vec![0, 1, 2]);
    }

    #[test]
    fn test_find() {
        let map = letters();
        assert_eq!(map.find(|key, _| *key == "c"), Some((&"c", &3)));
        assert_eq!(map.find(|key, _| *key == "x"), None);
        assert_eq!(map.find(|_, value| *value >= 2), Some((&"b", &2)));
    }

    #[test]
    fn test_chaining() {
        let map = letters();
        let chained = map
            .select(|_, value| *value > 1)
            .map(|key, value| (*key, value * value));
        assert_eq!(chained.len(), 2);
        assert_eq!(chained.get(&"a"), None);
        assert_eq!(chained.get(&"b"), Some(&4));
        assert_eq!(chained.get(&"c"), Some(&9));
    }

    #[test]
    fn test_serde() {
        let mut map: RedBlackMap<u32, String> = RedBlackMap::new();
        map.insert(2, "b".to_string());
        map.insert(1, "a".to_string());

        assert_tokens(
            &map,
            &[
                Token::Map { len: Some(2) },
                Token::U32(1),
                Token::Str("a"),
                Token::U32(2),
                Token::Str("b"),
                Token::MapEnd,
            ],
        );
    }

    #[test]
    fn test_deserialize_duplicate_keys() {
        let mut map: RedBlackMap<u32, u32> = RedBlackMap::new();
        map.insert(1, 20);

        assert_de_tokens(
            &map,
            &[
                Token::Map { len: Some(2) },
                Token::U32(1),
                Token::U32(10),
                Token::U32(1),
                Token::U32(20),
                Token::MapEnd,
            ],
        );
    }
}
