//! Ordered enumeration helpers shared by the ordered containers.

/// Operations that visit the entries of an ordered container in ascending key order.
///
/// Implementors only provide `walk`; every other method is derived from it and stops visiting
/// entries as soon as its result is known.
///
/// # Examples
///
/// ```
/// use rb_collections::red_black_tree::RedBlackMap;
/// use rb_collections::Enumerable;
///
/// let mut map = RedBlackMap::new();
/// map.insert("c", 3);
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// assert!(map.any(|_, value| *value == 3));
/// assert!(map.all(|key, _| *key <= "c"));
/// assert_eq!(map.find(|_, value| *value > 1), Some((&"b", &2)));
/// ```
pub trait Enumerable<K, V> {
    /// Calls `f` on each entry in ascending key order until `f` returns `false`.
    fn walk<'a, F>(&'a self, f: F)
    where
        K: 'a,
        V: 'a,
        F: FnMut(&'a K, &'a V) -> bool;

    /// Calls `f` once for every entry in ascending key order.
    fn each<'a, F>(&'a self, mut f: F)
    where
        K: 'a,
        V: 'a,
        F: FnMut(&'a K, &'a V),
    {
        self.walk(|key, value| {
            f(key, value);
            true
        });
    }

    /// Returns `true` if `predicate` holds for at least one entry.
    fn any<'a, F>(&'a self, mut predicate: F) -> bool
    where
        K: 'a,
        V: 'a,
        F: FnMut(&'a K, &'a V) -> bool,
    {
        let mut found = false;
        self.walk(|key, value| {
            found = predicate(key, value);
            !found
        });
        found
    }

    /// Returns `true` if `predicate` holds for every entry. An empty container satisfies any
    /// predicate.
    fn all<'a, F>(&'a self, mut predicate: F) -> bool
    where
        K: 'a,
        V: 'a,
        F: FnMut(&'a K, &'a V) -> bool,
    {
        let mut holds = true;
        self.walk(|key, value| {
            holds = predicate(key, value);
            holds
        });
        holds
    }

    /// Returns the first entry in ascending key order for which `predicate` holds.
    fn find<'a, F>(&'a self, mut predicate: F) -> Option<(&'a K, &'a V)>
    where
        K: 'a,
        V: 'a,
        F: FnMut(&'a K, &'a V) -> bool,
    {
        let mut found = None;
        self.walk(|key, value| {
            if predicate(key, value) {
                found = Some((key, value));
            }
            found.is_none()
        });
        found
    }
}
