//! Chunked slot allocator that hands out stable handles.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// Number of slots allocated per chunk when no chunk size is given.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// A stable reference to an object stored in an `Arena<T>`.
///
/// A handle stays valid until the object it refers to is removed. Handles are plain indices, so
/// objects inside the arena may freely refer to each other (including cyclically) without any
/// ownership between them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
}

#[derive(Clone)]
enum Slot<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// An allocator that stores objects of a single type in fixed-size chunks.
///
/// Chunks are never reallocated once created, so growing the arena does not move existing
/// objects. Removed slots are threaded onto a free list and reused by later insertions. Dropping
/// the arena drops every object still inside it.
///
/// # Examples
///
/// ```
/// use rb_collections::arena::Arena;
///
/// let mut arena = Arena::new(16);
///
/// let x = arena.insert(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.remove(x), 2);
/// assert!(arena.is_empty());
/// ```
#[derive(Clone)]
pub struct Arena<T> {
    head: Option<Handle>,
    chunks: Vec<Vec<Slot<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> Arena<T> {
    /// Constructs a new, empty `Arena<T>` that allocates `chunk_size` slots at a time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Expected a positive chunk size.");
        Arena {
            head: None,
            chunks: Vec::new(),
            chunk_size,
            len: 0,
            capacity: 0,
        }
    }

    fn contains_slot(&self, handle: Handle) -> bool {
        handle.chunk_index < self.chunks.len()
            && handle.block_index < self.chunks[handle.chunk_index].len()
    }

    /// Stores an object in the arena and returns its handle.
    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;

        if let Some(handle) = self.head.take() {
            let slot = mem::replace(
                &mut self.chunks[handle.chunk_index][handle.block_index],
                Slot::Occupied(value),
            );
            match slot {
                Slot::Vacant(next) => self.head = next,
                Slot::Occupied(_) => panic!("Expected the free list to point at a vacant slot."),
            }
            return handle;
        }

        if self.len > self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
        }
        let chunk_index = self.chunks.len() - 1;
        let chunk = &mut self.chunks[chunk_index];
        chunk.push(Slot::Occupied(value));
        Handle {
            chunk_index,
            block_index: chunk.len() - 1,
        }
    }

    /// Removes an object from the arena and returns it. The slot is reused by a later insertion.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live object.
    pub fn remove(&mut self, handle: Handle) -> T {
        if !self.contains_slot(handle) {
            panic!("Error: attempting to remove an object outside of the arena.");
        }
        let slot = mem::replace(
            &mut self.chunks[handle.chunk_index][handle.block_index],
            Slot::Vacant(self.head),
        );
        match slot {
            Slot::Occupied(value) => {
                self.len -= 1;
                self.head = Some(handle);
                value
            },
            Slot::Vacant(next) => {
                self.chunks[handle.chunk_index][handle.block_index] = Slot::Vacant(next);
                panic!("Error: attempting to remove a vacant slot.");
            },
        }
    }

    /// Returns a reference to the object behind `handle`, or `None` if the handle is stale.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.contains_slot(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Slot::Occupied(ref value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the object behind `handle`, or `None` if the handle is
    /// stale.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.contains_slot(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Slot::Occupied(ref mut value) => Some(value),
            Slot::Vacant(_) => None,
        }
    }

    /// Returns mutable references to two distinct live objects at once. Returns `None` if the
    /// handles are equal or either one is stale.
    pub fn get_pair_mut(&mut self, a: Handle, b: Handle) -> Option<(&mut T, &mut T)> {
        if a == b || !self.contains_slot(a) || !self.contains_slot(b) {
            return None;
        }

        let (first, second) = if a.chunk_index == b.chunk_index {
            let chunk = &mut self.chunks[a.chunk_index];
            if a.block_index < b.block_index {
                let (low, high) = chunk.split_at_mut(b.block_index);
                (&mut low[a.block_index], &mut high[0])
            } else {
                let (low, high) = chunk.split_at_mut(a.block_index);
                (&mut high[0], &mut low[b.block_index])
            }
        } else if a.chunk_index < b.chunk_index {
            let (low, high) = self.chunks.split_at_mut(b.chunk_index);
            (&mut low[a.chunk_index][a.block_index], &mut high[0][b.block_index])
        } else {
            let (low, high) = self.chunks.split_at_mut(a.chunk_index);
            (&mut high[0][a.block_index], &mut low[b.chunk_index][b.block_index])
        };

        match (first, second) {
            (Slot::Occupied(x), Slot::Occupied(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Drops every object in the arena and releases all chunks.
    pub fn clear(&mut self) {
        self.head = None;
        self.chunks.clear();
        self.len = 0;
        self.capacity = 0;
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots the arena can hold before allocating another chunk.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(handle).expect("Error: handle does not refer to a live object.")
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(handle).expect("Error: handle does not refer to a live object.")
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, Handle};

    #[test]
    #[should_panic]
    fn test_zero_chunk_size() {
        let _: Arena<u32> = Arena::new(0);
    }

    #[test]
    #[should_panic]
    fn test_remove_outside_arena() {
        let mut arena: Arena<u32> = Arena::new(4);
        arena.remove(Handle {
            chunk_index: 0,
            block_index: 0,
        });
    }

    #[test]
    #[should_panic]
    fn test_remove_vacant_slot() {
        let mut arena = Arena::new(4);
        let handle = arena.insert(0);
        arena.remove(handle);
        arena.remove(handle);
    }

    #[test]
    fn test_insert_fills_chunks_in_order() {
        let mut arena = Arena::new(2);
        let handles: Vec<Handle> = (0..3).map(|i| arena.insert(i)).collect();
        assert_eq!(
            handles,
            vec![
                Handle {
                    chunk_index: 0,
                    block_index: 0
                },
                Handle {
                    chunk_index: 0,
                    block_index: 1
                },
                Handle {
                    chunk_index: 1,
                    block_index: 0
                },
            ],
        );
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.capacity(), 4);
    }

    #[test]
    fn test_remove_reuses_slot() {
        let mut arena = Arena::new(4);
        let first = arena.insert(1);
        let second = arena.insert(2);
        assert_eq!(arena.remove(first), 1);
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.insert(3), first);
        assert_eq!(arena[first], 3);
        assert_eq!(arena[second], 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_get_mut() {
        let mut arena = Arena::new(4);
        let handle = arena.insert(0);
        *arena.get_mut(handle).unwrap() = 5;
        assert_eq!(arena.get(handle), Some(&5));
    }

    #[test]
    fn test_get_pair_mut() {
        let mut arena = Arena::new(2);
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);

        {
            let (x, y) = arena.get_pair_mut(b, a).unwrap();
            std::mem::swap(x, y);
        }
        {
            let (x, y) = arena.get_pair_mut(a, c).unwrap();
            std::mem::swap(x, y);
        }
        assert_eq!((arena[a], arena[b], arena[c]), (3, 1, 2));
        assert!(arena.get_pair_mut(a, a).is_none());

        arena.remove(c);
        assert!(arena.get_pair_mut(a, c).is_none());
    }

    #[test]
    fn test_clear() {
        let mut arena = Arena::new(2);
        let handle = arena.insert(0);
        arena.insert(1);
        arena.insert(2);
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.get(handle), None);
        assert_eq!(
            arena.insert(7),
            Handle {
                chunk_index: 0,
                block_index: 0
            },
        );
    }
}
