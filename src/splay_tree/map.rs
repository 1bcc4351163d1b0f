use crate::arena::{Handle, DEFAULT_CHUNK_SIZE};
use crate::splay_tree::tree::Tree;
use serde_derive::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;

/// An ordered map implemented using a splay tree.
///
/// A splay tree is a self-adjusting binary search tree with the additional property that recently
/// accessed items are quick to access again. Every successful `find` "splays" the accessed node to
/// the root of the tree through a series of rotations, which gives amortized logarithmic access
/// without storing any balance information. Inserting a new key attaches it as a leaf and does not
/// restructure the tree, and neither do the `&self` queries such as `get`.
///
/// Nodes live in an arena and refer to their parent and children by handle, so the map contains
/// no raw pointers and splaying walks upward through parent links without recursion.
///
/// # Examples
///
/// ```
/// use splay_memo::splay_tree::SplayMap;
///
/// let mut map = SplayMap::new();
/// map.insert(0, 1);
/// map.insert(3, 4);
///
/// assert_eq!(map.find(&0), Some(&1));
/// assert_eq!(map.root(), Some((&0, &1)));
/// assert_eq!(map.find(&1), None);
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.min(), Some(&0));
/// assert_eq!(map.max(), Some(&3));
/// ```
#[derive(Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de> + Ord, U: serde::Deserialize<'de>"))]
pub struct SplayMap<T, U> {
    tree: Tree<T, U>,
}

impl<T, U> SplayMap<T, U> {
    /// Constructs a new, empty `SplayMap<T, U>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let map: SplayMap<u32, u32> = SplayMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `SplayMap<T, U>` whose nodes are allocated `chunk_size` at a time.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let map: SplayMap<u32, u32> = SplayMap::with_chunk_size(64);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        SplayMap {
            tree: Tree::new(chunk_size),
        }
    }

    /// Inserts a key-value pair into the map. If the key already exists in the map, its value is
    /// replaced in place and the old value is returned. Insertion never splays the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// assert_eq!(map.insert(1, 1), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.insert(1, 2), Some(1));
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: T, value: U) -> Option<U>
    where
        T: Ord,
    {
        self.tree.insert(key, value).1
    }

    // Inserts without splaying and returns the value now stored under `key`.
    pub(crate) fn insert_and_get(&mut self, key: T, value: U) -> &U
    where
        T: Ord,
    {
        let (handle, _) = self.tree.insert(key, value);
        &self.tree.entry(handle).value
    }

    /// Returns a reference to the value associated with a particular key, splaying its node to
    /// the root. Returns `None` and leaves the tree untouched if the key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(2, 2);
    /// map.insert(1, 1);
    /// assert_eq!(map.find(&1), Some(&1));
    /// assert_eq!(map.root(), Some((&1, &1)));
    /// assert_eq!(map.find(&0), None);
    /// ```
    pub fn find<V>(&mut self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.tree.find(key) {
            Some(handle) => Some(&self.tree.entry(handle).value),
            None => None,
        }
    }

    /// Returns a mutable reference to the value associated with a particular key, splaying its
    /// node to the root. Returns `None` if the key does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// *map.find_mut(&1).unwrap() = 2;
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    pub fn find_mut<V>(&mut self, key: &V) -> Option<&mut U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        match self.tree.find(key) {
            Some(handle) => Some(&mut self.tree.entry_mut(handle).value),
            None => None,
        }
    }

    /// Returns an immutable reference to the value associated with a particular key. It will
    /// return `None` if the key does not exist in the map. Note that `get` does not splay the tree
    /// in order to use a non-mutable reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn get<V>(&self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree
            .locate(key)
            .map(|handle| &self.tree.entry(handle).value)
    }

    /// Checks if a key exists in the map. Note that `contains_key` does not splay the tree in
    /// order to use a non-mutable reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.tree.locate(key).is_some()
    }

    /// Returns the key-value pair stored at the root of the tree, which is the most recently
    /// found key if any `find` has succeeded since the last insertion that changed the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// assert_eq!(map.root(), None);
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// assert_eq!(map.root(), Some((&1, &1)));
    /// ```
    pub fn root(&self) -> Option<(&T, &U)> {
        self.tree.root().map(|handle| self.pair(handle))
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// assert_eq!(map.height(), 0);
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.insert(3, 3);
    /// assert_eq!(map.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let map: SplayMap<u32, u32> = SplayMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the map, removing all values.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// map.insert(2, 2);
    /// map.clear();
    /// assert_eq!(map.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the minimum key of the map. Returns `None` if the map is empty. Note that `min`
    /// does not splay the tree in order to use a non-mutable reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.tree.min().map(|handle| &self.tree.entry(handle).key)
    }

    /// Returns the maximum key of the map. Returns `None` if the map is empty. Note that `max`
    /// does not splay the tree in order to use a non-mutable reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(1, 1);
    /// map.insert(3, 3);
    /// assert_eq!(map.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        self.tree.max().map(|handle| &self.tree.entry(handle).key)
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::splay_tree::SplayMap;
    ///
    /// let mut map = SplayMap::new();
    /// map.insert(2, 2);
    /// map.insert(1, 1);
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&2, &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> SplayMapIter<T, U> {
        SplayMapIter {
            tree: &self.tree,
            current: self.tree.min(),
            remaining: self.len(),
        }
    }

    fn pair(&self, handle: Handle) -> (&T, &U) {
        let entry = self.tree.entry(handle);
        (&entry.key, &entry.value)
    }

    #[cfg(test)]
    fn assert_valid(&self)
    where
        T: Ord,
    {
        assert_eq!(self.tree.validate(), Ok(()));
    }
}

impl<'a, T, U> IntoIterator for &'a SplayMap<T, U>
where
    T: 'a,
    U: 'a,
{
    type IntoIter = SplayMapIter<'a, T, U>;
    type Item = (&'a T, &'a U);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator for `SplayMap<T, U>`.
///
/// This iterator traverses the elements of the map in-order and yields immutable references. It
/// follows parent links instead of keeping a stack.
pub struct SplayMapIter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    tree: &'a Tree<T, U>,
    current: Option<Handle>,
    remaining: usize,
}

impl<'a, T, U> Iterator for SplayMapIter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    type Item = (&'a T, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.current.map(|handle| {
            self.current = tree.successor(handle);
            self.remaining -= 1;
            let entry = tree.entry(handle);
            (&entry.key, &entry.value)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, U> ExactSizeIterator for SplayMapIter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
}

impl<T, U> Default for SplayMap<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, U> fmt::Debug for SplayMap<T, U>
where
    T: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T, U> Extend<(T, U)> for SplayMap<T, U>
where
    T: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (T, U)>,
    {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<T, U> FromIterator<(T, U)> for SplayMap<T, U>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
    {
        let mut map = SplayMap::new();
        map.extend(iter);
        map
    }
}
