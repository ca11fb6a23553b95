//! The main tree implementation.
//!
//! This module contains the `Tree` type, which provides the public API for
//! working with the reversed radix tree.

use std::fmt;
use std::iter::FromIterator;

use tracing::trace;

use crate::node::Node;
use crate::suffix_view::{Iter, SuffixView};
use crate::InvariantError;

/// A map from byte-string keys to values with suffix-aware lookup.
///
/// Keys are stored in a compressed trie whose edge labels are matched against
/// the *end* of a key. Besides exact lookups this makes it cheap to find the
/// longest stored key that is a suffix of a query, or to enumerate every key
/// ending with a given byte sequence.
///
/// Iteration order is unspecified and may change between mutations.
#[derive(Clone)]
pub struct Tree<V> {
    /// The root node of the tree
    pub(crate) root: Node<V>,

    /// The number of values stored in the tree
    size: usize,
}

impl<V> Tree<V> {
    /// Creates a new, empty tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let tree = Tree::<i32>::new();
    /// assert!(tree.is_empty());
    /// ```
    pub fn new() -> Self {
        Tree {
            root: Node::new(),
            size: 0,
        }
    }

    /// Returns the number of keys stored in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert_eq!(tree.len(), 0);
    ///
    /// tree.insert("hello", 42);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Removes every key, dropping the stored values.
    pub fn clear(&mut self) {
        self.root = Node::new();
        self.size = 0;
    }

    /// Inserts a key-value pair, returning the value previously stored under
    /// the same key.
    ///
    /// The key bytes are copied; the caller keeps its buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert_eq!(tree.insert("sth", "sth"), None);
    /// assert_eq!(tree.insert("sth", "else"), Some("sth"));
    /// assert_eq!(tree.get("sth"), Some(&"else"));
    /// ```
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Option<V> {
        let key = key.as_ref();
        let old = self.root.insert(key, value);
        if old.is_none() {
            self.size += 1;
            trace!(key_len = key.len(), len = self.size, "inserted new key");
        }
        old
    }

    /// Retrieves a reference to the value stored for the given key, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert("sth", 1);
    ///
    /// assert_eq!(tree.get("sth"), Some(&1));
    /// assert_eq!(tree.get("any sth"), None);
    /// ```
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&V> {
        self.root.get(key.as_ref()).map(|leaf| &leaf.value)
    }

    /// Retrieves a mutable reference to the value stored for the given key.
    pub fn get_mut<K: AsRef<[u8]>>(&mut self, key: K) -> Option<&mut V> {
        self.root.get_mut(key.as_ref()).map(|leaf| &mut leaf.value)
    }

    /// Returns `true` if the tree contains a value for the given key.
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.root.get(key.as_ref()).is_some()
    }

    /// Finds the longest stored key that is a suffix of `key`.
    ///
    /// Returns the stored key together with its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert("table", "table");
    /// tree.insert("able", "able");
    /// tree.insert("present", "present");
    ///
    /// let (key, value) = tree.longest_suffix("presentable").unwrap();
    /// assert_eq!(key, b"table");
    /// assert_eq!(*value, "table");
    /// assert_eq!(tree.longest_suffix("bl"), None);
    /// ```
    pub fn longest_suffix<K: AsRef<[u8]>>(&self, key: K) -> Option<(&[u8], &V)> {
        self.root
            .longest_suffix(key.as_ref())
            .map(|leaf| (&leaf.origin_key[..], &leaf.value))
    }

    /// Removes a key from the tree, returning its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert("sth", "sth");
    ///
    /// assert_eq!(tree.remove("sth"), Some("sth"));
    /// assert_eq!(tree.get("sth"), None);
    /// assert_eq!(tree.remove("sth"), None);
    /// ```
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the tree, returning the stored key and its value.
    pub fn remove_entry<K: AsRef<[u8]>>(&mut self, key: K) -> Option<(Vec<u8>, V)> {
        let leaf = self.root.remove(key.as_ref())?;
        self.size -= 1;
        trace!(key_len = leaf.origin_key.len(), len = self.size, "removed key");
        Some((leaf.origin_key, leaf.value))
    }

    /// Returns an iterator over every key-value pair, in unspecified order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.root.edges)
    }

    /// Returns an iterator over the key-value pairs whose key ends with
    /// `suffix`, in unspecified order.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let tree: Tree<u32> = vec![("able", 1), ("table", 2), ("present", 3)]
    ///     .into_iter()
    ///     .collect();
    ///
    /// let mut keys: Vec<&[u8]> = tree.iter_suffix("ble").map(|(key, _)| key).collect();
    /// keys.sort();
    /// assert_eq!(keys, vec![&b"able"[..], b"table"]);
    /// ```
    pub fn iter_suffix<K: AsRef<[u8]>>(&self, suffix: K) -> Iter<'_, V> {
        Iter::new(self.root.suffix_edges(suffix.as_ref()))
    }

    /// Calls `visitor` with every key-value pair until it returns `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert("able", 1);
    /// tree.insert("table", 2);
    ///
    /// let mut calls = 0;
    /// tree.walk(|_, _| {
    ///     calls += 1;
    ///     true
    /// });
    /// assert_eq!(calls, 1);
    /// ```
    pub fn walk<F>(&self, visitor: F)
    where
        F: FnMut(&[u8], &V) -> bool,
    {
        visit(self.iter(), visitor)
    }

    /// Calls `visitor` with every key-value pair whose key ends with `suffix`,
    /// until it returns `true`.
    pub fn walk_suffix<K, F>(&self, suffix: K, visitor: F)
    where
        K: AsRef<[u8]>,
        F: FnMut(&[u8], &V) -> bool,
    {
        visit(self.iter_suffix(suffix), visitor)
    }

    /// Creates a view of the keys ending with `suffix`.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_suffix::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert("table", 1);
    /// tree.insert("presentable", 2);
    /// tree.insert("present", 3);
    ///
    /// let view = tree.view_suffix("table");
    /// assert_eq!(view.len(), 2);
    /// assert!(view.contains_key("presentable"));
    /// assert!(!view.contains_key("present"));
    /// ```
    pub fn view_suffix<K: AsRef<[u8]>>(&self, suffix: K) -> SuffixView<'_, V> {
        SuffixView::new(self, suffix.as_ref())
    }

    /// Walks every node and checks the structural rules of the tree.
    ///
    /// A tree built only through the public API always passes; this exists
    /// for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let leaves = self.root.check()?;
        if leaves != self.size {
            return Err(InvariantError::CountMismatch {
                expected: self.size,
                actual: leaves,
            });
        }
        Ok(())
    }
}

fn visit<'a, V: 'a>(entries: Iter<'a, V>, mut visitor: impl FnMut(&[u8], &V) -> bool) {
    for (key, value) in entries {
        if visitor(key, value) {
            break;
        }
    }
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for Tree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(key, value)| (String::from_utf8_lossy(key), value)),
            )
            .finish()
    }
}

// Two trees are equal when they hold the same entries, whatever their shape
impl<V: PartialEq> PartialEq for Tree<V> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<V: Eq> Eq for Tree<V> {}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for Tree<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = Tree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: AsRef<[u8]>, V> Extend<(K, V)> for Tree<V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, V> IntoIterator for &'a Tree<V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
