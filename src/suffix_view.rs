//! Suffix view into a reversed radix tree.
//!
//! This module provides the `SuffixView` type, a borrowed window onto the keys
//! of a tree that end with a given byte sequence, and `Iter`, the depth-first
//! iterator behind every walk.

use std::fmt;
use std::slice;

use crate::node::{Edge, Target};
use crate::util::has_suffix;
use crate::Tree;

/// A lightweight view of the keys in a tree that end with a suffix.
///
/// The subtree holding those keys is located once, when the view is created,
/// and iteration through the view only touches that subtree. Lookups reject
/// keys outside the suffix up front and search the tree for the rest.
///
/// # Examples
///
/// ```
/// use radix_suffix::Tree;
///
/// let mut tree = Tree::new();
/// tree.insert("able", 1);
/// tree.insert("table", 2);
/// tree.insert("presentable", 3);
/// tree.insert("present", 4);
///
/// let view = tree.view_suffix("table");
/// assert_eq!(view.len(), 2);
/// assert_eq!(view.get("presentable"), Some(&3));
/// assert_eq!(view.get("able"), None);
/// ```
pub struct SuffixView<'a, V> {
    /// The source tree for this view
    tree: &'a Tree<V>,

    /// The suffix defining this view
    suffix: Vec<u8>,

    /// Edges whose subtrees hold exactly the matching keys
    edges: &'a [Edge<V>],
}

impl<'a, V> SuffixView<'a, V> {
    pub(crate) fn new(tree: &'a Tree<V>, suffix: &[u8]) -> Self {
        SuffixView {
            tree,
            suffix: suffix.to_vec(),
            edges: tree.root.suffix_edges(suffix),
        }
    }

    /// Returns the suffix of this view.
    pub fn suffix(&self) -> &[u8] {
        &self.suffix
    }

    /// Returns the underlying tree.
    pub fn tree(&self) -> &'a Tree<V> {
        self.tree
    }

    /// Returns the number of keys in this view.
    ///
    /// This walks the matching subtree.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns whether no stored key ends with the suffix.
    pub fn is_empty(&self) -> bool {
        // Inner nodes are never empty, so any edge means at least one key
        self.edges.is_empty()
    }

    /// Checks if the view contains a key.
    ///
    /// Only returns true if the key is in the tree and ends with the suffix.
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Gets the value for a key if it exists in this view.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&'a V> {
        let key = key.as_ref();
        if !has_suffix(key, &self.suffix) {
            return None;
        }
        self.tree.root.get(key).map(|leaf| &leaf.value)
    }

    /// Returns an iterator over the key-value pairs in the view.
    pub fn iter(&self) -> Iter<'a, V> {
        Iter::new(self.edges)
    }
}

impl<'a, V> Clone for SuffixView<'a, V> {
    fn clone(&self) -> Self {
        SuffixView {
            tree: self.tree,
            suffix: self.suffix.clone(),
            edges: self.edges,
        }
    }
}

impl<'a, V: fmt::Debug> fmt::Debug for SuffixView<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuffixView")
            .field("suffix", &String::from_utf8_lossy(&self.suffix))
            .field("len", &self.len())
            .finish()
    }
}

impl<'a, 'b, V> IntoIterator for &'b SuffixView<'a, V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over stored key-value pairs.
///
/// Keys are yielded as the bytes they were inserted with. The traversal is
/// depth-first with an explicit stack, so deep trees do not grow the call
/// stack. The order is unspecified.
pub struct Iter<'a, V> {
    /// Pending edges of every node on the current path
    stack: Vec<slice::Iter<'a, Edge<V>>>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(edges: &'a [Edge<V>]) -> Self {
        Iter {
            stack: vec![edges.iter()],
        }
    }
}

impl<'a, V> Clone for Iter<'a, V> {
    fn clone(&self) -> Self {
        Iter {
            stack: self.stack.clone(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.stack.last_mut()?.next();
            let edge = match next {
                Some(edge) => edge,
                None => {
                    self.stack.pop();
                    continue;
                }
            };
            match &edge.target {
                Target::Leaf(leaf) => return Some((&leaf.origin_key[..], &leaf.value)),
                Target::Node(node) => self.stack.push(node.edges.iter()),
            }
        }
    }
}

impl<'a, V> std::iter::FusedIterator for Iter<'a, V> {}
