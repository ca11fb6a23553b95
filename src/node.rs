//! Internal node implementation for the reversed radix tree.
//!
//! A `Node` owns a list of `Edge`s sorted by label length. Each edge ends
//! either in a child `Node` or in a `Leaf` carrying the stored value and the
//! key it was inserted under. Labels are matched against the right end of a
//! key, so walking from the root towards a leaf consumes the key from its
//! last byte backwards.
//!
//! Every node keeps the following shape:
//!
//! - edges are sorted by label length, shortest first;
//! - an empty label can only appear once, at index 0, and always ends in a leaf;
//! - two non-empty labels of one node never end with the same byte;
//! - every node below the root has at least two edges.

use std::mem;

use tracing::trace;

use crate::util::{has_suffix, suffix_cmp, SuffixCmp};
use crate::InvariantError;

/// A stored entry.
#[derive(Debug, Clone)]
pub(crate) struct Leaf<V> {
    /// The full key, kept so walks never rebuild it from labels.
    pub origin_key: Vec<u8>,
    pub value: V,
}

/// What an edge points at.
#[derive(Debug, Clone)]
pub(crate) enum Target<V> {
    Leaf(Leaf<V>),
    Node(Node<V>),
}

impl<V> Target<V> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Target::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf<V>> {
        match self {
            Target::Leaf(leaf) => Some(leaf),
            Target::Node(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf<V>> {
        match self {
            Target::Leaf(leaf) => Some(leaf),
            Target::Node(_) => None,
        }
    }

    fn as_node_mut(&mut self) -> &mut Node<V> {
        match self {
            Target::Node(node) => node,
            Target::Leaf(_) => unreachable!("expected an inner node, found a leaf"),
        }
    }

    fn into_leaf(self) -> Leaf<V> {
        match self {
            Target::Leaf(leaf) => leaf,
            Target::Node(_) => unreachable!("expected a leaf, found an inner node"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Edge<V> {
    pub label: Vec<u8>,
    pub target: Target<V>,
}

impl<V> Edge<V> {
    fn new(label: Vec<u8>, target: Target<V>) -> Self {
        Edge { label, target }
    }

    fn leaf(label: &[u8], origin_key: &[u8], value: V) -> Self {
        Edge::new(
            label.to_vec(),
            Target::Leaf(Leaf {
                origin_key: origin_key.to_vec(),
                value,
            }),
        )
    }

    fn replace_value(&mut self, value: V) -> V {
        match &mut self.target {
            Target::Leaf(leaf) => mem::replace(&mut leaf.value, value),
            Target::Node(_) => unreachable!("expected a leaf, found an inner node"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node<V> {
    pub edges: Vec<Edge<V>>,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Node::new()
    }
}

// Tear down without recursion; a tree is as deep as its longest key
impl<V> Drop for Node<V> {
    fn drop(&mut self) {
        let mut pending = mem::take(&mut self.edges);
        while let Some(edge) = pending.pop() {
            if let Target::Node(mut node) = edge.target {
                pending.append(&mut node.edges);
            }
        }
    }
}

// Copy without recursion, filling each node's edges before handing it to its parent
impl<V: Clone> Clone for Node<V> {
    fn clone(&self) -> Self {
        let mut finished = Node::new();
        let mut stack: Vec<(&Node<V>, Vec<Edge<V>>)> =
            vec![(self, Vec::with_capacity(self.edges.len()))];

        while let Some((source, copied)) = stack.last_mut() {
            let source: &Node<V> = *source;
            match source.edges.get(copied.len()) {
                Some(edge) => match &edge.target {
                    Target::Leaf(leaf) => copied.push(Edge::new(
                        edge.label.clone(),
                        Target::Leaf(leaf.clone()),
                    )),
                    Target::Node(child) => {
                        stack.push((child, Vec::with_capacity(child.edges.len())))
                    }
                },
                None => {
                    let node = Node::with_edges(mem::take(copied));
                    stack.pop();
                    match stack.last_mut() {
                        Some((parent, copied)) => {
                            let label = parent.edges[copied.len()].label.clone();
                            copied.push(Edge::new(label, Target::Node(node)));
                        }
                        None => finished = node,
                    }
                }
            }
        }

        finished
    }
}

impl<V> Node<V> {
    pub fn new() -> Self {
        Node { edges: Vec::new() }
    }

    fn with_edges(edges: Vec<Edge<V>>) -> Self {
        Node { edges }
    }

    fn has_empty_label(&self) -> bool {
        self.edges.first().map_or(false, |edge| edge.label.is_empty())
    }

    /// Inserts `edge` before the first edge with a strictly longer label.
    pub(crate) fn insert_edge(&mut self, edge: Edge<V>) {
        debug_assert!(
            !(edge.label.is_empty() && self.has_empty_label()),
            "a node holds at most one empty label"
        );
        let len = edge.label.len();
        let idx = self.edges.partition_point(|e| e.label.len() <= len);
        self.edges.insert(idx, edge);
    }

    pub(crate) fn remove_edge(&mut self, idx: usize) -> Edge<V> {
        self.edges.remove(idx)
    }

    /// Moves the edge at `idx`, whose label did not get shorter, rightwards
    /// to its sorted position.
    pub(crate) fn rebalance_after_grow(&mut self, idx: usize) {
        let len = self.edges[idx].label.len();
        debug_assert!(idx == 0 || self.edges[idx - 1].label.len() <= len);
        let shift = self.edges[idx + 1..].partition_point(|e| e.label.len() <= len);
        self.edges[idx..=idx + shift].rotate_left(1);
    }

    /// Moves the edge at `idx`, whose label got shorter, leftwards to its
    /// sorted position.
    pub(crate) fn rebalance_after_shrink(&mut self, idx: usize) {
        let len = self.edges[idx].label.len();
        debug_assert!(self.edges.get(idx + 1).map_or(true, |e| e.label.len() >= len));
        let to = self.edges[..idx].partition_point(|e| e.label.len() <= len);
        self.edges[to..=idx].rotate_right(1);
    }

    // Before: node - "label" -> leaf(old)
    // After:  node - "label" -> node - "" -> leaf(old)
    //                                 |- head -> leaf(new)
    fn hoist_leaf(&mut self, idx: usize, head: &[u8], origin_key: &[u8], value: V) {
        let edge = &mut self.edges[idx];
        let old = mem::replace(&mut edge.target, Target::Node(Node::new()));
        trace!(label_len = edge.label.len(), head_len = head.len(), "hoist leaf");
        edge.target = Target::Node(Node::with_edges(vec![
            Edge::new(Vec::new(), old),
            Edge::leaf(head, origin_key, value),
        ]));
    }

    // Before: node - "label" -> target
    // After:  node - "bel" -> node - "la" -> target
    //                             |- key remainder -> leaf(new)
    fn split_edge(&mut self, idx: usize, key: &[u8], gap: usize, origin_key: &[u8], value: V) {
        let shared = gap - 1;
        let edge = &mut self.edges[idx];

        let cut = edge.label.len() - shared;
        let shared_label = edge.label.split_off(cut);
        let rest = mem::replace(&mut edge.label, shared_label);
        let old = mem::replace(&mut edge.target, Target::Node(Node::new()));

        let old_edge = Edge::new(rest, old);
        let key_edge = Edge::leaf(&key[..key.len() - shared], origin_key, value);
        trace!(
            shared,
            old_len = old_edge.label.len(),
            new_len = key_edge.label.len(),
            "split edge"
        );
        let edges = if old_edge.label.len() < key_edge.label.len() {
            vec![old_edge, key_edge]
        } else {
            vec![key_edge, old_edge]
        };
        edge.target = Target::Node(Node::with_edges(edges));
        self.rebalance_after_shrink(idx);
    }

    /// Collapses the child behind edge `idx` into that edge once it is down
    /// to a single edge of its own.
    fn merge_child(&mut self, idx: usize) {
        let edge = &mut self.edges[idx];
        let child = edge.target.as_node_mut();
        debug_assert!(!child.edges.is_empty(), "inner node lost all of its edges");
        if child.edges.len() != 1 {
            return;
        }
        let grandchild = child.remove_edge(0);
        let mut label = grandchild.label;
        label.extend_from_slice(&edge.label);
        trace!(label_len = label.len(), "merge child");
        edge.label = label;
        edge.target = grandchild.target;
        self.rebalance_after_grow(idx);
    }

    /// Stores `value` under `origin_key`, returning the value it replaced.
    pub(crate) fn insert(&mut self, origin_key: &[u8], value: V) -> Option<V> {
        let mut node = self;
        let mut key = origin_key;
        loop {
            let start = if node.has_empty_label() {
                // The empty label is handled apart so the rest never share a suffix
                if key.is_empty() {
                    return Some(node.edges[0].replace_value(value));
                }
                1
            } else {
                0
            };

            let hit = (start..node.edges.len()).find_map(|idx| {
                match suffix_cmp(key, &node.edges[idx].label) {
                    SuffixCmp::Diverge(1) => None,
                    cmp => Some((idx, cmp)),
                }
            });
            let (idx, cmp) = match hit {
                Some(hit) => hit,
                None => {
                    node.insert_edge(Edge::leaf(key, origin_key, value));
                    return None;
                }
            };
            debug_assert!(
                node.edges[idx + 1..]
                    .iter()
                    .all(|edge| suffix_cmp(key, &edge.label) == SuffixCmp::Diverge(1)),
                "more than one edge shares a suffix with the key"
            );
            trace!(edge = idx, cmp = cmp.code(), "insert descend");

            match cmp {
                SuffixCmp::Equal => {
                    if node.edges[idx].target.is_leaf() {
                        return Some(node.edges[idx].replace_value(value));
                    }
                    node = node.edges[idx].target.as_node_mut();
                    key = &[];
                }
                SuffixCmp::Longer(gap) => {
                    let head = &key[..key.len() - gap + 1];
                    if node.edges[idx].target.is_leaf() {
                        node.hoist_leaf(idx, head, origin_key, value);
                        return None;
                    }
                    node = node.edges[idx].target.as_node_mut();
                    key = head;
                }
                SuffixCmp::Diverge(gap) => {
                    node.split_edge(idx, key, gap, origin_key, value);
                    return None;
                }
            }
        }
    }

    /// Follows `key` down to the leaf stored under it, reporting the index of
    /// every edge taken on the way.
    fn descend(&self, mut key: &[u8], mut on_edge: impl FnMut(usize)) -> Option<&Leaf<V>> {
        let mut node = self;
        'descend: loop {
            let start = match node.edges.first() {
                Some(first) if first.label.is_empty() => {
                    if key.is_empty() {
                        on_edge(0);
                        return first.target.as_leaf();
                    }
                    1
                }
                _ => 0,
            };

            for (idx, edge) in node.edges.iter().enumerate().skip(start) {
                if key.len() < edge.label.len() {
                    // Every later label is at least as long
                    break;
                }
                if !has_suffix(key, &edge.label) {
                    continue;
                }
                on_edge(idx);
                key = &key[..key.len() - edge.label.len()];
                match &edge.target {
                    Target::Node(child) => {
                        node = child;
                        continue 'descend;
                    }
                    Target::Leaf(leaf) => return if key.is_empty() { Some(leaf) } else { None },
                }
            }

            return None;
        }
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<&Leaf<V>> {
        self.descend(key, |_| {})
    }

    /// Indices of the edges leading from this node to the leaf for `key`.
    fn path_to(&self, key: &[u8]) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let found = self.descend(key, |idx| path.push(idx)).is_some();
        if found {
            Some(path)
        } else {
            None
        }
    }

    fn node_at_mut(&mut self, path: &[usize]) -> &mut Node<V> {
        path.iter()
            .fold(self, |node, &idx| node.edges[idx].target.as_node_mut())
    }

    pub(crate) fn get_mut(&mut self, key: &[u8]) -> Option<&mut Leaf<V>> {
        let path = self.path_to(key)?;
        let (&last, parents) = path.split_last()?;
        self.node_at_mut(parents).edges[last].target.as_leaf_mut()
    }

    /// Finds the leaf whose key is the longest suffix of `key`.
    pub(crate) fn longest_suffix(&self, mut key: &[u8]) -> Option<&Leaf<V>> {
        let mut node = self;
        // Deepest empty-label leaf seen so far; its key is a suffix of the query
        let mut fallback = None;
        'descend: loop {
            let start = match node.edges.first() {
                Some(first) if first.label.is_empty() => {
                    let leaf = first.target.as_leaf();
                    if key.is_empty() {
                        return leaf;
                    }
                    fallback = leaf;
                    1
                }
                _ => 0,
            };

            for edge in &node.edges[start..] {
                if key.len() < edge.label.len() {
                    break;
                }
                if !has_suffix(key, &edge.label) {
                    continue;
                }
                key = &key[..key.len() - edge.label.len()];
                match &edge.target {
                    Target::Leaf(leaf) => return Some(leaf),
                    Target::Node(child) => {
                        node = child;
                        continue 'descend;
                    }
                }
            }

            return fallback;
        }
    }

    /// Returns the edges whose subtrees hold exactly the keys ending with
    /// `suffix`.
    pub(crate) fn suffix_edges(&self, mut suffix: &[u8]) -> &[Edge<V>] {
        let mut node = self;
        'descend: loop {
            if suffix.is_empty() {
                return &node.edges;
            }

            for edge in &node.edges {
                if edge.label.is_empty() {
                    continue;
                }
                if edge.label.len() >= suffix.len() {
                    if has_suffix(&edge.label, suffix) {
                        return std::slice::from_ref(edge);
                    }
                    continue;
                }
                if !has_suffix(suffix, &edge.label) {
                    continue;
                }
                match &edge.target {
                    Target::Node(child) => {
                        suffix = &suffix[..suffix.len() - edge.label.len()];
                        node = child;
                        continue 'descend;
                    }
                    // The stored key is shorter than the suffix
                    Target::Leaf(_) => return &[],
                }
            }

            return &[];
        }
    }

    /// Removes the leaf stored under `key`, collapsing its parent node if it
    /// is left with a single edge.
    pub(crate) fn remove(&mut self, key: &[u8]) -> Option<Leaf<V>> {
        let mut path = self.path_to(key)?;
        let leaf_idx = path.pop()?;
        let leaf = self
            .node_at_mut(&path)
            .remove_edge(leaf_idx)
            .target
            .into_leaf();
        if let Some(child_idx) = path.pop() {
            self.node_at_mut(&path).merge_child(child_idx);
        }
        Some(leaf)
    }

    /// Verifies the structural rules of the subtree rooted here, treating
    /// this node as the root. Returns the number of leaves.
    pub(crate) fn check(&self) -> Result<usize, InvariantError> {
        let mut leaves = 0;
        let mut stack: Vec<(&Node<V>, Vec<u8>)> = vec![(self, Vec::new())];

        while let Some((node, path)) = stack.pop() {
            if !std::ptr::eq(node, self) && node.edges.len() < 2 {
                return Err(InvariantError::DegenerateNode {
                    path: render(&path),
                    edges: node.edges.len(),
                });
            }

            let mut last_bytes = [false; 256];
            for (idx, edge) in node.edges.iter().enumerate() {
                if idx > 0 {
                    let previous = node.edges[idx - 1].label.len();
                    if edge.label.len() < previous {
                        return Err(InvariantError::UnsortedEdges {
                            path: render(&path),
                            index: idx,
                            previous,
                            current: edge.label.len(),
                        });
                    }
                }

                match edge.label.last() {
                    None => {
                        if idx != 0 {
                            return Err(InvariantError::MisplacedEmptyLabel {
                                path: render(&path),
                                index: idx,
                            });
                        }
                        if !edge.target.is_leaf() {
                            return Err(InvariantError::EmptyLabelToNode { path: render(&path) });
                        }
                    }
                    Some(&byte) => {
                        if mem::replace(&mut last_bytes[byte as usize], true) {
                            return Err(InvariantError::SharedLastByte {
                                path: render(&path),
                                byte,
                            });
                        }
                    }
                }

                let mut key = edge.label.clone();
                key.extend_from_slice(&path);
                match &edge.target {
                    Target::Leaf(leaf) => {
                        if leaf.origin_key != key {
                            return Err(InvariantError::OriginMismatch {
                                path_key: render(&key),
                                origin_key: render(&leaf.origin_key),
                            });
                        }
                        leaves += 1;
                    }
                    Target::Node(child) => stack.push((child, key)),
                }
            }
        }

        Ok(leaves)
    }
}

fn render(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
