//! # Radix Suffix
//!
//! A reversed radix tree: a map keyed by byte strings whose edges are matched
//! against the *end* of a key.
//!
//! Besides exact `get`, `insert` and `remove`, the tree answers two suffix
//! questions efficiently:
//!
//! - **Longest suffix**: given a query `Q`, find the longest stored key that is
//!   a suffix of `Q`.
//! - **Suffix walk**: enumerate every stored key that ends with a given byte
//!   sequence.
//!
//! ## Features
//!
//! - **Generic values**: any `V` can be stored; replaced and removed values are
//!   handed back to the caller
//! - **Compressed**: shared key endings are stored once, nodes are split and
//!   merged as keys come and go
//! - **Stack-safe**: every operation descends iteratively
//! - **Suffix views**: borrowed views over the keys ending with a suffix
//!
//! ## Example
//!
//! ```rust
//! use radix_suffix::Tree;
//!
//! let mut tree = Tree::new();
//! tree.insert("table", "table");
//! tree.insert("able", "able");
//! tree.insert("present", "present");
//!
//! // "able" is also a suffix of the query, but "table" is longer
//! let (key, value) = tree.longest_suffix("presentable").unwrap();
//! assert_eq!(key, b"table");
//! assert_eq!(*value, "table");
//! ```

mod node;
mod suffix_view;
mod tree;
mod util;

// Re-export public types
pub use crate::suffix_view::{Iter, SuffixView};
pub use crate::tree::Tree;

/// A broken structural rule, as reported by [`Tree::check_invariants`].
///
/// Paths are the key bytes consumed from the root down to the offending
/// node, rendered lossily as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    /// Edge labels are not sorted by length
    #[error("edge {index} under {path:?} has label length {current}, shorter than the previous {previous}")]
    UnsortedEdges {
        path: String,
        index: usize,
        previous: usize,
        current: usize,
    },
    /// An empty label appears at a position other than the first
    #[error("empty label at edge {index} under {path:?}")]
    MisplacedEmptyLabel { path: String, index: usize },
    /// An empty label leads to an inner node instead of a leaf
    #[error("empty label under {path:?} leads to an inner node")]
    EmptyLabelToNode { path: String },
    /// Two non-empty labels of one node end with the same byte
    #[error("two labels under {path:?} end with byte {byte:#04x}")]
    SharedLastByte { path: String, byte: u8 },
    /// An inner node below the root has fewer than two edges
    #[error("inner node under {path:?} has {edges} edge(s)")]
    DegenerateNode { path: String, edges: usize },
    /// A leaf's stored key differs from the labels leading to it
    #[error("leaf reached through {path_key:?} stores key {origin_key:?}")]
    OriginMismatch { path_key: String, origin_key: String },
    /// The tree's length differs from the number of leaves
    #[error("tree reports {expected} keys but holds {actual} leaves")]
    CountMismatch { expected: usize, actual: usize },
}
