//! Stepscope Tree Layout
//!
//! Assigns non-overlapping 2-D coordinates to binary tree nodes for
//! rendering, and derives the edge list between them.
//!
//! # Spacing
//!
//! Horizontal spacing halves at every level down the tree:
//!
//! ```text
//! offset(L) = 2^max(0, H - L - 2) * UNIT
//! ```
//!
//! where `H` is the tree height and `L` the level of the parent (root = 0).
//! Sibling subtrees can never interleave, whatever the shape. Unbalanced
//! trees waste horizontal space in exchange.
//!
//! # Input
//!
//! Trees are parsed from level-order arrays (`[1, 2, null, 3]`). Node ids are
//! array indices, so traces can reference nodes by id. Malformed encodings
//! are rejected at parse time and never reach the layout pass.

mod error;
mod layout;
mod tree;

pub use error::{Error, Result};
pub use layout::{
    derive_edges, layout_tree, layout_tree_with, Edge, LayoutConfig, Point, PositionedNode,
    TreeLayout, MAX_DEPTH, ROW_HEIGHT, UNIT,
};
pub use tree::{parse_level_order, tree_height, BinaryTree, NodeId, TreeNode};
