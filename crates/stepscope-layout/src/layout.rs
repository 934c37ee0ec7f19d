//! Coordinate assignment for binary trees.
//!
//! The root sits at the configured origin. A node at level `L` (root = 0) in
//! a tree of height `H` places its children `2^max(0, H - L - 2) * unit` to
//! the left and right, one row below. Spacing halves at every level, which
//! keeps sibling subtrees apart for every shape: the subtree under a child
//! at level `L + 1` spans at most `(2^(H - L - 2) - 1) * unit` to either side
//! of it, strictly less than the parent's offset.
//!
//! Coordinates are `f64`. Offsets at the top of a tall tree dwarf `unit`, so
//! past a certain height `x ± unit` no longer yields a distinct value. Such
//! trees are rejected along with those deeper than the configured maximum;
//! see [`LayoutConfig::depth_limit`].
//!
//! Layout depends only on tree shape. It runs once per input tree, not per
//! step.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::tree::{tree_height, NodeId, TreeNode};

/// Horizontal spacing unit between the two deepest levels.
pub const UNIT: f64 = 40.0;

/// Vertical distance between levels.
pub const ROW_HEIGHT: f64 = 80.0;

/// Configured depth cap. The effective limit is also bounded by
/// coordinate precision, see [`LayoutConfig::depth_limit`].
pub const MAX_DEPTH: usize = 1000;

/// A 2-D position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendering constants for the layout pass.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Horizontal spacing unit
    pub unit: f64,
    /// Vertical distance between levels
    pub row_height: f64,
    /// Position of the root
    pub origin: Point,
    /// Trees deeper than this are rejected
    pub max_depth: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            unit: UNIT,
            row_height: ROW_HEIGHT,
            origin: Point::new(0.0, 40.0),
            max_depth: MAX_DEPTH,
        }
    }
}

impl LayoutConfig {
    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: f64) -> Self {
        self.unit = unit;
        self
    }

    #[must_use]
    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Horizontal offset from a node at `level` to each of its children.
    pub fn child_offset(&self, height: usize, level: usize) -> f64 {
        let exp = height.saturating_sub(level + 2);
        self.unit * 2f64.powi(i32::try_from(exp).unwrap_or(i32::MAX))
    }

    /// Tallest tree this configuration lays out: `max_depth`, lowered to the
    /// last height at which every node still gets distinct coordinates.
    pub fn depth_limit(&self) -> usize {
        let mut limit = 1;
        while limit < self.max_depth && self.separable(limit + 1) {
            limit += 1;
        }
        limit.min(self.max_depth)
    }

    /// Whether a tree of `height` keeps nodes `2 * unit` apart at the bottom
    /// after rounding. Each of the `height` additions along a path rounds by
    /// at most half an ulp of the largest coordinate.
    fn separable(&self, height: usize) -> bool {
        let reach = self.origin.x.abs() + 2.0 * self.child_offset(height, 0);
        (height as f64) * reach * f64::EPSILON < self.unit
    }
}

/// A node with its assigned position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionedNode {
    pub id: NodeId,
    pub value: i64,
    pub x: f64,
    pub y: f64,
    /// Level in the tree, root = 0
    pub depth: usize,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl PositionedNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A parent to child connection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub source_pos: Point,
    pub target_pos: Point,
}

/// Positioned nodes (pre-order) and the edges between them.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeLayout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
    pub height: usize,
}

impl TreeLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// `(min, max)` corners of the bounding box, `None` when empty.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = self.nodes.first()?;
        let init = (first.position(), first.position());
        Some(self.nodes.iter().fold(init, |(lo, hi), n| {
            (
                Point::new(lo.x.min(n.x), lo.y.min(n.y)),
                Point::new(hi.x.max(n.x), hi.y.max(n.y)),
            )
        }))
    }
}

/// Lay out a tree with the default rendering constants.
pub fn layout_tree(root: Option<&TreeNode>) -> Result<TreeLayout> {
    layout_tree_with(&LayoutConfig::default(), root)
}

/// Lay out a tree.
///
/// Fails with [`Error::TooDeep`] when the tree is taller than
/// [`LayoutConfig::depth_limit`]; the check runs before any coordinates are
/// assigned.
pub fn layout_tree_with(config: &LayoutConfig, root: Option<&TreeNode>) -> Result<TreeLayout> {
    let height = tree_height(root);
    let limit = config.depth_limit();
    if height > limit {
        return Err(Error::TooDeep {
            depth: height,
            max: limit,
        });
    }

    let nodes = position_nodes(config, root, height);
    let edges = derive_edges(&nodes);
    debug!(nodes = nodes.len(), edges = edges.len(), height, "tree laid out");

    Ok(TreeLayout {
        nodes,
        edges,
        height,
    })
}

fn position_nodes(config: &LayoutConfig, root: Option<&TreeNode>, height: usize) -> Vec<PositionedNode> {
    let mut nodes = Vec::new();
    let mut stack: Vec<(&TreeNode, Point, usize)> =
        root.map(|r| (r, config.origin, 0)).into_iter().collect();

    while let Some((node, at, level)) = stack.pop() {
        let offset = config.child_offset(height, level);
        let below = at.y + config.row_height;

        nodes.push(PositionedNode {
            id: node.id,
            value: node.value,
            x: at.x,
            y: at.y,
            depth: level,
            left: node.left.as_ref().map(|n| n.id),
            right: node.right.as_ref().map(|n| n.id),
        });

        // Right first so the left subtree is emitted first.
        if let Some(right) = node.right.as_deref() {
            stack.push((right, Point::new(at.x + offset, below), level + 1));
        }
        if let Some(left) = node.left.as_deref() {
            stack.push((left, Point::new(at.x - offset, below), level + 1));
        }
    }

    nodes
}

/// One edge per parent to child relation, in node order.
pub fn derive_edges(nodes: &[PositionedNode]) -> Vec<Edge> {
    let positions: HashMap<NodeId, Point> = nodes.iter().map(|n| (n.id, n.position())).collect();

    nodes
        .iter()
        .flat_map(|parent| {
            [parent.left, parent.right]
                .into_iter()
                .flatten()
                .filter_map(|child| {
                    positions.get(&child).map(|&target_pos| Edge {
                        id: format!("e{}-{}", parent.id, child),
                        source: parent.id,
                        target: child,
                        source_pos: parent.position(),
                        target_pos,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
