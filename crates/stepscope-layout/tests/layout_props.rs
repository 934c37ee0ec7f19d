//! Property tests for the tree layout invariants.

use std::collections::HashSet;

use proptest::prelude::*;
use stepscope_layout::{layout_tree, NodeId, TreeLayout, TreeNode, ROW_HEIGHT};

/// Build a tree over heap indices (children of `k` are `2k+1`, `2k+2`),
/// keeping index `k` only when `present[k]` is set and its parent was kept.
fn heap_tree(present: &[bool], k: usize) -> Option<TreeNode> {
    if k >= present.len() || !present[k] {
        return None;
    }
    Some(TreeNode {
        id: NodeId(k),
        value: k as i64,
        left: heap_tree(present, 2 * k + 1).map(Box::new),
        right: heap_tree(present, 2 * k + 2).map(Box::new),
    })
}

/// x-range of the subtree rooted at `id`.
fn subtree_x_range(layout: &TreeLayout, id: NodeId) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let mut stack = vec![id];
    while let Some(id) = stack.pop() {
        let node = layout.node(id).unwrap();
        lo = lo.min(node.x);
        hi = hi.max(node.x);
        stack.extend(node.left);
        stack.extend(node.right);
    }
    (lo, hi)
}

fn random_shape() -> impl Strategy<Value = Vec<bool>> {
    // Depth 1..=10 means up to 2^10 - 1 heap slots.
    (1u32..=10).prop_flat_map(|depth| {
        let slots = (1usize << depth) - 1;
        proptest::collection::vec(prop::bool::weighted(0.7), slots).prop_map(|mut bits| {
            bits[0] = true;
            bits
        })
    })
}

proptest! {
    #[test]
    fn no_two_nodes_share_a_position(present in random_shape()) {
        let root = heap_tree(&present, 0).unwrap();
        let layout = layout_tree(Some(&root)).unwrap();

        let mut seen = HashSet::new();
        for node in &layout.nodes {
            prop_assert!(
                seen.insert((node.x.to_bits(), node.y.to_bits())),
                "duplicate position ({}, {})", node.x, node.y
            );
        }
    }

    #[test]
    fn sibling_subtrees_do_not_overlap(present in random_shape()) {
        let root = heap_tree(&present, 0).unwrap();
        let layout = layout_tree(Some(&root)).unwrap();

        for node in &layout.nodes {
            if let Some(left) = node.left {
                let (_, left_hi) = subtree_x_range(&layout, left);
                prop_assert!(left_hi < node.x);
            }
            if let Some(right) = node.right {
                let (right_lo, _) = subtree_x_range(&layout, right);
                prop_assert!(right_lo > node.x);
            }
            if let (Some(left), Some(right)) = (node.left, node.right) {
                let (_, left_hi) = subtree_x_range(&layout, left);
                let (right_lo, _) = subtree_x_range(&layout, right);
                prop_assert!(left_hi < right_lo);
            }
        }
    }

    #[test]
    fn rows_follow_depth(present in random_shape()) {
        let root = heap_tree(&present, 0).unwrap();
        let layout = layout_tree(Some(&root)).unwrap();
        let origin_y = layout.nodes[0].y;

        for node in &layout.nodes {
            prop_assert_eq!(node.y, origin_y + node.depth as f64 * ROW_HEIGHT);
        }
        prop_assert_eq!(layout.edges.len(), layout.nodes.len() - 1);
    }
}
