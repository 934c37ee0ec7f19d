//! Root-to-leaf path sum over a binary tree.
//!
//! Depth-first search, left subtree first. Each payload carries the current
//! path (`path`, also marked `active`), the running `sum` and the `target`.
//! Once a matching path is found it is carried forward as `success`, so the
//! closing step still shows it.

use stepscope_layout::{BinaryTree, NodeId, TreeNode};
use stepscope_trace::{build_trace, EntityId, Payload, Recorder, StepKind, Trace, Value};
use thiserror::Error;

/// A path sum problem instance.
#[derive(Debug, Clone)]
pub struct PathSum {
    pub tree: BinaryTree,
    pub target: i64,
}

/// The running sum left the `i64` range.
#[derive(Debug, Error)]
#[error("running sum overflowed at node {node}")]
pub struct SumOverflow {
    pub node: NodeId,
}

impl PathSum {
    pub fn new(tree: BinaryTree, target: i64) -> Self {
        Self { tree, target }
    }

    /// Record the search.
    pub fn trace(&self) -> stepscope_trace::Result<Trace> {
        build_trace(self, record)
    }

    /// Every node of the tree, in pre-order.
    pub fn entities(&self) -> Vec<EntityId> {
        self.tree.preorder().iter().map(|n| node_id(n)).collect()
    }
}

fn node_id(node: &TreeNode) -> EntityId {
    EntityId::Node(node.id.index())
}

fn path_ids(path: &[(&TreeNode, i64)]) -> Value {
    Value::ids(path.iter().map(|(n, _)| node_id(n)))
}

/// Instrumented search. `path` holds each node on the current path together
/// with the running sum up to and including it.
pub fn record(rec: &mut Recorder, problem: &PathSum) -> Result<(), SumOverflow> {
    let target = problem.target;
    rec.record(
        StepKind::Start,
        Payload::new()
            .with("target", target)
            .with("path", Value::ids([]))
            .with("sum", 0),
        format!("Look for a root-to-leaf path summing to {}", target),
    );

    let Some(root) = problem.tree.root() else {
        rec.record(
            StepKind::Finish,
            Payload::new().with("target", target).with("found", false),
            "The tree is empty",
        );
        return Ok(());
    };

    let mut path: Vec<(&TreeNode, i64)> = Vec::new();
    let mut stack: Vec<(&TreeNode, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        if path.len() > depth {
            path.truncate(depth);
            if let Some((parent, sum)) = path.last() {
                rec.record(
                    StepKind::Backtrack,
                    Payload::new()
                        .with("target", target)
                        .with("path", path_ids(&path))
                        .with("active", path_ids(&path))
                        .with("sum", *sum),
                    format!("Back up to {}", parent.value),
                );
            }
        }

        let base = path.last().map_or(0, |(_, sum)| *sum);
        let sum = base
            .checked_add(node.value)
            .ok_or(SumOverflow { node: node.id })?;
        path.push((node, sum));

        rec.record(
            StepKind::Visit,
            Payload::new()
                .with("target", target)
                .with("path", path_ids(&path))
                .with("active", path_ids(&path))
                .with("visiting", node_id(node))
                .with("sum", sum),
            format!("Visit {}, running sum {}", node.value, sum),
        );

        if node.is_leaf() {
            let leaf = Payload::new()
                .with("target", target)
                .with("path", path_ids(&path))
                .with("comparing", node_id(node))
                .with("sum", sum);
            rec.record(
                StepKind::Compare,
                leaf.clone().with("active", path_ids(&path)),
                format!("Leaf reached: is {} equal to {}?", sum, target),
            );

            if sum == target {
                let success = path_ids(&path);
                rec.record(
                    StepKind::Match,
                    leaf.with("success", success.clone()),
                    format!("Path sums to {}", target),
                );
                rec.record(
                    StepKind::Finish,
                    Payload::new()
                        .with("target", target)
                        .with("path", success.clone())
                        .with("success", success)
                        .with("sum", sum)
                        .with("found", true),
                    format!("Found a path summing to {}", target),
                );
                return Ok(());
            }

            rec.record(
                StepKind::Mismatch,
                leaf.with("error", node_id(node)),
                format!("{} is not {}", sum, target),
            );
        }

        if let Some(right) = node.right.as_deref() {
            stack.push((right, depth + 1));
        }
        if let Some(left) = node.left.as_deref() {
            stack.push((left, depth + 1));
        }
    }

    rec.record(
        StepKind::Finish,
        Payload::new()
            .with("target", target)
            .with("found", false)
            .with("dimmed", Value::ids(problem.tree.preorder().iter().map(|n| node_id(n)))),
        format!("No root-to-leaf path sums to {}", target),
    );
    Ok(())
}
