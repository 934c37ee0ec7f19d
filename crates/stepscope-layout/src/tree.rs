//! Binary tree input structure and level-order parsing.
//!
//! Trees arrive as level-order arrays, `[1, 2, 3, null, 4]`, where `null`
//! marks a missing child and missing nodes have no children of their own.
//! Node ids are positions in that array, so they are stable for a given
//! input and can be referenced from trace steps.

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Identifier of a tree node: its index in the level-order input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

impl NodeId {
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of a binary tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    pub value: i64,
    pub left: Option<Box<TreeNode>>,
    pub right: Option<Box<TreeNode>>,
}

impl TreeNode {
    /// Create a node without children.
    pub fn leaf(id: usize, value: i64) -> Self {
        Self {
            id: NodeId(id),
            value,
            left: None,
            right: None,
        }
    }

    /// Attach a left child.
    #[must_use]
    pub fn with_left(mut self, child: TreeNode) -> Self {
        self.left = Some(Box::new(child));
        self
    }

    /// Attach a right child.
    #[must_use]
    pub fn with_right(mut self, child: TreeNode) -> Self {
        self.right = Some(Box::new(child));
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Left and right child, in that order.
    pub fn children(&self) -> [Option<&TreeNode>; 2] {
        [self.left.as_deref(), self.right.as_deref()]
    }
}

/// Height of the tree rooted at `root`: 0 when empty, 1 for a single node.
///
/// Iterative, so arbitrarily deep inputs are measured without recursion.
pub fn tree_height(root: Option<&TreeNode>) -> usize {
    let mut stack: Vec<(&TreeNode, usize)> = root.map(|r| (r, 1)).into_iter().collect();
    let mut height = 0;
    while let Some((node, depth)) = stack.pop() {
        height = height.max(depth);
        for child in node.children().into_iter().flatten() {
            stack.push((child, depth + 1));
        }
    }
    height
}

/// An owned binary tree parsed from a level-order encoding.
///
/// `Clone`, `PartialEq`, `Debug` and `Drop` are iterative, so chains far
/// deeper than the call stack are safe to copy, compare and free.
#[derive(Default)]
pub struct BinaryTree {
    root: Option<Box<TreeNode>>,
    len: usize,
}

struct Slot {
    value: i64,
    index: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl BinaryTree {
    /// A tree without nodes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an existing node structure.
    pub fn from_root(root: TreeNode) -> Self {
        let mut len = 0;
        let mut stack = vec![&root];
        while let Some(node) = stack.pop() {
            len += 1;
            stack.extend(node.children().into_iter().flatten());
        }
        Self {
            root: Some(Box::new(root)),
            len,
        }
    }

    /// Build a tree from a level-order array.
    ///
    /// Trailing `None`s are allowed. A value with no parent slot left to
    /// attach to is rejected.
    pub fn from_level_order(values: &[Option<i64>]) -> Result<Self> {
        let Some(&first) = values.first() else {
            return Ok(Self::empty());
        };
        let Some(root_value) = first else {
            return match values.iter().position(Option::is_some) {
                Some(index) => Err(Error::Orphan { index }),
                None => Ok(Self::empty()),
            };
        };

        // Resolve structure by index first, then assemble boxes bottom-up.
        let mut slots = vec![Slot {
            value: root_value,
            index: 0,
            left: None,
            right: None,
        }];
        let mut queue = VecDeque::from([0usize]);
        let mut cursor = 1;

        while cursor < values.len() {
            let Some(parent) = queue.pop_front() else {
                break;
            };
            for is_left in [true, false] {
                if cursor >= values.len() {
                    break;
                }
                if let Some(value) = values[cursor] {
                    let slot = slots.len();
                    slots.push(Slot {
                        value,
                        index: cursor,
                        left: None,
                        right: None,
                    });
                    if is_left {
                        slots[parent].left = Some(slot);
                    } else {
                        slots[parent].right = Some(slot);
                    }
                    queue.push_back(slot);
                }
                cursor += 1;
            }
        }

        if let Some(offset) = values[cursor.min(values.len())..]
            .iter()
            .position(Option::is_some)
        {
            return Err(Error::Orphan {
                index: cursor + offset,
            });
        }

        // Children always sit at higher slot indices than their parent.
        let len = slots.len();
        let mut built: Vec<Option<Box<TreeNode>>> = (0..len).map(|_| None).collect();
        for k in (0..len).rev() {
            let slot = &slots[k];
            let left = slot.left.and_then(|c| built[c].take());
            let right = slot.right.and_then(|c| built[c].take());
            built[k] = Some(Box::new(TreeNode {
                id: NodeId(slot.index),
                value: slot.value,
                left,
                right,
            }));
        }

        Ok(Self {
            root: built[0].take(),
            len,
        })
    }

    /// Parse a JSON level-order array such as `[1, 2, null, 3]`.
    pub fn parse(input: &str) -> Result<Self> {
        let values = parse_level_order(input)?;
        Self::from_level_order(&values)
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_deref()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn height(&self) -> usize {
        tree_height(self.root())
    }

    /// Nodes in pre-order (node, left subtree, right subtree).
    pub fn preorder(&self) -> Vec<&TreeNode> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&TreeNode> = self.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = node.left.as_deref() {
                stack.push(left);
            }
        }
        out
    }

    /// Look up a node by id.
    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        self.preorder().into_iter().find(|n| n.id == id)
    }
}

impl Clone for BinaryTree {
    fn clone(&self) -> Self {
        // Flatten in pre-order, then rebuild from the last slot back: every
        // child sits after its parent, so it is built first.
        let mut slots: Vec<(NodeId, i64, Option<usize>, Option<usize>)> =
            Vec::with_capacity(self.len);
        let mut stack: Vec<(&TreeNode, Option<(usize, bool)>)> =
            self.root().map(|r| (r, None)).into_iter().collect();

        while let Some((node, parent)) = stack.pop() {
            let index = slots.len();
            slots.push((node.id, node.value, None, None));
            match parent {
                Some((p, true)) => slots[p].2 = Some(index),
                Some((p, false)) => slots[p].3 = Some(index),
                None => {}
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, Some((index, false))));
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, Some((index, true))));
            }
        }

        let mut built: Vec<Option<Box<TreeNode>>> = (0..slots.len()).map(|_| None).collect();
        for (index, &(id, value, left, right)) in slots.iter().enumerate().rev() {
            let node = TreeNode {
                id,
                value,
                left: left.and_then(|i| built[i].take()),
                right: right.and_then(|i| built[i].take()),
            };
            built[index] = Some(Box::new(node));
        }

        Self {
            root: built.first_mut().and_then(Option::take),
            len: self.len,
        }
    }
}

impl PartialEq for BinaryTree {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        let mut stack = vec![(self.root(), other.root())];
        while let Some(pair) = stack.pop() {
            match pair {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    if a.id != b.id || a.value != b.value {
                        return false;
                    }
                    stack.push((a.left.as_deref(), b.left.as_deref()));
                    stack.push((a.right.as_deref(), b.right.as_deref()));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for BinaryTree {}

impl std::fmt::Debug for BinaryTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nodes: Vec<(usize, i64)> = self.preorder().iter().map(|n| (n.id.0, n.value)).collect();
        f.debug_struct("BinaryTree")
            .field("len", &self.len)
            .field("preorder", &nodes)
            .finish()
    }
}

impl Drop for BinaryTree {
    fn drop(&mut self) {
        // Unlink iteratively; the default recursive drop overflows on long chains.
        let mut stack: Vec<Box<TreeNode>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

/// Parse a JSON array of integers and `null`s.
pub fn parse_level_order(input: &str) -> Result<Vec<Option<i64>>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let json: serde_json::Value = serde_json::from_str(trimmed)?;
    let serde_json::Value::Array(items) = json else {
        return Err(Error::InvalidEncoding("expected a JSON array".into()));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Number(n) => n.as_i64().map(Some).ok_or(Error::NonInteger { index }),
            _ => Err(Error::NonInteger { index }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_encodings() {
        assert!(BinaryTree::parse("[]").unwrap().is_empty());
        assert!(BinaryTree::parse("").unwrap().is_empty());
        assert!(BinaryTree::parse("[null]").unwrap().is_empty());
        assert_eq!(BinaryTree::empty().height(), 0);
    }

    #[test]
    fn ids_are_level_order_indices() {
        let tree = BinaryTree::parse("[1, 2, 3, null, 4]").unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.height(), 3);

        let root = tree.root().unwrap();
        assert_eq!((root.id, root.value), (NodeId(0), 1));

        let left = root.left.as_deref().unwrap();
        assert_eq!((left.id, left.value), (NodeId(1), 2));
        assert!(left.left.is_none());

        let grandchild = left.right.as_deref().unwrap();
        assert_eq!((grandchild.id, grandchild.value), (NodeId(4), 4));

        let right = root.right.as_deref().unwrap();
        assert_eq!((right.id, right.value), (NodeId(2), 3));
        assert!(right.is_leaf());
    }

    #[test]
    fn nulls_have_no_children() {
        // 5's children are at indices 3 and 4; the null at 2 contributes none.
        let tree = BinaryTree::parse("[1, null, 5, 6, 7]").unwrap();
        let five = tree.find(NodeId(2)).unwrap();
        assert_eq!(five.value, 5);
        assert_eq!(five.left.as_ref().map(|n| n.id), Some(NodeId(3)));
        assert_eq!(five.right.as_ref().map(|n| n.id), Some(NodeId(4)));
    }

    #[test]
    fn preorder_visits_left_first() {
        let tree = BinaryTree::parse("[1, 2, 3, 4, 5, 6, 7]").unwrap();
        let values: Vec<_> = tree.preorder().iter().map(|n| n.value).collect();
        assert_eq!(values, vec![1, 2, 4, 5, 3, 6, 7]);
    }

    #[test]
    fn rejects_non_integers() {
        assert!(matches!(
            BinaryTree::parse("[1, \"two\", 3]"),
            Err(Error::NonInteger { index: 1 })
        ));
        assert!(matches!(
            BinaryTree::parse("[1, 2.5]"),
            Err(Error::NonInteger { index: 1 })
        ));
    }

    #[test]
    fn rejects_non_arrays() {
        assert!(matches!(
            BinaryTree::parse("{\"root\": 1}"),
            Err(Error::InvalidEncoding(_))
        ));
        assert!(matches!(BinaryTree::parse("[1, 2"), Err(Error::Json(_))));
    }

    #[test]
    fn rejects_orphans() {
        assert!(matches!(
            BinaryTree::parse("[null, 1]"),
            Err(Error::Orphan { index: 1 })
        ));
        // Both children of 1 are null, so 9 has nowhere to go.
        assert!(matches!(
            BinaryTree::parse("[1, null, null, 9]"),
            Err(Error::Orphan { index: 3 })
        ));
        // Trailing nulls are fine.
        assert_eq!(BinaryTree::parse("[1, null, null, null]").unwrap().len(), 1);
    }

    #[test]
    fn long_chains_build_and_drop() {
        let depth = 50_000;
        let mut values = vec![Some(0)];
        for i in 1..depth {
            values.push(None);
            values.push(Some(i));
        }
        let tree = BinaryTree::from_level_order(&values).unwrap();
        assert_eq!(tree.len(), depth as usize);
        assert_eq!(tree.height(), depth as usize);
    }

    #[test]
    fn long_chains_clone_and_compare() {
        let depth = 200_000;
        let mut values = vec![Some(0)];
        for i in 1..depth {
            values.push(Some(i));
            values.push(None);
        }
        let tree = BinaryTree::from_level_order(&values).unwrap();
        let copy = tree.clone();
        assert_eq!(copy.len(), tree.len());
        assert_eq!(copy.height(), depth as usize);
        assert!(copy == tree);

        let mut values = values;
        let last = values.len() - 2;
        values[last] = Some(-1);
        let changed = BinaryTree::from_level_order(&values).unwrap();
        assert!(changed != tree);
    }

    #[test]
    fn clone_keeps_shape_and_ids() {
        let tree = BinaryTree::parse("[1, 2, 3, null, 4, 5]").unwrap();
        let copy = tree.clone();
        assert_eq!(copy, tree);
        assert_eq!(copy.root(), tree.root());
        assert_eq!(copy.find(NodeId(4)).map(|n| n.value), Some(4));
        assert_eq!(format!("{:?}", copy), format!("{:?}", tree));

        let mirrored = BinaryTree::parse("[1, 3, 2, 4, null, null, 5]").unwrap();
        assert_ne!(mirrored, tree);
        assert_ne!(BinaryTree::empty(), tree);
        assert_eq!(BinaryTree::empty(), BinaryTree::empty().clone());
    }

    #[test]
    fn from_root_counts_nodes() {
        let root = TreeNode::leaf(0, 1)
            .with_left(TreeNode::leaf(1, 2))
            .with_right(TreeNode::leaf(2, 3).with_left(TreeNode::leaf(5, 4)));
        let tree = BinaryTree::from_root(root);
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.height(), 3);
    }
}
