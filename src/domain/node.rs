//! Allocation tree: nodes, forest and read-only structural queries.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Largest gap between a parent's value and its children's total that still
/// counts as consistent. Redistributed children are rounded to cents.
pub const ROLLUP_TOLERANCE: f64 = 0.005;

/// A labeled allocation node.
///
/// A node with children is a parent: its `value` is expected to equal the
/// sum of its direct children's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique across the whole tree, stable across edits
    pub id: String,
    /// Display name
    pub label: String,
    /// Current allocation amount
    pub value: f64,
    /// Ordered children, empty for leaves
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(id: impl Into<String>, label: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value,
            children: Vec::new(),
        }
    }

    /// Parent node whose value is the total of `children`.
    pub fn branch(id: impl Into<String>, label: impl Into<String>, children: Vec<Node>) -> Self {
        let value = children.iter().map(|c| c.value).sum();
        Self {
            id: id.into(),
            label: label.into(),
            value,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Sum of the direct children's values, 0 for a leaf.
    pub fn children_total(&self) -> f64 {
        self.children.iter().map(|c| c.value).sum()
    }

    fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.value)
    }
}

/// A parent whose value does not match the total of its children.
#[derive(Debug, Clone, PartialEq)]
pub struct RollupViolation {
    pub id: String,
    pub value: f64,
    pub children_total: f64,
}

impl fmt::Display for RollupViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: value {} != children total {}",
            self.id, self.value, self.children_total
        )
    }
}

/// Ordered forest of root nodes.
///
/// Each tree exclusively owns its nodes. Edits produce a new `Tree`, the
/// previous one stays valid for comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tree {
    roots: Vec<Node>,
}

impl Tree {
    /// Build a tree from seed roots.
    ///
    /// Ids must be unique across the forest and every value finite.
    /// Rollup consistency is not enforced here, see [`Tree::rollup_violations`].
    pub fn new(roots: Vec<Node>) -> DomainResult<Self> {
        let tree = Self { roots };
        let mut seen = HashSet::new();
        for (_, node) in tree.iter() {
            if !seen.insert(node.id.as_str()) {
                return Err(DomainError::DuplicateId(node.id.clone()));
            }
            if !node.value.is_finite() {
                return Err(DomainError::InvalidValue {
                    id: node.id.clone(),
                    value: node.value,
                });
            }
        }
        Ok(tree)
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut [Node] {
        &mut self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of nodes in the whole forest.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first search by id over all roots.
    #[instrument(level = "trace", skip(self))]
    pub fn find_node(&self, id: &str) -> DomainResult<&Node> {
        self.roots
            .iter()
            .find_map(|root| root.find(id))
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))
    }

    /// Sum of all root values.
    pub fn grand_total(&self) -> f64 {
        self.roots.iter().map(|r| r.value).sum()
    }

    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter::new(self)
    }

    /// Number of levels of the deepest root, 0 for an empty forest.
    pub fn depth(&self) -> usize {
        fn node_depth(node: &Node) -> usize {
            1 + node.children.iter().map(node_depth).max().unwrap_or(0)
        }
        self.roots.iter().map(node_depth).max().unwrap_or(0)
    }

    pub fn leaf_ids(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.id.as_str())
            .collect()
    }

    /// Parents whose value differs from their children's total by more than `tolerance`.
    #[instrument(level = "debug", skip(self))]
    pub fn rollup_violations(&self, tolerance: f64) -> Vec<RollupViolation> {
        self.iter()
            .filter(|(_, node)| !node.is_leaf())
            .filter_map(|(_, node)| {
                let children_total = node.children_total();
                ((node.value - children_total).abs() > tolerance).then(|| RollupViolation {
                    id: node.id.clone(),
                    value: node.value,
                    children_total,
                })
            })
            .collect()
    }

    pub fn is_consistent(&self) -> bool {
        self.rollup_violations(ROLLUP_TOLERANCE).is_empty()
    }
}

/// Depth-first pre-order iterator yielding `(depth, node)`, roots at depth 0.
pub struct TreeIter<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> TreeIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        // Push in reverse order for left-to-right traversal
        let stack = tree.roots.iter().rev().map(|r| (0, r)).collect();
        Self { stack }
    }
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}
