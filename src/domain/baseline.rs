//! Baseline values captured when a tree is first loaded.

use std::collections::BTreeMap;

use crate::domain::node::{Node, Tree};
use crate::domain::variance::{variance, Variance};

/// Original value of every node, keyed by id.
///
/// Captured once from the seed tree and never updated by edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baseline {
    values: BTreeMap<String, f64>,
}

impl Baseline {
    pub fn capture(tree: &Tree) -> Self {
        let values = tree
            .iter()
            .map(|(_, node)| (node.id.clone(), node.value))
            .collect();
        Self { values }
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Variance of the node's current value; unknown ids have zero variance.
    pub fn variance_of(&self, node: &Node) -> Variance {
        variance(node.value, self.get(&node.id).unwrap_or(0.0))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_every_node() {
        let tree = Tree::new(vec![Node::branch(
            "root",
            "Root",
            vec![Node::leaf("a", "A", 1.0), Node::leaf("b", "B", 2.0)],
        )])
        .unwrap();
        let baseline = Baseline::capture(&tree);
        assert_eq!(baseline.len(), 3);
        assert_eq!(baseline.get("root"), Some(3.0));
        assert_eq!(baseline.get("b"), Some(2.0));
        assert_eq!(baseline.get("zzz"), None);
    }

    #[test]
    fn test_variance_of_unknown_node_is_zero() {
        let baseline = Baseline::default();
        let node = Node::leaf("new", "New", 100.0);
        assert!(baseline.variance_of(&node).is_zero());
    }
}
