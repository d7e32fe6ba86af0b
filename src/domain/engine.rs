//! Allocation engine: applies one edit to one node and returns a new tree.
//!
//! An edit sets the target's value, optionally rescales its direct children
//! and recomputes every ancestor as the total of its children. Nodes outside
//! the target's ancestor chain and its direct children are left untouched.
//!
//! The two edit kinds behave asymmetrically:
//! - percentage edits on a parent change only the parent, children are not
//!   rescaled; absolute edits on a parent always rescale the children
//! - percentage results are rounded to whole amounts, redistributed
//!   children to cents
//!
//! Redistribution only reaches direct children. Grandchildren keep their
//! values, so a rescaled child with children of its own no longer matches
//! its subtree total.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, Tree};
use crate::domain::variance::{round2, round_whole};

/// How the magnitude of an edit is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    /// New value = round(current * (1 + magnitude / 100))
    Percentage,
    /// New value = magnitude
    Absolute,
}

/// A single edit request against one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edit {
    pub target: String,
    pub kind: EditKind,
    pub magnitude: f64,
}

impl Edit {
    pub fn percentage(target: impl Into<String>, percent: f64) -> Self {
        Self {
            target: target.into(),
            kind: EditKind::Percentage,
            magnitude: percent,
        }
    }

    pub fn absolute(target: impl Into<String>, value: f64) -> Self {
        Self {
            target: target.into(),
            kind: EditKind::Absolute,
            magnitude: value,
        }
    }

    fn new_value(&self, current: f64) -> f64 {
        match self.kind {
            EditKind::Percentage => round_whole(current * (1.0 + self.magnitude / 100.0)),
            EditKind::Absolute => self.magnitude,
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EditKind::Percentage => write!(f, "{}%{}", self.target, self.magnitude),
            EditKind::Absolute => write!(f, "{}={}", self.target, self.magnitude),
        }
    }
}

/// Apply `edit` to `tree`, returning the updated tree.
///
/// `tree` is never modified. Ancestor totals are checked on the updated
/// copy, which is dropped on error.
///
/// # Errors
/// - `InvalidMagnitude` if the magnitude, the new value, a redistributed
///   child or a recomputed ancestor total is not finite
/// - `NodeNotFound` if no node carries the target id
/// - `IndeterminateProportion` for an absolute edit on a parent whose
///   children total zero
#[instrument(level = "debug", skip(tree), fields(edit = %edit))]
pub fn apply_edit(tree: &Tree, edit: &Edit) -> DomainResult<Tree> {
    if !edit.magnitude.is_finite() {
        return Err(DomainError::InvalidMagnitude(format!(
            "{} for {}",
            edit.magnitude, edit.target
        )));
    }

    let path = locate(tree.roots(), &edit.target)
        .ok_or_else(|| DomainError::NodeNotFound(edit.target.clone()))?;
    let target = node_at(tree.roots(), &path)
        .ok_or_else(|| DomainError::NodeNotFound(edit.target.clone()))?;
    debug!("located {} at {:?}", target.id, path);

    let new_value = edit.new_value(target.value);
    if !new_value.is_finite() {
        return Err(DomainError::InvalidMagnitude(format!(
            "{} yields non-finite value for {}",
            edit.magnitude, edit.target
        )));
    }

    let children = match edit.kind {
        EditKind::Absolute if !target.is_leaf() => Some(redistribute(target, new_value)?),
        _ => None,
    };
    debug!(
        "{}: {} -> {}, redistributed children: {:?}",
        target.id, target.value, new_value, children
    );

    let mut next = tree.clone();
    update_along(next.roots_mut(), &path, new_value, children.as_deref())?;
    Ok(next)
}

/// Index path from the roots down to the node with `id`.
fn locate(nodes: &[Node], id: &str) -> Option<Vec<usize>> {
    for (i, node) in nodes.iter().enumerate() {
        if node.id == id {
            return Some(vec![i]);
        }
        if let Some(mut path) = locate(&node.children, id) {
            path.insert(0, i);
            return Some(path);
        }
    }
    None
}

fn node_at<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let node = nodes.get(*first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at(&node.children, rest)
    }
}

/// Rescale direct children to `new_value`, keeping each child's share of the current total.
fn redistribute(parent: &Node, new_value: f64) -> DomainResult<Vec<f64>> {
    let total = parent.children_total();
    if total == 0.0 {
        return Err(DomainError::IndeterminateProportion(parent.id.clone()));
    }
    parent
        .children
        .iter()
        .map(|child| {
            let value = round2(new_value * (child.value / total));
            if value.is_finite() {
                Ok(value)
            } else {
                Err(DomainError::InvalidMagnitude(format!(
                    "{} yields non-finite value for {}",
                    new_value, child.id
                )))
            }
        })
        .collect()
}

/// Write the new value at the end of `path` and recompute every ancestor on the way back up.
///
/// Fails with `InvalidMagnitude` when a recomputed ancestor total is not finite.
fn update_along(
    nodes: &mut [Node],
    path: &[usize],
    new_value: f64,
    children: Option<&[f64]>,
) -> DomainResult<()> {
    let Some((first, rest)) = path.split_first() else {
        return Ok(());
    };
    let Some(node) = nodes.get_mut(*first) else {
        return Ok(());
    };

    if rest.is_empty() {
        node.value = new_value;
        if let Some(values) = children {
            for (child, value) in node.children.iter_mut().zip(values) {
                child.value = *value;
            }
        }
    } else {
        update_along(&mut node.children, rest, new_value, children)?;
        node.value = node.children_total();
        if !node.value.is_finite() {
            return Err(DomainError::InvalidMagnitude(format!(
                "{} overflows the total of {}",
                new_value, node.id
            )));
        }
    }
    Ok(())
}
