//! Editing session
//!
//! Owns the current tree, the baseline captured at load time and the raw
//! pending input per node. Edits are applied one at a time; the current
//! tree is replaced only when the engine accepts the edit.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::ApplicationResult;
use crate::domain::{apply_edit, Baseline, DomainError, DomainResult, Edit, Tree, Variance};

/// One display row: a node flattened in pre-order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub depth: usize,
    pub id: String,
    pub label: String,
    pub value: f64,
    pub variance: Variance,
}

/// Single-writer holder of the current allocation tree.
#[derive(Debug, Clone)]
pub struct Session {
    tree: Tree,
    baseline: Baseline,
    inputs: HashMap<String, String>,
}

impl Session {
    /// Start a session from a seed tree; the baseline is captured here.
    pub fn new(tree: Tree) -> Self {
        let baseline = Baseline::capture(&tree);
        Self {
            tree,
            baseline,
            inputs: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Store raw input text for a node.
    pub fn set_input(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.inputs.insert(id.into(), text.into());
    }

    pub fn input(&self, id: &str) -> Option<&str> {
        self.inputs.get(id).map(String::as_str)
    }

    pub fn clear_input(&mut self, id: &str) {
        self.inputs.remove(id);
    }

    /// Apply the pending input of `id` as a percentage; no input means 0%.
    pub fn apply_percentage(&mut self, id: &str) -> ApplicationResult<&Tree> {
        let percent = match self.input(id).map(str::trim) {
            None | Some("") => 0.0,
            Some(text) => parse_magnitude(text)?,
        };
        self.apply(Edit::percentage(id, percent))
    }

    /// Apply the pending input of `id` as an absolute value; input is required.
    pub fn apply_value(&mut self, id: &str) -> ApplicationResult<&Tree> {
        let text = self.input(id).map(str::trim).unwrap_or_default();
        let value = parse_magnitude(text)?;
        self.apply(Edit::absolute(id, value))
    }

    /// Apply a prepared edit; on success the target's pending input is cleared.
    #[instrument(level = "debug", skip(self), fields(edit = %edit))]
    pub fn apply(&mut self, edit: Edit) -> ApplicationResult<&Tree> {
        match apply_edit(&self.tree, &edit) {
            Ok(next) => {
                info!(
                    "applied {}: grand total {} -> {}",
                    edit,
                    self.tree.grand_total(),
                    next.grand_total()
                );
                self.tree = next;
                self.clear_input(&edit.target);
                Ok(&self.tree)
            }
            Err(e) => {
                warn!("rejected {}: {}", edit, e);
                Err(e.into())
            }
        }
    }

    pub fn variance(&self, id: &str) -> DomainResult<Variance> {
        let node = self.tree.find_node(id)?;
        Ok(self.baseline.variance_of(node))
    }

    pub fn grand_total(&self) -> f64 {
        self.tree.grand_total()
    }

    /// Flatten the current tree into display rows.
    pub fn rows(&self) -> Vec<Row> {
        self.tree
            .iter()
            .map(|(depth, node)| Row {
                depth,
                id: node.id.clone(),
                label: node.label.clone(),
                value: node.value,
                variance: self.baseline.variance_of(node),
            })
            .collect()
    }
}

/// Parse raw input text into a finite magnitude.
pub fn parse_magnitude(text: &str) -> DomainResult<f64> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DomainError::InvalidMagnitude(format!("{:?}", trimmed)))
}
