//! Tree rendering for terminal (termtree) and JSON output.

use std::collections::BTreeMap;

use colored::Colorize;
use serde::Serialize;
use termtree::Tree as TermTree;
use tracing::instrument;

use crate::application::{ApplicationError, ApplicationResult, Session};
use crate::config::DisplayConfig;
use crate::domain::{Baseline, Node, Variance};

fn colored_variance(variance: Variance) -> String {
    let text = format!("{} %", variance);
    if variance.is_zero() {
        text
    } else if variance.percent() > 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn node_line(node: &Node, baseline: &Baseline, display: &DisplayConfig) -> String {
    if display.show_variance {
        format!(
            "{}: {} ({})",
            node.label,
            node.value,
            colored_variance(baseline.variance_of(node))
        )
    } else {
        format!("{}: {}", node.label, node.value)
    }
}

fn to_term_tree(node: &Node, baseline: &Baseline, display: &DisplayConfig) -> TermTree<String> {
    let leaves: Vec<_> = node
        .children
        .iter()
        .map(|c| to_term_tree(c, baseline, display))
        .collect();
    TermTree::new(node_line(node, baseline, display)).with_leaves(leaves)
}

/// One termtree per root node.
pub fn term_trees(session: &Session, display: &DisplayConfig) -> Vec<TermTree<String>> {
    session
        .tree()
        .roots()
        .iter()
        .map(|root| to_term_tree(root, session.baseline(), display))
        .collect()
}

#[instrument(level = "debug", skip_all)]
pub fn render_text(session: &Session, display: &DisplayConfig) -> String {
    let mut out: String = term_trees(session, display)
        .iter()
        .map(|t| t.to_string())
        .collect();
    if session.tree().is_empty() {
        out.push_str("Empty tree\n");
    }
    if display.show_total {
        out.push_str(&format!(
            "{}: {}\n",
            "Grand Total".bold(),
            session.grand_total()
        ));
    }
    out
}

#[derive(Serialize)]
struct JsonView<'a> {
    nodes: &'a crate::domain::Tree,
    #[serde(skip_serializing_if = "Option::is_none")]
    variance: Option<BTreeMap<&'a str, Variance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grand_total: Option<f64>,
}

pub fn render_json(session: &Session, display: &DisplayConfig) -> ApplicationResult<String> {
    let variance = display.show_variance.then(|| {
        session
            .tree()
            .iter()
            .map(|(_, node)| (node.id.as_str(), session.baseline().variance_of(node)))
            .collect()
    });
    let view = JsonView {
        nodes: session.tree(),
        variance,
        grand_total: display.show_total.then_some(session.grand_total()),
    };
    serde_json::to_string_pretty(&view).map_err(|e| ApplicationError::OperationFailed {
        context: "serialize tree".to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::demo_seed;
    use crate::domain::Edit;

    fn edited_session() -> Session {
        let mut session = Session::new(demo_seed().unwrap());
        session.apply(Edit::percentage("phones", 25.0)).unwrap();
        session
    }

    #[test]
    fn test_render_text_contains_values_and_variance() {
        colored::control::set_override(false);
        let out = render_text(&edited_session(), &DisplayConfig::default());
        assert!(out.contains("Electronics: 1700"));
        assert!(out.contains("Phones: 1000 (25.00 %)"));
        assert!(out.contains("Laptops: 700 (0.00 %)"));
        assert!(out.contains("Grand Total: 2700"));
    }

    #[test]
    fn test_render_text_respects_display_flags() {
        colored::control::set_override(false);
        let display = DisplayConfig {
            show_variance: false,
            show_total: false,
            ..Default::default()
        };
        let out = render_text(&edited_session(), &display);
        assert!(out.contains("Phones: 1000\n"));
        assert!(!out.contains('%'));
        assert!(!out.contains("Grand Total"));
    }

    #[test]
    fn test_render_json() {
        let out = render_json(&edited_session(), &DisplayConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["grand_total"], 2700.0);
        assert_eq!(value["variance"]["phones"], 25.0);
        assert_eq!(value["nodes"][0]["children"][0]["value"], 1000.0);
    }
}
