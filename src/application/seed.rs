//! Seed loading: builds the initial tree from TOML or JSON files.
//!
//! TOML seeds hold an array of `[[node]]` tables, JSON seeds a top-level
//! array. Children nest under `children` in both formats.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Node, Tree};

/// Seed shipped with the binary, used when no seed file is configured.
pub const DEMO_SEED: &str = r#"
[[node]]
id = "electronics"
label = "Electronics"
value = 1500

[[node.children]]
id = "phones"
label = "Phones"
value = 800

[[node.children]]
id = "laptops"
label = "Laptops"
value = 700

[[node]]
id = "furniture"
label = "Furniture"
value = 1000

[[node.children]]
id = "tables"
label = "Tables"
value = 300

[[node.children]]
id = "chairs"
label = "Chairs"
value = 700
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Toml,
    Json,
}

impl SeedFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlSeed {
    #[serde(rename = "node", default)]
    nodes: Vec<Node>,
}

/// Parse seed content. `path` is only used for error messages.
pub fn parse_seed(content: &str, format: SeedFormat, path: &Path) -> ApplicationResult<Tree> {
    let seed_err = |message: String| ApplicationError::Seed {
        path: path.to_path_buf(),
        message,
    };
    let nodes = match format {
        SeedFormat::Toml => {
            toml::from_str::<TomlSeed>(content)
                .map_err(|e| seed_err(e.to_string()))?
                .nodes
        }
        SeedFormat::Json => {
            serde_json::from_str::<Vec<Node>>(content).map_err(|e| seed_err(e.to_string()))?
        }
    };
    debug!("parse_seed: {} root nodes from {}", nodes.len(), path.display());
    Ok(Tree::new(nodes)?)
}

/// Read and parse a seed file.
#[instrument(level = "debug")]
pub fn load_seed(path: &Path) -> ApplicationResult<Tree> {
    let format = SeedFormat::from_path(path).ok_or_else(|| ApplicationError::Seed {
        path: path.to_path_buf(),
        message: "unsupported extension, expected .toml or .json".to_string(),
    })?;
    let content = std::fs::read_to_string(path).with_path_context("read seed", path)?;
    parse_seed(&content, format, path)
}

/// The built-in Electronics/Furniture seed.
pub fn demo_seed() -> ApplicationResult<Tree> {
    parse_seed(DEMO_SEED, SeedFormat::Toml, Path::new("<demo>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed_is_consistent() {
        let tree = demo_seed().unwrap();
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.grand_total(), 2500.0);
        assert!(tree.is_consistent());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SeedFormat::from_path(Path::new("a.toml")), Some(SeedFormat::Toml));
        assert_eq!(SeedFormat::from_path(Path::new("a.json")), Some(SeedFormat::Json));
        assert_eq!(SeedFormat::from_path(Path::new("a.yaml")), None);
        assert_eq!(SeedFormat::from_path(Path::new("seed")), None);
    }

    #[test]
    fn test_parse_json_seed() {
        let json = r#"[{"id": "a", "label": "A", "value": 3,
                        "children": [{"id": "b", "label": "B", "value": 3}]}]"#;
        let tree = parse_seed(json, SeedFormat::Json, Path::new("x.json")).unwrap();
        assert_eq!(tree.find_node("b").unwrap().value, 3.0);
    }

    #[test]
    fn test_parse_malformed_seed_reports_path() {
        let err = parse_seed("[[node]]\nid = 1", SeedFormat::Toml, Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Seed { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
