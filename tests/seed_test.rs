//! Tests for seed loading from TOML and JSON files

use std::path::Path;

use tempfile::TempDir;

use allotree::application::{load_seed, ApplicationError, Session};
use allotree::domain::{DomainError, ROLLUP_TOLERANCE};

#[test]
fn given_nested_toml_seed_when_loading_then_builds_forest() {
    let tree = load_seed(Path::new("tests/resources/seeds/budget.toml")).unwrap();

    assert_eq!(tree.roots().len(), 2);
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.len(), 9);
    assert_eq!(tree.grand_total(), 2900.0);
    assert!(tree.is_consistent());
}

#[test]
fn given_json_seed_when_loading_then_matches_toml_demo_shape() {
    let tree = load_seed(Path::new("tests/resources/seeds/budget.json")).unwrap();

    assert_eq!(
        tree.leaf_ids(),
        vec!["phones", "laptops", "tables", "chairs"]
    );
    assert_eq!(tree.find_node("furniture").unwrap().value, 1000.0);
}

#[test]
fn given_seed_when_session_started_then_baseline_covers_every_node() {
    let tree = load_seed(Path::new("tests/resources/seeds/budget.toml")).unwrap();
    let session = Session::new(tree);

    assert_eq!(session.baseline().len(), 9);
    assert_eq!(session.baseline().get("consulting"), Some(400.0));
}

#[test]
fn given_inconsistent_seed_when_loading_then_loaded_and_violation_reported() {
    let tree = load_seed(Path::new("tests/resources/seeds/inconsistent.toml")).unwrap();

    let violations = tree.rollup_violations(ROLLUP_TOLERANCE);

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].id, "electronics");
    assert_eq!(violations[0].children_total, 1500.0);
}

#[test]
fn given_duplicate_ids_when_loading_then_domain_error() {
    let err = load_seed(Path::new("tests/resources/seeds/duplicate.json")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DuplicateId(ref id)) if id == "x"
    ));
}

#[test]
fn given_missing_file_when_loading_then_operation_failed_with_path() {
    let err = load_seed(Path::new("tests/resources/seeds/nope.toml")).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn given_unsupported_extension_when_loading_then_seed_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("seed.yaml");
    std::fs::write(&path, "- id: a").unwrap();

    let err = load_seed(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Seed { .. }));
}

#[test]
fn given_node_without_value_when_loading_then_seed_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("seed.json");
    std::fs::write(&path, r#"[{"id": "a", "label": "A"}]"#).unwrap();

    let err = load_seed(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Seed { .. }));
    assert!(err.to_string().contains("value"));
}
